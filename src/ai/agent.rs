use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::minimax::search_best;
use super::tactics::{random_move, tactical_move};
use crate::game::{is_terminal, Board, Mark, RuleError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl AiDifficulty {
    pub fn label(self) -> &'static str {
        match self {
            AiDifficulty::Easy => "Easy",
            AiDifficulty::Medium => "Medium",
            AiDifficulty::Hard => "Hard",
        }
    }
}

impl FromStr for AiDifficulty {
    type Err = RuleError;

    /// 名称或页面滑块的等级（1 简单，2 中等，3 困难）。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "1" => Ok(AiDifficulty::Easy),
            "medium" | "normal" | "2" => Ok(AiDifficulty::Medium),
            "hard" | "3" => Ok(AiDifficulty::Hard),
            _ => Err(RuleError::InvalidDifficulty {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiConfig {
    /// 电脑执的记号，即搜索中的极大方。
    pub mark: Mark,
    /// 直接使用完整搜索的概率。
    pub search_chance: f64,
    /// 未搜索时查看单步战术的概率，其余情况随机落子。
    pub tactical_chance: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self {
                mark: Mark::O,
                search_chance: 0.0,
                tactical_chance: 0.3,
            },
            AiDifficulty::Medium => Self {
                mark: Mark::O,
                search_chance: 0.7,
                tactical_chance: 0.3,
            },
            AiDifficulty::Hard => Self {
                mark: Mark::O,
                search_chance: 1.0,
                tactical_chance: 0.0,
            },
        }
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.mark = mark;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::default())
    }
}

/// 产生这步棋的分支。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveSource {
    Minimax,
    Tactical,
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub cell: usize,
    pub mark: Mark,
    pub source: MoveSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub nodes: u64,
}

/// 电脑对手。随机源可注入，测试里可以固定种子或序列来断言具体分支。
pub struct AiAgent<R = SmallRng> {
    config: AiConfig,
    rng: R,
}

impl AiAgent<SmallRng> {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> AiAgent<R> {
    pub fn with_rng(config: AiConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// 为当前棋盘挑选一步。每次调用都重新掷骰，不保留任何对局记忆。
    ///
    /// 棋盘已满返回 `NoMoveAvailable`，已分胜负返回 `GameFinished`。
    pub fn decide_move(&mut self, board: &Board) -> Result<AiDecision, RuleError> {
        if board.empty_cells().next().is_none() {
            return Err(RuleError::NoMoveAvailable);
        }
        if is_terminal(board) {
            return Err(RuleError::GameFinished);
        }

        if self.roll(self.config.search_chance) {
            return self.search_decision(board);
        }
        self.casual_decision(board)
    }

    /// 简单难度的混合：按概率查看战术，找不到或未查看时随机落子。
    fn casual_decision(&mut self, board: &Board) -> Result<AiDecision, RuleError> {
        let mark = self.config.mark;
        if self.roll(self.config.tactical_chance) {
            if let Some(cell) = tactical_move(board, mark) {
                return Ok(AiDecision {
                    cell,
                    mark,
                    source: MoveSource::Tactical,
                    score: None,
                    nodes: 0,
                });
            }
        }

        let cell = random_move(board, &mut self.rng).ok_or(RuleError::NoMoveAvailable)?;
        Ok(AiDecision {
            cell,
            mark,
            source: MoveSource::Random,
            score: None,
            nodes: 0,
        })
    }

    fn search_decision(&mut self, board: &Board) -> Result<AiDecision, RuleError> {
        let mark = self.config.mark;
        let result = search_best(board, mark).ok_or(RuleError::NoMoveAvailable)?;
        Ok(AiDecision {
            cell: result.cell,
            mark,
            source: MoveSource::Minimax,
            score: Some(result.score),
            nodes: result.nodes,
        })
    }

    fn roll(&mut self, chance: f64) -> bool {
        if chance >= 1.0 {
            true
        } else if chance > 0.0 {
            self.rng.gen_bool(chance)
        } else {
            false
        }
    }
}

/// 以熵源初始化的电脑对手为 `board` 选出一个格子。
pub fn choose_move(board: &Board, difficulty: AiDifficulty) -> Result<usize, RuleError> {
    let mut agent = AiAgent::new(AiConfig::from_difficulty(difficulty));
    agent.decide_move(board).map(|decision| decision.cell)
}
