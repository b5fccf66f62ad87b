use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::board::{outcome, winning_line, Board, Line, Mark, Outcome, BOARD_CELLS};
use super::score::ScoreState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("game is already finished")]
    GameFinished,
    #[error("no empty cell left to play")]
    NoMoveAvailable,
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotPlayerTurn { expected: Mark, actual: Mark },
    #[error("cell {index} is outside the board")]
    CellOutOfRange { index: usize },
    #[error("cell {index} is already taken")]
    CellOccupied { index: usize },
    #[error("cell {index} holds unknown value {value:?}")]
    InvalidCell { index: usize, value: String },
    #[error("board must have 9 cells, got {length}")]
    InvalidBoardLength { length: usize },
    #[error("unknown mark {value:?}")]
    InvalidMark { value: String },
    #[error("unknown difficulty {value:?}")]
    InvalidDifficulty { value: String },
}

/// 一次落子的结算结果，直接交给前端渲染。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub cell: usize,
    pub mark: Mark,
    pub board: Board,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<Line>,
    pub scores: ScoreState,
}

/// 一局对战的回合状态：人类与电脑各执一方，X 先手。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    pub board: Board,
    pub current: Mark,
    pub human: Mark,
    pub active: bool,
    #[serde(default)]
    pub scores: ScoreState,
}

impl GameSession {
    pub fn new(human: Mark) -> Self {
        Self {
            board: Board::new(),
            current: Mark::X,
            human,
            active: true,
            scores: ScoreState::default(),
        }
    }

    pub fn with_scores(mut self, scores: ScoreState) -> Self {
        self.scores = scores;
        self
    }

    pub fn computer(&self) -> Mark {
        self.human.opponent()
    }

    pub fn is_computer_turn(&self) -> bool {
        self.active && self.current == self.computer()
    }

    pub fn outcome(&self) -> Outcome {
        outcome(&self.board)
    }

    fn ensure_active(&self) -> Result<(), RuleError> {
        if !self.active {
            return Err(RuleError::GameFinished);
        }
        Ok(())
    }

    fn ensure_turn_owner(&self, mark: Mark) -> Result<(), RuleError> {
        if self.current != mark {
            return Err(RuleError::NotPlayerTurn {
                expected: self.current,
                actual: mark,
            });
        }
        Ok(())
    }

    /// 轮到电脑且对局仍在进行时返回 `Ok`。
    pub fn ensure_computer_turn(&self) -> Result<(), RuleError> {
        self.ensure_active()?;
        self.ensure_turn_owner(self.computer())
    }

    fn ensure_playable(&self, index: usize) -> Result<(), RuleError> {
        if index >= BOARD_CELLS {
            return Err(RuleError::CellOutOfRange { index });
        }
        if !self.board.is_empty_at(index) {
            return Err(RuleError::CellOccupied { index });
        }
        Ok(())
    }

    pub fn play_human(&mut self, index: usize) -> Result<MoveResolution, RuleError> {
        self.play(index, self.human)
    }

    pub fn play_computer(&mut self, index: usize) -> Result<MoveResolution, RuleError> {
        self.play(index, self.computer())
    }

    /// 校验并落子，随后重新判定局面；终局时结算比分。
    pub fn play(&mut self, index: usize, mark: Mark) -> Result<MoveResolution, RuleError> {
        self.ensure_active()?;
        self.ensure_turn_owner(mark)?;
        self.ensure_playable(index)?;

        self.board.place(index, mark);

        let outcome = outcome(&self.board);
        match outcome {
            Outcome::Ongoing => self.current = mark.opponent(),
            Outcome::Win(winner) => {
                self.active = false;
                self.scores.record_win(winner == self.human);
            }
            Outcome::Draw => self.active = false,
        }

        Ok(MoveResolution {
            cell: index,
            mark,
            board: self.board,
            outcome,
            winning_line: winning_line(&self.board),
            scores: self.scores,
        })
    }

    /// 重开一局，保留比分。
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.current = Mark::X;
        self.active = true;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new(Mark::X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_moves_first_and_turn_passes() {
        let mut session = GameSession::default();
        let resolution = session.play_human(4).expect("human move should succeed");

        assert_eq!(resolution.outcome, Outcome::Ongoing);
        assert_eq!(session.current, Mark::O);
        assert!(session.is_computer_turn());
        assert_eq!(session.ensure_computer_turn(), Ok(()));
    }

    #[test]
    fn computer_waits_for_human_opening() {
        let session = GameSession::default();
        assert!(!session.is_computer_turn());
        assert_eq!(
            session.ensure_computer_turn(),
            Err(RuleError::NotPlayerTurn {
                expected: Mark::X,
                actual: Mark::O
            })
        );
    }

    #[test]
    fn rejects_illegal_moves() {
        let mut session = GameSession::default();

        assert_eq!(
            session.play_computer(0),
            Err(RuleError::NotPlayerTurn {
                expected: Mark::X,
                actual: Mark::O
            })
        );
        assert_eq!(
            session.play_human(9),
            Err(RuleError::CellOutOfRange { index: 9 })
        );

        session.play_human(0).expect("first move should succeed");
        assert_eq!(
            session.play_computer(0),
            Err(RuleError::CellOccupied { index: 0 })
        );
        assert_eq!(session.board.mark_counts(), (1, 0), "rejected move must not touch the board");
    }

    #[test]
    fn win_ends_game_and_scores() {
        let mut session = GameSession::default();
        for (human, computer) in [(0, 3), (1, 4)] {
            session.play_human(human).expect("human move");
            session.play_computer(computer).expect("computer move");
        }
        let resolution = session.play_human(2).expect("winning move");

        assert_eq!(resolution.outcome, Outcome::Win(Mark::X));
        assert_eq!(resolution.winning_line, Some([0, 1, 2]));
        assert_eq!(resolution.scores.player_score, 1);
        assert_eq!(resolution.scores.player_best, 1);
        assert!(!session.active);
        assert_eq!(session.play_computer(5), Err(RuleError::GameFinished));
    }

    #[test]
    fn draw_ends_game_without_scoring() {
        let mut session = GameSession::default();
        let moves = [0, 1, 2, 4, 3, 5, 7, 6, 8];
        let mut last = None;
        for (ply, cell) in moves.into_iter().enumerate() {
            let mark = if ply % 2 == 0 { Mark::X } else { Mark::O };
            last = Some(session.play(cell, mark).expect("scripted move"));
        }

        let resolution = last.expect("at least one move");
        assert_eq!(resolution.outcome, Outcome::Draw);
        assert_eq!(resolution.scores, ScoreState::default());
        assert!(!session.active);
    }

    #[test]
    fn reset_keeps_scores() {
        let mut session = GameSession::default();
        for (human, computer) in [(0, 3), (1, 4)] {
            session.play_human(human).expect("human move");
            session.play_computer(computer).expect("computer move");
        }
        session.play_human(2).expect("winning move");

        session.reset();
        assert!(session.active);
        assert_eq!(session.current, Mark::X);
        assert_eq!(session.board, Board::new());
        assert_eq!(session.scores.player_score, 1);
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let json = serde_json::to_string(&RuleError::CellOccupied { index: 4 })
            .expect("error should serialize");
        assert_eq!(json, r#"{"type":"CellOccupied","index":4}"#);
        assert_eq!(
            RuleError::CellOccupied { index: 4 }.to_string(),
            "cell 4 is already taken"
        );
    }
}
