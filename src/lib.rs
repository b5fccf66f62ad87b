pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    choose_move, random_move, search_best, tactical_move, AiAgent, AiConfig, AiDecision,
    AiDifficulty, MoveSource, SearchResult,
};
pub use game::{
    has_won, is_full, is_terminal, outcome, winning_line, Board, Cell, GameSession, Line, Mark,
    MoveResolution, Outcome, RuleError, ScoreState, BOARD_CELLS, LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn board_from_js(board: JsValue) -> Result<Board, JsValue> {
    let symbols: Vec<String> = from_value(board).map_err(JsValue::from)?;
    Board::from_symbols(&symbols).map_err(to_js_error)
}

fn difficulty_from_js(difficulty: Option<String>) -> Result<AiDifficulty, JsValue> {
    match difficulty.as_deref() {
        Some(value) => AiDifficulty::from_str(value).map_err(to_js_error),
        None => Ok(AiDifficulty::default()),
    }
}

fn log_decision(difficulty: AiDifficulty, decision: &AiDecision) {
    utils::log(&format!(
        "[{}] {} -> cell {} via {:?} ({} nodes)",
        difficulty.label(),
        decision.mark,
        decision.cell,
        decision.source,
        decision.nodes
    ));
}

#[wasm_bindgen(js_name = "boardOutcome")]
pub fn board_outcome(board: JsValue) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    to_value(&outcome(&board)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "hasWon")]
pub fn has_won_js(board: JsValue, mark: &str) -> Result<bool, JsValue> {
    let board = board_from_js(board)?;
    let mark = Mark::from_str(mark).map_err(to_js_error)?;
    Ok(has_won(&board, mark))
}

#[wasm_bindgen(js_name = "isFull")]
pub fn is_full_js(board: JsValue) -> Result<bool, JsValue> {
    let board = board_from_js(board)?;
    Ok(is_full(&board))
}

#[wasm_bindgen(js_name = "isTerminal")]
pub fn is_terminal_js(board: JsValue) -> Result<bool, JsValue> {
    let board = board_from_js(board)?;
    Ok(is_terminal(&board))
}

/// 获胜连线的三个下标，未分胜负时返回 `undefined`。
#[wasm_bindgen(js_name = "winningLine")]
pub fn winning_line_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    to_value(&winning_line(&board)).map_err(JsValue::from)
}

/// 为电脑（O）在给定棋盘上选一步。
#[wasm_bindgen(js_name = "chooseMove")]
pub fn choose_move_js(board: JsValue, difficulty: Option<String>) -> Result<u32, JsValue> {
    let board = board_from_js(board)?;
    let difficulty = difficulty_from_js(difficulty)?;
    choose_move(&board, difficulty)
        .map(|cell| cell as u32)
        .map_err(to_js_error)
}

/// 与 `chooseMove` 相同，但返回完整决策；给定 `seed` 时结果可复现。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    difficulty: Option<String>,
    seed: Option<u64>,
) -> Result<JsValue, JsValue> {
    let board = board_from_js(board)?;
    let difficulty = difficulty_from_js(difficulty)?;
    let config = AiConfig::from_difficulty(difficulty);
    let decision = match seed {
        Some(seed) => AiAgent::with_seed(config, seed).decide_move(&board),
        None => AiAgent::new(config).decide_move(&board),
    }
    .map_err(to_js_error)?;
    log_decision(difficulty, &decision);
    to_value(&decision).map_err(JsValue::from)
}

#[derive(Serialize)]
struct BotMoveResponse {
    decision: AiDecision,
    applied: MoveResolution,
}

/// 一整场人机对战：人类执 X 先手，电脑执 O。
#[wasm_bindgen]
pub struct GameEngine {
    session: GameSession,
    difficulty: AiDifficulty,
}

#[wasm_bindgen]
impl GameEngine {
    /// `scores_json` 为前端保存的比分 JSON，只恢复其中的最佳记录；
    /// 无法解析时记录日志并从零开始。
    #[wasm_bindgen(constructor)]
    pub fn new(
        difficulty: Option<String>,
        scores_json: Option<String>,
    ) -> Result<GameEngine, JsValue> {
        let difficulty = difficulty_from_js(difficulty)?;
        let scores = scores_json
            .map(|json| {
                ScoreState::from_saved(&json).unwrap_or_else(|err| {
                    utils::log(&format!("ignoring saved scores: {err}"));
                    ScoreState::default()
                })
            })
            .unwrap_or_default();
        Ok(GameEngine {
            session: GameSession::new(Mark::X).with_scores(scores),
            difficulty,
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.scores).map_err(serde_to_js_error)
    }

    pub fn difficulty(&self) -> String {
        self.difficulty.label().to_string()
    }

    pub fn set_difficulty(&mut self, difficulty: &str) -> Result<(), JsValue> {
        self.difficulty = AiDifficulty::from_str(difficulty).map_err(to_js_error)?;
        Ok(())
    }

    pub fn is_bot_turn(&self) -> bool {
        self.session.is_computer_turn()
    }

    /// 人类落子。
    pub fn play_json(&mut self, cell: u32) -> Result<String, JsValue> {
        let resolution = self
            .session
            .play_human(cell as usize)
            .map_err(to_js_error)?;
        self.log_outcome(&resolution);
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }

    /// 电脑立即决策并落子。
    pub fn bot_move_json(&mut self) -> Result<String, JsValue> {
        self.session.ensure_computer_turn().map_err(to_js_error)?;

        let config = AiConfig::from_difficulty(self.difficulty).with_mark(self.session.computer());
        let mut agent = AiAgent::new(config);
        let decision = agent
            .decide_move(&self.session.board)
            .map_err(to_js_error)?;
        log_decision(self.difficulty, &decision);

        let applied = self
            .session
            .play_computer(decision.cell)
            .map_err(to_js_error)?;
        self.log_outcome(&applied);

        let response = BotMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 模拟“思考”：延迟 `delay_ms` 后给出决策 JSON，不修改对局；
    /// 前端随后调用 `apply_bot_json` 落子。
    pub fn think_bot(&self, delay_ms: Option<u32>) -> Promise {
        let ready = self.session.ensure_computer_turn();
        let board = self.session.board;
        let difficulty = self.difficulty;
        let mark = self.session.computer();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            ready.map_err(to_js_error)?;
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let config = AiConfig::from_difficulty(difficulty).with_mark(mark);
            let mut agent = AiAgent::new(config);
            let decision = agent.decide_move(&board).map_err(to_js_error)?;
            log_decision(difficulty, &decision);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn apply_bot_json(&mut self, cell: u32) -> Result<String, JsValue> {
        let resolution = self
            .session
            .play_computer(cell as usize)
            .map_err(to_js_error)?;
        self.log_outcome(&resolution);
        serde_json::to_string(&resolution).map_err(serde_to_js_error)
    }

    /// 再来一局，比分保留。
    pub fn reset(&mut self) -> Result<String, JsValue> {
        self.session.reset();
        self.state_json()
    }

    fn log_outcome(&self, resolution: &MoveResolution) {
        match resolution.outcome {
            Outcome::Ongoing => {}
            Outcome::Win(mark) if mark == self.session.human => utils::log("You win!"),
            Outcome::Win(_) => utils::log("Bot wins!"),
            Outcome::Draw => utils::log("It's a draw!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_restores_saved_best_scores() {
        let engine = GameEngine::new(None, Some(r#"{"player_score":2,"player_best":3}"#.into()))
            .expect("engine should start");
        assert_eq!(engine.session.scores, ScoreState::with_best(3, 0));
        assert_eq!(engine.difficulty, AiDifficulty::Medium);
    }

    #[test]
    fn engine_ignores_unreadable_saved_scores() {
        for saved in ["not json", "", r#"{"player_best":"many"}"#] {
            let engine = GameEngine::new(Some("hard".into()), Some(saved.into()))
                .expect("corrupt saved scores should not block a new game");
            assert_eq!(engine.session.scores, ScoreState::default(), "saved {saved:?}");
            assert!(engine.session.active);
        }
    }
}
