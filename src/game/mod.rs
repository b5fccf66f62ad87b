//! 游戏核心逻辑模块（棋盘判定、回合规则、比分）。

pub mod board;
pub mod rules;
pub mod score;

pub use board::{
    has_won,
    is_full,
    is_terminal,
    outcome,
    winning_line,
    Board,
    Cell,
    Line,
    Mark,
    Outcome,
    BOARD_CELLS,
    LINES,
};
pub use rules::{GameSession, MoveResolution, RuleError};
pub use score::ScoreState;
