//! 电脑对手：极小极大搜索、单步战术与按难度混合的随机策略。

pub mod agent;
pub mod minimax;
pub mod tactics;

pub use agent::{choose_move, AiAgent, AiConfig, AiDecision, AiDifficulty, MoveSource};
pub use minimax::{search_best, SearchResult};
pub use tactics::{random_move, tactical_move, winning_cell};
