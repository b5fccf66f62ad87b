use serde::{Deserialize, Serialize};

use crate::game::{has_won, is_full, is_terminal, Board, Mark};

const WIN_SCORE: i32 = 10;
const INFINITY: i32 = 1_000;

/// 完整搜索的结果：最佳格子、得分与访问节点数。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub cell: usize,
    pub score: i32,
    pub nodes: u64,
    pub depth_reached: u8,
}

struct SearchStats {
    nodes: u64,
    depth_reached: u8,
}

impl SearchStats {
    fn new() -> Self {
        Self {
            nodes: 0,
            depth_reached: 0,
        }
    }
}

/// 对 `me` 执行完整的极小极大搜索。
///
/// 终局计分：`me` 获胜为 `10 - depth`，对手获胜为 `depth - 10`，平局为 0，
/// 其中 `depth` 是根着法之后已走的步数，因此更快的胜利、更慢的失败得分更高。
/// 根节点按格子升序遍历，只在得分严格更高时替换，平分时取最小下标。
/// 递归内部使用 alpha-beta 剪枝，返回的格子与得分和朴素极小极大一致。
///
/// 棋盘已终局或没有空格时返回 `None`。
pub fn search_best(board: &Board, me: Mark) -> Option<SearchResult> {
    if is_terminal(board) {
        return None;
    }

    let mut stats = SearchStats::new();
    let mut best: Option<(usize, i32)> = None;

    for cell in board.empty_cells() {
        let child = board.with_mark(cell, me);
        let alpha = best.map_or(-INFINITY, |(_, score)| score);
        let score = minimax_rec(&child, 0, alpha, INFINITY, false, me, &mut stats);

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((cell, score));
        }
    }

    best.map(|(cell, score)| SearchResult {
        cell,
        score,
        nodes: stats.nodes,
        depth_reached: stats.depth_reached,
    })
}

fn minimax_rec(
    board: &Board,
    depth: i32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    me: Mark,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;
    let depth_explored = (depth + 1) as u8;
    if depth_explored > stats.depth_reached {
        stats.depth_reached = depth_explored;
    }

    if has_won(board, me) {
        return WIN_SCORE - depth;
    }
    if has_won(board, me.opponent()) {
        return depth - WIN_SCORE;
    }
    if is_full(board) {
        return 0;
    }

    if maximizing {
        let mut value = -INFINITY;
        for cell in board.empty_cells() {
            let score = minimax_rec(
                &board.with_mark(cell, me),
                depth + 1,
                alpha,
                beta,
                false,
                me,
                stats,
            );
            value = value.max(score);
            alpha = alpha.max(value);
            if beta <= alpha {
                break;
            }
        }
        value
    } else {
        let mut value = INFINITY;
        for cell in board.empty_cells() {
            let score = minimax_rec(
                &board.with_mark(cell, me.opponent()),
                depth + 1,
                alpha,
                beta,
                true,
                me,
                stats,
            );
            value = value.min(score);
            beta = beta.min(value);
            if beta <= alpha {
                break;
            }
        }
        value
    }
}
