use rand::seq::SliceRandom;
use rand::Rng;

use crate::game::{has_won, Board, Mark};

/// 单步战术扫描：先找 `me` 能立即获胜的格子，再找必须封堵对手的格子，均按下标升序。
pub fn tactical_move(board: &Board, me: Mark) -> Option<usize> {
    winning_cell(board, me).or_else(|| winning_cell(board, me.opponent()))
}

/// `mark` 落在该格即连成一线的第一个空格。
pub fn winning_cell(board: &Board, mark: Mark) -> Option<usize> {
    board
        .empty_cells()
        .find(|&cell| has_won(&board.with_mark(cell, mark), mark))
}

/// 在所有空格中均匀随机选择。
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    let empty: Vec<usize> = board.empty_cells().collect();
    empty.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn board(symbols: [&str; 9]) -> Board {
        Board::from_symbols(&symbols).expect("test board should parse")
    }

    #[test]
    fn win_takes_priority_over_block() {
        let board = board(["X", "X", "", "O", "O", "", "", "", ""]);
        assert_eq!(tactical_move(&board, Mark::O), Some(5));
        assert_eq!(winning_cell(&board, Mark::X), Some(2));
    }

    #[test]
    fn blocks_when_no_win() {
        let board = board(["X", "X", "", "O", "", "", "", "", ""]);
        assert_eq!(tactical_move(&board, Mark::O), Some(2));
    }

    #[test]
    fn completes_own_line() {
        let board = board(["O", "O", "", "X", "X", "", "", "", ""]);
        assert_eq!(tactical_move(&board, Mark::O), Some(2));
    }

    #[test]
    fn lowest_index_wins_among_several() {
        let board = board(["O", "", "O", "", "", "", "O", "X", "X"]);
        assert_eq!(tactical_move(&board, Mark::O), Some(1));
    }

    #[test]
    fn quiet_board_has_no_tactic() {
        let board = board(["X", "", "", "", "O", "", "", "", ""]);
        assert_eq!(tactical_move(&board, Mark::O), None);
        assert_eq!(tactical_move(&Board::new(), Mark::O), None);
    }

    #[test]
    fn random_move_only_picks_empty_cells() {
        let board = board(["X", "O", "X", "", "O", "", "X", "", "O"]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = [false; 9];
        for _ in 0..200 {
            let cell = random_move(&board, &mut rng).expect("board has empty cells");
            assert!(board.is_empty_at(cell));
            seen[cell] = true;
        }
        assert!(seen[3] && seen[5] && seen[7], "every empty cell should come up");
    }

    #[test]
    fn random_move_on_full_board_is_none() {
        let board = board(["X", "O", "X", "X", "O", "O", "O", "X", "X"]);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(random_move(&board, &mut rng), None);
    }
}
