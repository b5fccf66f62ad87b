use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rules::RuleError;

/// 棋盘格子数量（3×3）。
pub const BOARD_CELLS: usize = 9;

/// 一条连线：三个格子下标。
pub type Line = [usize; 3];

/// 三行、三列、两条对角线。
pub const LINES: [Line; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 玩家记号。X 总是先手。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mark::X => "X",
            Mark::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mark {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Mark::X),
            "O" | "o" => Ok(Mark::O),
            _ => Err(RuleError::InvalidMark {
                value: s.to_string(),
            }),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    #[serde(rename = "")]
    Empty,
    X,
    O,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// 解析前端传来的格子值；未知值返回 `None`，绝不当作空格处理。
    pub fn from_symbol(symbol: &str) -> Option<Cell> {
        match symbol.trim() {
            "" | "." => Some(Cell::Empty),
            "X" | "x" => Some(Cell::X),
            "O" | "o" => Some(Cell::O),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Cell::Empty => "",
            Cell::X => "X",
            Cell::O => "O",
        }
    }
}

/// 对局结果，每次查询都从棋盘重新推导。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "mark")]
pub enum Outcome {
    Ongoing,
    Win(Mark),
    Draw,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// 3×3 棋盘快照，按行优先存储。
///
/// 只有 9 个字节，搜索时按值复制而不是原地修改再撤销。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; BOARD_CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从前端的字符串数组构建棋盘（`""`、`"X"`、`"O"`）。
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self, RuleError> {
        if symbols.len() != BOARD_CELLS {
            return Err(RuleError::InvalidBoardLength {
                length: symbols.len(),
            });
        }
        let mut cells = [Cell::Empty; BOARD_CELLS];
        for (index, symbol) in symbols.iter().enumerate() {
            let symbol = symbol.as_ref();
            cells[index] = Cell::from_symbol(symbol).ok_or_else(|| RuleError::InvalidCell {
                index,
                value: symbol.to_string(),
            })?;
        }
        Ok(Self { cells })
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// 返回落子后的新棋盘，原棋盘不变。`index` 必须是空格。
    pub fn with_mark(mut self, index: usize, mark: Mark) -> Board {
        self.place(index, mark);
        self
    }

    pub(crate) fn place(&mut self, index: usize, mark: Mark) {
        debug_assert!(self.is_empty_at(index), "cell {index} is not an empty cell");
        self.cells[index] = mark.into();
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
    }

    /// (X 数量, O 数量)
    pub fn mark_counts(&self) -> (usize, usize) {
        self.cells.iter().fold((0, 0), |(x, o), cell| match cell {
            Cell::X => (x + 1, o),
            Cell::O => (x, o + 1),
            Cell::Empty => (x, o),
        })
    }

}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let symbol = match self.cells[row * 3 + col] {
                    Cell::Empty => '.',
                    Cell::X => 'X',
                    Cell::O => 'O',
                };
                write!(f, "{symbol}")?;
            }
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

pub fn has_won(board: &Board, mark: Mark) -> bool {
    winning_line_for(board, mark).is_some()
}

pub fn is_full(board: &Board) -> bool {
    board.cells.iter().all(|cell| !cell.is_empty())
}

pub fn is_terminal(board: &Board) -> bool {
    has_won(board, Mark::O) || has_won(board, Mark::X) || is_full(board)
}

/// 判定当前局面。两方同时连成线的人造局面按 O 获胜报告。
pub fn outcome(board: &Board) -> Outcome {
    if has_won(board, Mark::O) {
        Outcome::Win(Mark::O)
    } else if has_won(board, Mark::X) {
        Outcome::Win(Mark::X)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}

/// 获胜方的连线，供前端高亮。
pub fn winning_line(board: &Board) -> Option<Line> {
    winning_line_for(board, Mark::O).or_else(|| winning_line_for(board, Mark::X))
}

fn winning_line_for(board: &Board, mark: Mark) -> Option<Line> {
    let cell = Cell::from(mark);
    LINES
        .iter()
        .copied()
        .find(|line| line.iter().all(|&index| board.cells[index] == cell))
}
