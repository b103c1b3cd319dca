//! Tic-tac-toe with pseudo-legal move generation and Zobrist hashing.

use std::fmt;
use std::str::FromStr;

use versus_core::{CompactMove, Confidence, Evaluator, GameError, Position, Status};

use crate::error::ParseError;
use crate::zobrist;

/// The eight winning lines, by cell index.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Search order: center, corners, then edges.
const ORDER: [u8; 9] = [4, 0, 2, 6, 8, 1, 3, 5, 7];

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// Index into per-mark tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The other mark.
    pub const fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell of the board, numbered 0-8 row by row from the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    /// All cells in index order.
    pub const ALL: [Cell; 9] = [
        Cell(0),
        Cell(1),
        Cell(2),
        Cell(3),
        Cell(4),
        Cell(5),
        Cell(6),
        Cell(7),
        Cell(8),
    ];

    /// The cell at `index`, if it is on the board.
    pub const fn new(index: u8) -> Option<Cell> {
        if index < 9 { Some(Cell(index)) } else { None }
    }

    /// Index of the cell (0-8).
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl CompactMove for Cell {
    fn to_bits(self) -> u32 {
        self.0 as u32
    }

    fn from_bits(bits: u32) -> Option<Self> {
        u8::try_from(bits).ok().and_then(Cell::new)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.0 % 3) as char;
        let rank = 3 - self.0 / 3;
        write!(f, "{file}{rank}")
    }
}

/// A tic-tac-toe position.
///
/// [`moves`](Position::moves) offers every cell, occupied or not, so the
/// search has to cope with rejected moves. Forks drop the move history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToe {
    cells: [Option<Mark>; 9],
    to_move: Mark,
    hash: u64,
    history: Vec<Cell>,
}

impl TicTacToe {
    /// The empty board, X to move.
    pub fn new() -> Self {
        Self {
            cells: [None; 9],
            to_move: Mark::X,
            hash: 0,
            history: Vec::new(),
        }
    }

    /// The side to move.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Content of `cell`.
    pub fn mark(&self, cell: Cell) -> Option<Mark> {
        self.cells[cell.index()]
    }

    /// Moves played since creation or the last fork, oldest first.
    pub fn history(&self) -> &[Cell] {
        &self.history
    }

    /// Play `cell` for the side to move, as a game would.
    pub fn play(&mut self, cell: Cell) -> Result<(), GameError> {
        if self.status().is_over() {
            return Err(GameError::GameOver);
        }
        if !self.make_move(cell, Confidence::Unsafe) {
            return Err(GameError::IllegalMove {
                mv: cell.to_string(),
            });
        }
        Ok(())
    }

    /// The mark owning a complete line, if any.
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let first = self.cells[line[0]]?;
            line.iter()
                .all(|&cell| self.cells[cell] == Some(first))
                .then_some(first)
        })
    }

    fn status(&self) -> Status {
        match self.winner() {
            Some(mark) if mark == self.to_move => Status::Win,
            Some(_) => Status::Loss,
            None if self.cells.iter().all(Option::is_some) => Status::Draw,
            None => Status::Playing,
        }
    }

    fn toggle(&mut self, cell: Cell, mark: Mark) {
        self.hash ^= zobrist::MARK_CELL[mark.index()][cell.index()];
        self.hash ^= zobrist::O_TO_MOVE;
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl Position for TicTacToe {
    type Move = Cell;

    fn make_move(&mut self, mv: Cell, _confidence: Confidence) -> bool {
        if self.cells[mv.index()].is_some() {
            return false;
        }
        let mark = self.to_move;
        self.cells[mv.index()] = Some(mark);
        self.toggle(mv, mark);
        self.to_move = mark.opponent();
        self.history.push(mv);
        true
    }

    /// # Panics
    ///
    /// Panics when there is no move to undo, including moves played before
    /// a fork.
    fn unmake_move(&mut self) {
        let Some(cell) = self.history.pop() else {
            panic!("no move to undo");
        };
        let mark = self.to_move.opponent();
        self.cells[cell.index()] = None;
        self.toggle(cell, mark);
        self.to_move = mark;
    }

    fn moves(&self) -> Vec<Cell> {
        ORDER.iter().map(|&index| Cell(index)).collect()
    }

    fn legal_moves(&self) -> Vec<Cell> {
        if self.status().is_over() {
            return Vec::new();
        }
        self.moves()
            .into_iter()
            .filter(|&cell| self.cells[cell.index()].is_none())
            .collect()
    }

    fn contextual_status(&self) -> Status {
        self.status()
    }

    fn end_game_status(&self) -> Status {
        self.status()
    }

    fn hash_key(&self) -> Option<u64> {
        Some(self.hash)
    }

    fn fork(&self) -> Self {
        Self {
            cells: self.cells,
            to_move: self.to_move,
            hash: self.hash,
            history: Vec::new(),
        }
    }
}

impl FromStr for TicTacToe {
    type Err = ParseError;

    /// Parse nine cells (`X`, `O` or `.`), row by row. Whitespace and `/`
    /// are ignored. The side to move follows from the mark counts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = TicTacToe::new();
        let mut count = 0;
        for character in s.chars().filter(|c| !c.is_whitespace() && *c != '/') {
            let mark = match character {
                'X' | 'x' => Some(Mark::X),
                'O' | 'o' => Some(Mark::O),
                '.' | '-' => None,
                _ => return Err(ParseError::InvalidCellChar { character }),
            };
            if count < 9 {
                board.cells[count] = mark;
            }
            count += 1;
        }
        if count != 9 {
            return Err(ParseError::WrongCellCount { found: count });
        }

        let x = board.cells.iter().filter(|&&c| c == Some(Mark::X)).count();
        let o = board.cells.iter().filter(|&&c| c == Some(Mark::O)).count();
        board.to_move = match x.checked_sub(o) {
            Some(0) => Mark::X,
            Some(1) => Mark::O,
            _ => return Err(ParseError::ImpossibleCounts { x, o }),
        };

        for cell in Cell::ALL {
            if let Some(mark) = board.cells[cell.index()] {
                board.hash ^= zobrist::MARK_CELL[mark.index()][cell.index()];
            }
        }
        if board.to_move == Mark::O {
            board.hash ^= zobrist::O_TO_MOVE;
        }
        Ok(board)
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, cell) in self.cells.iter().enumerate() {
            let c = match cell {
                Some(Mark::X) => 'X',
                Some(Mark::O) => 'O',
                None => '.',
            };
            write!(f, "{c}")?;
            if index % 3 == 2 && index < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Counts open lines: a line holding only one side's marks is worth the
/// square of its mark count to that side.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToeEvaluator;

impl Evaluator<TicTacToe> for TicTacToeEvaluator {
    fn evaluate(&mut self, position: &TicTacToe) -> i32 {
        let me = Some(position.to_move);
        let them = Some(position.to_move.opponent());
        LINES
            .iter()
            .map(|line| {
                let mine = line.iter().filter(|&&c| position.cells[c] == me).count() as i32;
                let theirs = line.iter().filter(|&&c| position.cells[c] == them).count() as i32;
                match (mine, theirs) {
                    (0, 0) => 0,
                    (m, 0) => m * m,
                    (0, t) => -t * t,
                    _ => 0,
                }
            })
            .sum()
    }

    fn fork(&self) -> Self {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(index: u8) -> Cell {
        Cell::new(index).unwrap()
    }

    #[test]
    fn new_board_offers_every_cell() {
        let board = TicTacToe::new();
        assert_eq!(board.moves().len(), 9);
        assert_eq!(board.legal_moves().len(), 9);
        assert_eq!(board.contextual_status(), Status::Playing);
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let mut board = TicTacToe::new();
        assert!(board.make_move(cell(4), Confidence::Legal));
        let before = board.clone();
        assert!(!board.make_move(cell(4), Confidence::PseudoLegal));
        assert_eq!(board, before);
    }

    #[test]
    fn make_unmake_restores_hash_and_cells() {
        let mut board: TicTacToe = "X../.O./...".parse().unwrap();
        let before = board.clone();
        assert!(board.make_move(cell(8), Confidence::Legal));
        assert_ne!(board.hash_key(), before.hash_key());
        board.unmake_move();
        assert_eq!(board, before);
    }

    #[test]
    fn parsed_hash_matches_played_hash() {
        let mut played = TicTacToe::new();
        played.play(cell(0)).unwrap();
        played.play(cell(4)).unwrap();
        let parsed: TicTacToe = "X.. .O. ...".parse().unwrap();
        assert_eq!(played.hash_key(), parsed.hash_key());
        assert_eq!(parsed.to_move(), Mark::X);
    }

    #[test]
    fn completed_line_is_a_loss_for_the_side_to_move() {
        let board: TicTacToe = "XXX/OO./...".parse().unwrap();
        assert_eq!(board.winner(), Some(Mark::X));
        assert_eq!(board.contextual_status(), Status::Loss);
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board: TicTacToe = "XOX/XOO/OXX".parse().unwrap();
        assert_eq!(board.end_game_status(), Status::Draw);
    }

    #[test]
    fn play_after_game_over_fails() {
        let mut board: TicTacToe = "XXX/OO./...".parse().unwrap();
        assert_eq!(board.play(cell(5)), Err(GameError::GameOver));
    }

    #[test]
    fn play_on_occupied_cell_fails() {
        let mut board = TicTacToe::new();
        board.play(cell(0)).unwrap();
        assert!(matches!(
            board.play(cell(0)),
            Err(GameError::IllegalMove { .. })
        ));
    }

    #[test]
    fn fork_is_independent() {
        let mut board = TicTacToe::new();
        board.play(cell(0)).unwrap();
        let mut fork = board.fork();
        assert!(fork.make_move(cell(4), Confidence::Legal));
        assert_eq!(board.mark(cell(4)), None);
        fork.unmake_move();
        assert_eq!(fork.mark(cell(0)), Some(Mark::X));
        assert!(fork.history().is_empty());
    }

    #[test]
    #[should_panic(expected = "no move to undo")]
    fn fork_cannot_undo_moves_played_before_it() {
        let mut board = TicTacToe::new();
        board.play(cell(0)).unwrap();
        let mut fork = board.fork();
        fork.unmake_move();
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            "XX".parse::<TicTacToe>(),
            Err(ParseError::WrongCellCount { found: 2 })
        );
        assert_eq!(
            "XXX/.../...".parse::<TicTacToe>(),
            Err(ParseError::ImpossibleCounts { x: 3, o: 0 })
        );
        assert_eq!(
            "XZ./.../...".parse::<TicTacToe>(),
            Err(ParseError::InvalidCellChar { character: 'Z' })
        );
    }

    #[test]
    fn evaluator_prefers_open_lines() {
        let mut evaluator = TicTacToeEvaluator;
        // O to move, X holds the center
        let board: TicTacToe = ".../.X./...".parse().unwrap();
        assert!(evaluator.evaluate(&board) < 0);
    }

    #[test]
    fn cell_bits_roundtrip() {
        for cell in Cell::ALL {
            assert_eq!(Cell::from_bits(cell.to_bits()), Some(cell));
        }
        assert_eq!(Cell::from_bits(9), None);
    }

    #[test]
    fn cell_display() {
        assert_eq!(cell(0).to_string(), "a3");
        assert_eq!(cell(8).to_string(), "c1");
    }
}
