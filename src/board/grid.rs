/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};
use arrayvec::ArrayVec;

use super::{Color, File, KingState, Piece, PieceKind, Rank, Square};

/// Number of men each side starts with, and the most it can ever own.
pub const MEN_PER_SIDE: usize = 16;

/// Order of the pieces on the first rank in the standard starting position.
const BACK_RANK: [PieceKind; File::COUNT] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Names one of the men a [`Side`] owns.
///
/// Slots are stable for the whole game: a captured piece keeps its slot, and a promoted pawn is replaced in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceId {
    color: Color,
    slot: u8,
}

impl PieceId {
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub const fn slot(&self) -> usize {
        self.slot as usize
    }
}

/// A piece together with the square it stands on, or `None` once it has been captured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Man {
    pub(crate) piece: Piece,
    pub(crate) square: Option<Square>,
}

impl Man {
    #[inline(always)]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    #[inline(always)]
    pub const fn square(&self) -> Option<Square> {
        self.square
    }
}

/// One player's men and the value of everything they have captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Side {
    color: Color,
    men: ArrayVec<Man, MEN_PER_SIDE>,
    score: u32,
}

impl Side {
    fn new(color: Color) -> Self {
        Self {
            color,
            men: ArrayVec::new(),
            score: 0,
        }
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Sum of the values of every enemy piece this side has captured.
    #[inline(always)]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// All men this side owns, captured or not, in slot order.
    #[inline(always)]
    pub fn men(&self) -> &[Man] {
        &self.men
    }
}

/// The Tile Grid: 64 squares, each holding at most one reference to a man, plus the two [`Side`]s that own those men.
///
/// A man's square and the square's reference to that man are only ever changed together, through [`Board::place`] and [`Board::lift`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    tiles: [Option<PieceId>; Square::COUNT],
    sides: [Side; Color::COUNT],
}

impl Board {
    /// A board with no pieces at all.
    pub fn empty() -> Self {
        Self {
            tiles: [None; Square::COUNT],
            sides: [Side::new(Color::White), Side::new(Color::Black)],
        }
    }

    /// The standard starting layout.
    ///
    /// Each side's pawns take slots `0..8` by file, followed by its back rank from the a-file to the h-file.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let board = Board::standard();
    /// assert_eq!(board.placement(), PLACEMENT_STARTPOS);
    /// assert_eq!(board.side(Color::White).men().len(), 16);
    /// ```
    pub fn standard() -> Self {
        let mut board = Self::empty();

        for color in Color::all() {
            let pawns = File::iter().map(|file| (PieceKind::Pawn, Square::new(file, Rank::second(color))));
            let officers = File::iter()
                .zip(BACK_RANK)
                .map(|(file, kind)| (kind, Square::new(file, Rank::first(color))));

            for (kind, square) in pawns.chain(officers) {
                // Safety: exactly `MEN_PER_SIDE` men are spawned per side
                board
                    .spawn(Piece::new(color, kind), square)
                    .expect("a side holds at most 16 men");
            }
        }

        board
    }

    /// Creates a new man for `piece`'s side and puts it on `square`.
    ///
    /// Returns `None` if that side already owns [`MEN_PER_SIDE`] men.
    pub fn spawn(&mut self, piece: Piece, square: Square) -> Option<PieceId> {
        let side = &mut self.sides[piece.color()];
        if side.men.is_full() {
            return None;
        }

        let id = PieceId {
            color: piece.color(),
            slot: side.men.len() as u8,
        };
        side.men.push(Man { piece, square: None });
        self.place(id, square);

        Some(id)
    }

    /// Moves the man `id` onto `square`.
    ///
    /// The square it stood on is emptied, and any other man standing on `square` is taken off the board.
    pub fn place(&mut self, id: PieceId, square: Square) {
        if let Some(from) = self.man(id).square {
            self.tiles[from] = None;
        }

        if let Some(occupant) = self.tiles[square] {
            if occupant != id {
                self.man_mut(occupant).square = None;
            }
        }

        self.tiles[square] = Some(id);
        self.man_mut(id).square = Some(square);
    }

    /// Takes whatever stands on `square` off the board, returning its id.
    pub fn lift(&mut self, square: Square) -> Option<PieceId> {
        let id = self.tiles[square].take()?;
        self.man_mut(id).square = None;
        Some(id)
    }

    /// Raw write of a tile, used only to roll back a speculative move.
    #[inline(always)]
    pub(crate) fn restore_tile(&mut self, square: Square, occupant: Option<PieceId>) {
        self.tiles[square] = occupant;
    }

    /// Raw write of a man's square, used only to roll back a speculative move.
    #[inline(always)]
    pub(crate) fn restore_man(&mut self, id: PieceId, square: Option<Square>) {
        self.man_mut(id).square = square;
    }

    /// Swaps the piece in slot `id` for `piece`, keeping its square. Used for promotion.
    pub fn replace(&mut self, id: PieceId, piece: Piece) {
        debug_assert_eq!(id.color, piece.color(), "a promoted piece keeps its color");
        self.man_mut(id).piece = piece;
    }

    #[inline(always)]
    pub fn man(&self, id: PieceId) -> &Man {
        &self.sides[id.color].men[id.slot()]
    }

    #[inline(always)]
    fn man_mut(&mut self, id: PieceId) -> &mut Man {
        &mut self.sides[id.color].men[id.slot()]
    }

    #[inline(always)]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.man(id).piece
    }

    #[inline(always)]
    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.man_mut(id).piece
    }

    /// The id of whatever stands on `square`.
    #[inline(always)]
    pub fn id_at(&self, square: Square) -> Option<PieceId> {
        self.tiles[square]
    }

    /// The piece standing on `square`, if any.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let board = Board::standard();
    /// assert_eq!(board.piece_at(Square::D1), Some(&Piece::Queen(Color::White)));
    /// assert_eq!(board.piece_at(Square::E4), None);
    /// ```
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.tiles[square].map(|id| self.piece(id))
    }

    #[inline(always)]
    pub fn is_empty(&self, square: Square) -> bool {
        self.tiles[square].is_none()
    }

    /// Returns `true` if nothing stands on any of `squares`.
    #[inline(always)]
    pub fn is_clear(&self, squares: &[Square]) -> bool {
        squares.iter().all(|&square| self.is_empty(square))
    }

    #[inline(always)]
    pub fn side(&self, color: Color) -> &Side {
        &self.sides[color]
    }

    pub(crate) fn add_score(&mut self, color: Color, points: u32) {
        self.sides[color].score += points;
    }

    /// Squares occupied by `color`'s men, in slot order.
    pub fn squares_of(&self, color: Color) -> ArrayVec<Square, MEN_PER_SIDE> {
        self.sides[color]
            .men
            .iter()
            .filter_map(|man| man.square)
            .collect()
    }

    /// Closes the en passant window of every `color` pawn.
    pub(crate) fn clear_double_steps(&mut self, color: Color) {
        for man in self.sides[color].men.iter_mut() {
            man.piece.set_double_stepped(false);
        }
    }

    /// The id of `color`'s king, captured or not.
    pub fn king(&self, color: Color) -> Option<PieceId> {
        self.sides[color]
            .men
            .iter()
            .position(|man| man.piece.is_king())
            .map(|slot| PieceId {
                color,
                slot: slot as u8,
            })
    }

    /// The square `color`'s king stands on.
    ///
    /// # Panics
    /// If `color` has no king on the board. Every playable position has both kings.
    pub fn king_square(&self, color: Color) -> Square {
        self.king(color)
            .and_then(|id| self.man(id).square)
            .unwrap_or_else(|| panic!("{} has no king on the board", color.name()))
    }

    pub fn king_state(&self, color: Color) -> Option<&KingState> {
        self.king(color).and_then(|id| self.piece(id).king_state())
    }

    pub(crate) fn king_state_mut(&mut self, color: Color) -> Option<&mut KingState> {
        let id = self.king(color)?;
        self.piece_mut(id).king_state_mut()
    }

    /// Squares of every `by` piece with an uncollided attack on `target`.
    pub fn attackers(&self, target: Square, by: Color) -> ArrayVec<Square, MEN_PER_SIDE> {
        self.squares_of(by)
            .into_iter()
            .filter(|&square| self.attacks_from(square, target))
            .collect()
    }

    /// Returns `true` if any `by` piece has an uncollided attack on `target`.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let board = Board::standard();
    /// assert!(board.is_attacked(Square::F3, Color::White));
    /// assert!(!board.is_attacked(Square::E4, Color::White));
    /// ```
    pub fn is_attacked(&self, target: Square, by: Color) -> bool {
        self.squares_of(by)
            .into_iter()
            .any(|square| self.attacks_from(square, target))
    }

    /// Returns `true` if the piece on `src` attacks `target` along a clear path.
    pub fn attacks_from(&self, src: Square, target: Square) -> bool {
        self.piece_at(src).is_some_and(|piece| {
            piece.attacks(src, target) && self.is_clear(&piece.traversed(src, target))
        })
    }

    /// Serializes the piece placement, rank 8 first, in FEN notation.
    pub fn placement(&self) -> String {
        let mut ranks = Vec::with_capacity(Rank::COUNT);

        for rank in Rank::iter().rev() {
            let mut row = String::with_capacity(File::COUNT);
            let mut empty = 0;

            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty != 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty != 0 {
                row.push_str(&empty.to_string());
            }
            ranks.push(row);
        }

        ranks.join("/")
    }

    /// Builds a board from the piece placement field of a FEN string.
    ///
    /// Pawns are given the lowest slots, then the other men, each in board-scan order. Kings come out eligible to castle both ways;
    /// see [`crate::Position::from_fen`] for the full setup.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let board = Board::from_placement("4k3/8/8/8/8/8/8/4K2R").unwrap();
    /// assert_eq!(board.piece_at(Square::H1), Some(&Piece::Rook(Color::White)));
    /// assert!(Board::from_placement("9/8/8/8/8/8/8/8").is_err());
    /// ```
    pub fn from_placement(placement: &str) -> Result<Self> {
        let mut board = Self::empty();
        let mut placed = Vec::with_capacity(2 * MEN_PER_SIDE);

        if placement.matches('/').count() != 7 {
            bail!("Placement must describe all 8 ranks. Got {placement:?}");
        }

        // Reversed so that White's first rank is rank 0
        for (rank, row) in placement.split('/').rev().enumerate() {
            let rank = Rank::new(rank as u8)?;
            let mut file = 0u8;

            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file += empty as u8;
                    if empty == 0 || file > File::MAX + 1 {
                        bail!("Rank {rank} of {placement:?} does not describe exactly 8 files");
                    }
                    continue;
                }

                let piece = Piece::from_uci(c)?;
                let Ok(file_of_piece) = File::new(file) else {
                    bail!("Rank {rank} of {placement:?} describes more than 8 files");
                };
                placed.push((piece, Square::new(file_of_piece, rank)));
                file += 1;
            }

            if file != File::MAX + 1 {
                bail!("Rank {rank} of {placement:?} does not describe exactly 8 files");
            }
        }

        // Pawns take the low slots, as in the standard layout
        placed.sort_by_key(|(piece, _)| !piece.is_pawn());
        for (piece, square) in placed {
            if board.spawn(piece, square).is_none() {
                bail!("{} has more than {MEN_PER_SIDE} pieces in {placement:?}", piece.color().name());
            }
        }

        Ok(board)
    }
}

impl Default for Board {
    /// The standard starting layout.
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Board {
    /// Draws the board as text, rank 8 at the top, with `.` for empty squares.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let c = self
                    .piece_at(Square::new(file, rank))
                    .map(|p| p.char())
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, " +----------------")?;
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PLACEMENT_STARTPOS;

    /// Every tile reference must be mirrored by the man it names, and vice versa.
    fn assert_consistent(board: &Board) {
        for square in Square::iter() {
            if let Some(id) = board.id_at(square) {
                assert_eq!(board.man(id).square(), Some(square));
            }
        }
        for color in Color::all() {
            for (slot, man) in board.side(color).men().iter().enumerate() {
                if let Some(square) = man.square() {
                    let id = board.id_at(square).unwrap();
                    assert_eq!((id.color(), id.slot()), (color, slot));
                }
            }
        }
    }

    #[test]
    fn test_standard_slots() {
        let board = Board::standard();
        let white = board.side(Color::White).men();
        assert_eq!(white.len(), MEN_PER_SIDE);
        assert!(white[..8].iter().all(|man| man.piece().is_pawn()));
        assert_eq!(white[8].square(), Some(Square::A1));
        assert!(white[12].piece().is_king());
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_consistent(&board);
    }

    #[test]
    fn test_place_and_lift_stay_consistent() {
        let mut board = Board::standard();
        let knight = board.id_at(Square::G1).unwrap();
        board.place(knight, Square::F3);
        assert!(board.is_empty(Square::G1));
        assert_consistent(&board);

        // Landing on an occupied square detaches the occupant
        let pawn = board.id_at(Square::D7).unwrap();
        board.place(knight, Square::D7);
        assert_eq!(board.man(pawn).square(), None);
        assert_eq!(board.id_at(Square::D7), Some(knight));
        assert_consistent(&board);

        assert_eq!(board.lift(Square::D7), Some(knight));
        assert_eq!(board.man(knight).square(), None);
        assert_eq!(board.lift(Square::D7), None);
        assert_consistent(&board);
    }

    #[test]
    fn test_placement_round_trip() {
        assert_eq!(Board::standard().placement(), PLACEMENT_STARTPOS);
        let board = Board::from_placement(PLACEMENT_STARTPOS).unwrap();
        assert_eq!(board, Board::standard());

        let sparse = "8/8/3k4/8/4P3/8/8/4K3";
        assert_eq!(Board::from_placement(sparse).unwrap().placement(), sparse);
    }

    #[test]
    fn test_bad_placements() {
        assert!(Board::from_placement("8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("ppppppppp/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("x7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("pppppppp/pppppppp/p7/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_attacks_respect_blockers() {
        let board = Board::from_placement("4k3/8/8/8/8/8/4P3/4R1K1").unwrap();
        assert!(!board.is_attacked(Square::E8, Color::White));
        assert!(board.is_attacked(Square::E2, Color::White));
        assert!(board.is_attacked(Square::F2, Color::White));
        assert_eq!(board.attackers(Square::F1, Color::White).as_slice(), &[Square::E1, Square::G1]);
    }
}
