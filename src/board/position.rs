/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};
use arrayvec::ArrayVec;
use log::{debug, trace};

use super::{
    detect, Board, CastleOutcome, CastleSide, CheckStatus, Color, File, KingState, Motion, Piece,
    PieceId, PieceKind, Rank, Speculation, Square, MEN_PER_SIDE,
};
use crate::MoveError;

/// A request to move whatever stands on `from` to `to`, promoting to `promotion` if it is a pawn reaching the far rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    #[inline(always)]
    pub const fn with_promotion(self, kind: PieceKind) -> Self {
        Self {
            promotion: Some(kind),
            ..self
        }
    }
}

impl fmt::Display for Move {
    /// Coordinate notation, such as `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

/// Everything about a committed ply that notation needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ply {
    /// Color of the side that moved.
    pub color: Color,
    /// Kind of the piece that moved, before any promotion.
    pub kind: PieceKind,
    pub from: Square,
    pub to: Square,
    pub motion: Motion,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    /// Other pieces of the same kind and color that could also have moved to `to`.
    pub rivals: ArrayVec<Square, MEN_PER_SIDE>,
    /// The opponent's king status after the ply.
    pub status: CheckStatus,
}

/// The full state of a game at one point in time: the board, whose turn it is, and the move counters.
///
/// This is where the legality pipeline lives. See [`Position::can_move`] and [`Position::commit`].
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    halfmove: u16,
    fullmove: u16,
}

impl Position {
    /// The standard starting position, White to move.
    pub fn new() -> Self {
        Self {
            board: Board::standard(),
            side_to_move: Color::White,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// The castling field sets each king's eligibility flags, and the en passant field marks the pawn that just double-stepped.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let position = Position::from_fen(FEN_STARTPOS).unwrap();
    /// assert_eq!(position, Position::default());
    /// assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut split = fen.split_ascii_whitespace();
        let placement = split
            .next()
            .context("FEN string must have piece placements.")?;
        let board = Board::from_placement(placement)?;

        for color in Color::all() {
            let kings = board
                .side(color)
                .men()
                .iter()
                .filter(|man| man.piece().is_king())
                .count();
            if kings != 1 {
                bail!("FEN string must have exactly one {} king. Got {kings}", color.name());
            }
        }

        let active_color = split.next().unwrap_or("w");
        let side_to_move = Color::from_str(active_color)?;

        let mut pos = Self {
            board,
            side_to_move,
            halfmove: 0,
            fullmove: 1,
        };

        let castling = split.next().unwrap_or("-");
        if let Some(c) = castling.chars().find(|c| !"KQkq-".contains(*c)) {
            bail!("FEN castling field may only contain KQkq or '-'. Got {c:?}");
        }
        for color in Color::all() {
            let (short, long) = match color {
                Color::White => ('K', 'Q'),
                Color::Black => ('k', 'q'),
            };
            if let Some(state) = pos.board.king_state_mut(color) {
                state.kingside = castling.contains(short);
                state.queenside = castling.contains(long);
            }
        }

        let en_passant_target = split.next().unwrap_or("-");
        if en_passant_target != "-" {
            let target = Square::from_str(en_passant_target)?;
            let pawn_color = side_to_move.opponent();
            let pawn = target
                .forward(pawn_color)
                .and_then(|square| pos.board.id_at(square))
                .filter(|&id| {
                    let piece = pos.board.piece(id);
                    piece.is_pawn() && piece.color() == pawn_color
                })
                .with_context(|| {
                    format!("FEN en passant square {target} is not behind a {} pawn", pawn_color.name())
                })?;
            pos.board.piece_mut(pawn).set_double_stepped(true);
        }

        let halfmove = split.next().unwrap_or("0");
        pos.halfmove = halfmove
            .parse()
            .with_context(|| format!("FEN string must have valid halfmove counter. Got {halfmove:?}"))?;

        let fullmove = split.next().unwrap_or("1");
        pos.fullmove = fullmove
            .parse()
            .with_context(|| format!("FEN string must have valid fullmove counter. Got {fullmove:?}"))?;

        // The side that just moved may not be left in check
        let waiting = side_to_move.opponent();
        if detect::is_check(&pos.board, waiting) {
            bail!("FEN string leaves the {} king in check while it is not their turn", waiting.name());
        }

        let status = detect::status(&mut pos, side_to_move);
        pos.set_status(side_to_move, status);

        Ok(pos)
    }

    /// Generates a FEN string from this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// assert_eq!(Position::default().to_fen(), FEN_STARTPOS);
    /// ```
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Number of plies since the last pawn move or capture.
    #[inline(always)]
    pub const fn halfmove(&self) -> u16 {
        self.halfmove
    }

    /// Starts at 1 and increments after every Black move.
    #[inline(always)]
    pub const fn fullmove(&self) -> u16 {
        self.fullmove
    }

    /// The extended state of `color`'s king.
    ///
    /// # Panics
    /// If `color` has no king, which no [`Position`] constructor allows.
    pub fn king_state(&self, color: Color) -> &KingState {
        self.board
            .king_state(color)
            .unwrap_or_else(|| panic!("{} has no king", color.name()))
    }

    /// Check status of `color`'s king, as of the last committed ply.
    #[inline(always)]
    pub fn status(&self, color: Color) -> CheckStatus {
        self.king_state(color).check
    }

    fn set_status(&mut self, color: Color, status: CheckStatus) {
        if let Some(state) = self.board.king_state_mut(color) {
            state.check = status;
        }
    }

    /// The target square for an en passant capture, if the last ply was a double step.
    pub fn ep_square(&self) -> Option<Square> {
        let pawn_color = self.side_to_move.opponent();
        self.board
            .squares_of(pawn_color)
            .into_iter()
            .find(|&square| self.board.piece_at(square).is_some_and(|p| p.double_stepped()))
            .and_then(|square| square.backward(pawn_color))
    }

    /// Castling field of a FEN string.
    pub fn castling_rights(&self) -> String {
        let mut rights = String::with_capacity(4);
        for color in Color::all() {
            let Some(state) = self.board.king_state(color) else {
                continue;
            };
            for (side, c) in [(CastleSide::Kingside, 'k'), (CastleSide::Queenside, 'q')] {
                if state.can_castle(side) {
                    rights.push(if color.is_white() { c.to_ascii_uppercase() } else { c });
                }
            }
        }

        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    /// Returns `true` if the piece on `src` may move to `dst` right now, ignoring whose turn it is.
    ///
    /// King safety is evaluated by speculatively applying the move, and the board is always left exactly as it was.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let mut position = Position::default();
    /// assert!(position.can_move(Square::G1, Square::F3));
    /// assert!(!position.can_move(Square::F1, Square::B5));
    /// assert!(!position.can_move(Square::E2, Square::E2));
    /// ```
    #[inline(always)]
    pub fn can_move(&mut self, src: Square, dst: Square) -> bool {
        self.validate(src, dst).is_ok()
    }

    /// Runs every legality check on `src -> dst` in order, returning the kind of move on success or the first failure.
    ///
    /// Whose turn it is is not considered here; see [`Position::commit`].
    pub fn validate(&mut self, src: Square, dst: Square) -> Result<Motion, MoveError> {
        let piece = *self.board.piece_at(src).ok_or(MoveError::EmptySquare(src))?;
        let color = piece.color();

        if src == dst {
            return Err(MoveError::SameSquare(src));
        }

        if let Some(target) = self.board.piece_at(dst) {
            if target.color() == color {
                return Err(MoveError::AllyCapture { to: dst });
            }
            if target.is_king() {
                return Err(MoveError::KingCapture { to: dst });
            }
        }

        let motion = piece
            .is_legal(&self.board, src, dst)
            .ok_or(MoveError::Illegal {
                kind: piece.kind(),
                from: src,
                to: dst,
            })?;

        if let Some(&blocker) = piece
            .traversed(src, dst)
            .iter()
            .find(|&&square| !self.board.is_empty(square))
        {
            return Err(MoveError::Blocked {
                from: src,
                to: dst,
                blocker,
            });
        }

        if piece.is_king() {
            if self.board.is_attacked(dst, color.opponent()) {
                return Err(MoveError::IntoCheck { to: dst });
            }

            if let Motion::Castle(side) = motion {
                self.check_castle(color, side)?;
            }
        }

        if !self.is_safe(src, dst, motion) {
            return Err(if piece.is_king() {
                MoveError::IntoCheck { to: dst }
            } else {
                MoveError::ExposesKing { from: src, to: dst }
            });
        }

        Ok(motion)
    }

    /// Every condition on castling beyond the king's own geometry.
    fn check_castle(&self, color: Color, side: CastleSide) -> Result<(), MoveError> {
        let corner = side.rook_square(color);
        let enemy = color.opponent();

        if self.board.piece_at(corner) != Some(&Piece::Rook(color)) {
            return Err(MoveError::CastleBlocked {
                reason: "the rook is not on its corner",
            });
        }

        if !self.board.is_clear(&side.between(color)) {
            return Err(MoveError::CastleBlocked {
                reason: "pieces stand between the king and the rook",
            });
        }

        if self.board.is_attacked(Square::new(File::E, Rank::first(color)), enemy) {
            return Err(MoveError::CastleBlocked {
                reason: "the king is in check",
            });
        }

        if side
            .king_passage(color)
            .iter()
            .any(|&square| self.board.is_attacked(square, enemy))
        {
            return Err(MoveError::CastleBlocked {
                reason: "the king would pass through or land on an attacked square",
            });
        }

        Ok(())
    }

    /// Returns `true` if the mover's king is not attacked once `src -> dst` has been played.
    fn is_safe(&mut self, src: Square, dst: Square, motion: Motion) -> bool {
        let Some(color) = self.board.piece_at(src).map(|p| p.color()) else {
            return false;
        };

        let trial = Speculation::apply(&mut self.board, src, dst, motion);
        let king = trial.king_square(color);
        let safe = !trial.is_attacked(king, color.opponent());
        trace!("speculating {src}{dst}: king on {king} is {}", if safe { "safe" } else { "attacked" });

        safe
    }

    /// Other pieces of the same kind and color as the one on `src` that can also legally reach `dst`.
    pub fn rivals(&mut self, src: Square, dst: Square) -> ArrayVec<Square, MEN_PER_SIDE> {
        let mut rivals = ArrayVec::new();
        let Some(piece) = self.board.piece_at(src).copied() else {
            return rivals;
        };

        for square in self.board.squares_of(piece.color()) {
            let same_kind = self
                .board
                .piece_at(square)
                .is_some_and(|p| p.kind() == piece.kind());

            if square != src && same_kind && self.can_move(square, dst) {
                rivals.push(square);
            }
        }

        rivals
    }

    /// Plays `from -> to` for the side to move, or returns why it cannot be played, leaving the position untouched.
    ///
    /// A pawn reaching the far rank promotes to `promotion`, or to a queen if none was given.
    /// After the ply, the opponent's check status is recomputed and it becomes their turn.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let mut position = Position::default();
    /// let ply = position.commit(Square::E2, Square::E4, None).unwrap();
    /// assert_eq!(ply.motion, Motion::DoubleStep);
    /// assert_eq!(position.side_to_move(), Color::Black);
    ///
    /// // Not White's turn anymore
    /// assert!(position.commit(Square::D2, Square::D4, None).is_err());
    /// ```
    pub fn commit(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Ply, MoveError> {
        let id = self.board.id_at(from).ok_or(MoveError::EmptySquare(from))?;
        let piece = *self.board.piece(id);
        let color = piece.color();

        if color != self.side_to_move {
            return Err(MoveError::WrongSide {
                square: from,
                owner: color,
            });
        }

        for side in Color::all() {
            if let Some(state) = self.board.king_state_mut(side) {
                state.castle = CastleOutcome::Unattempted;
            }
        }

        let motion = match self.validate(from, to) {
            Ok(motion) => motion,
            Err(err) => {
                if is_castle_attempt(&piece, from, to) {
                    if let Some(state) = self.board.king_state_mut(color) {
                        state.castle = CastleOutcome::Fail;
                    }
                }
                debug!("rejected {} {from}{to}: {err}", piece.name());
                return Err(err);
            }
        };

        let promotion = if piece.is_pawn() && to.rank() == Rank::eighth(color) {
            let kind = promotion.unwrap_or(PieceKind::Queen);
            if !kind.is_promotion() {
                return Err(MoveError::BadPromotion(kind));
            }
            Some(kind)
        } else {
            None
        };

        // Must be computed before the board changes
        let rivals = self.rivals(from, to);

        let captured = self.execute(id, from, to, motion, promotion);

        let opponent = color.opponent();
        self.set_status(color, CheckStatus::Clear);
        self.side_to_move = opponent;
        let status = detect::status(self, opponent);
        self.set_status(opponent, status);

        debug!("{} {from}{to} ({motion:?}) -> {} is {status:?}", piece.name(), opponent.name());

        Ok(Ply {
            color,
            kind: piece.kind(),
            from,
            to,
            motion,
            captured,
            promotion,
            rivals,
            status,
        })
    }

    /// Alias for [`Position::commit`] taking a [`Move`].
    #[inline(always)]
    pub fn make_move(&mut self, mv: Move) -> Result<Ply, MoveError> {
        self.commit(mv.from, mv.to, mv.promotion)
    }

    /// Copies this position and plays `mv` on the copy.
    pub fn with_move_made(&self, mv: Move) -> Result<Self, MoveError> {
        let mut next = self.clone();
        next.make_move(mv)?;
        Ok(next)
    }

    /// Carries out an already validated move, returning the kind of piece captured, if any.
    fn execute(
        &mut self,
        id: PieceId,
        from: Square,
        to: Square,
        motion: Motion,
        promotion: Option<PieceKind>,
    ) -> Option<PieceKind> {
        let color = id.color();
        let moved_pawn = self.board.piece(id).is_pawn();

        let mut captured = None;
        if let Some(victim) = motion.victim(from, to).and_then(|sq| self.board.lift(sq)) {
            let kind = self.board.piece(victim).kind();
            self.board.add_score(color, kind.value());
            captured = Some(kind);
        }

        self.board.place(id, to);

        if let Some(state) = self.board.piece_mut(id).king_state_mut() {
            state.kingside = false;
            state.queenside = false;
            if let Motion::Castle(side) = motion {
                state.castle = side.into();
            }
        }

        if let Motion::Castle(side) = motion {
            let landing = Square::new(side.rook_destination_file(), Rank::first(color));
            if let Some(rook) = self.board.id_at(side.rook_square(color)) {
                self.board.place(rook, landing);
            }
        }

        // Anything leaving or landing on a corner ends castling towards it
        for square in [from, to] {
            for owner in Color::all() {
                if let Some(side) = CastleSide::from_corner(square, owner) {
                    if let Some(state) = self.board.king_state_mut(owner) {
                        state.revoke(side);
                    }
                }
            }
        }

        self.board.clear_double_steps(color.opponent());
        if motion == Motion::DoubleStep {
            self.board.piece_mut(id).set_double_stepped(true);
        }

        if let Some(kind) = promotion {
            self.board.replace(id, Piece::new(color, kind));
        }

        if moved_pawn || captured.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove = self.halfmove.saturating_add(1);
        }
        if color == Color::Black {
            self.fullmove = self.fullmove.saturating_add(1);
        }

        captured
    }

    /// Every legal move for the side to move. Pawn moves to the far rank appear once per promotion choice.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let color = self.side_to_move;
        let mut moves = Vec::with_capacity(64);

        for from in self.board.squares_of(color) {
            let promotes = self.board.piece_at(from).is_some_and(|p| p.is_pawn());

            for to in self.legal_destinations(from) {
                if promotes && to.rank() == Rank::eighth(color) {
                    moves.extend(
                        PieceKind::PROMOTIONS
                            .into_iter()
                            .map(|kind| Move::new(from, to).with_promotion(kind)),
                    );
                } else {
                    moves.push(Move::new(from, to));
                }
            }
        }

        moves
    }

    /// Every square the piece on `square` may legally move to, in board-scan order.
    pub fn legal_destinations(&mut self, square: Square) -> Vec<Square> {
        Square::iter().filter(|&to| self.can_move(square, to)).collect()
    }
}

/// A king leaving its home square for the g- or c-file of its home rank.
fn is_castle_attempt(piece: &Piece, from: Square, to: Square) -> bool {
    let color = piece.color();
    piece.is_king()
        && from == Square::new(File::E, Rank::first(color))
        && to.rank() == from.rank()
        && matches!(to.file(), File::G | File::C)
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    /// Wrapper for [`Position::from_fen`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let placements = self.board.placement();
        let active_color = self.side_to_move;
        let castling = self.castling_rights();
        let en_passant_target = self
            .ep_square()
            .map(|square| square.to_string())
            .unwrap_or(String::from("-"));
        let halfmove = self.halfmove;
        let fullmove = self.fullmove;

        write!(
            f,
            "{placements} {active_color} {castling} {en_passant_target} {halfmove} {fullmove}"
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let piece_char = self
                    .board
                    .piece_at(Square::new(file, rank))
                    .map(|p| p.char())
                    .unwrap_or('.');
                write!(f, " {piece_char}")?;
            }

            if rank == Rank::SEVEN {
                write!(f, "           FEN: {}", self.to_fen())?;
            } else if rank == Rank::SIX {
                write!(f, "          Side: {}", self.side_to_move.name())?;
            } else if rank == Rank::FIVE {
                write!(f, "      Castling: {}", self.castling_rights())?;
            } else if rank == Rank::FOUR {
                let ep = self
                    .ep_square()
                    .map(|square| square.to_string())
                    .unwrap_or(String::from("-"));
                write!(f, "            EP: {ep}")?;
            } else if rank == Rank::THREE {
                write!(f, "     Half-move: {}", self.halfmove)?;
            } else if rank == Rank::TWO {
                write!(f, "     Full-move: {}", self.fullmove)?;
            }
            writeln!(f)?;
        }

        writeln!(f, " +----------------")?;
        write!(f, "   a b c d e f g h")
    }
}
