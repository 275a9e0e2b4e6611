/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use crate::{Color, PieceKind, Square};

/// Why a requested move was not played.
///
/// Interactive callers usually treat any of these as "nothing happened"; notation replay surfaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is over")]
    GameOver,

    #[error("there is no piece on {0}")]
    EmptySquare(Square),

    #[error("the piece on {square} belongs to {}, but it is {}'s turn", .owner.name(), .owner.opponent().name())]
    WrongSide { square: Square, owner: Color },

    #[error("a piece cannot move from {0} to itself")]
    SameSquare(Square),

    #[error("{to} is occupied by an allied piece")]
    AllyCapture { to: Square },

    #[error("the king on {to} cannot be captured")]
    KingCapture { to: Square },

    #[error("a {} cannot move from {from} to {to}", .kind.name())]
    Illegal {
        kind: PieceKind,
        from: Square,
        to: Square,
    },

    #[error("the path from {from} to {to} is blocked on {blocker}")]
    Blocked {
        from: Square,
        to: Square,
        blocker: Square,
    },

    #[error("the king cannot move into check on {to}")]
    IntoCheck { to: Square },

    #[error("castling is not possible: {reason}")]
    CastleBlocked { reason: &'static str },

    #[error("moving from {from} to {to} leaves the king in check")]
    ExposesKing { from: Square, to: Square },

    #[error("a pawn cannot promote to a {}", .0.name())]
    BadPromotion(PieceKind),
}

/// Why a SAN token could not be turned into a move on the current board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanError {
    #[error("empty move text")]
    Empty,

    #[error("malformed move text {0:?}")]
    Malformed(String),

    #[error("invalid promotion in {0:?}")]
    BadPromotion(String),

    #[error("{0:?} does not agree with the board about capturing")]
    CaptureMismatch(String),

    #[error("a pawn reaching {0} must name a promotion piece")]
    MissingPromotion(Square),

    #[error("no {} can move to {to}", .kind.name())]
    NoCandidate { kind: PieceKind, to: Square },

    #[error("{count} pieces of kind {} can move to {to}", .kind.name())]
    Ambiguous {
        kind: PieceKind,
        to: Square,
        count: usize,
    },

    #[error(transparent)]
    Rejected(#[from] MoveError),
}

/// A failure while replaying a sequence of SAN tokens.
///
/// Moves before the failing token stay committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("move {} ({token:?}) could not be replayed: {source}", .index + 1)]
    Token {
        token: String,
        index: usize,
        source: SanError,
    },

    #[error("unrecognized game result {0:?}")]
    BadResult(String),
}
