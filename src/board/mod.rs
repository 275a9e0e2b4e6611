/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Game-end detection: check, checkmate, and stalemate.
pub mod detect;

/// The Tile Grid and the men on it.
mod grid;

/// Per-piece movement rules.
mod movement;

/// Performance testing of move listing.
mod perft;

/// Colors, piece kinds, and the state each piece carries.
mod piece;

/// The legality pipeline, and committing moves.
mod position;

/// Scoped application of a candidate move.
mod speculation;

/// Squares, ranks, and files.
mod square;

pub use grid::*;
pub use movement::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use speculation::*;
pub use square::*;
