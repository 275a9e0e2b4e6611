/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation and the rules of movement.
mod board;

/// Commands accepted by the engine, from the command line or from `stdin`.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Errors reported by move validation and notation.
mod error;

/// A game as a controller drives it.
mod game;

/// The log of played moves.
mod history;

/// Reporting game events to an outside observer.
mod observer;

/// In-memory PGN text.
pub mod pgn;

/// Standard Algebraic Notation.
pub mod san;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use history::*;
pub use observer::*;
pub use san::San;
pub use utils::*;
