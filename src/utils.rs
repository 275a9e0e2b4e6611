/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// FEN string for the starting position of chess.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Piece placement field of [`FEN_STARTPOS`], as stored in move history records.
pub const PLACEMENT_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// A popular FEN string for debugging move generation.
pub const FEN_KIWIPETE: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Name of the environment variable that sets the log filter of the `rookery` binary.
pub const LOG_ENV: &str = "ROOKERY_LOG";

/// Log filter used when [`LOG_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Number of full moves written on each line of PGN movetext.
pub const PGN_MOVES_PER_LINE: usize = 7;

/// PGN result token of a game that is still going, or whose result is unknown.
pub const RESULT_UNKNOWN: &str = "*";
