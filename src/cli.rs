/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::{PieceKind, Square};

/// A command to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Move the piece on one square to another, if the rules allow it.
    #[command(alias = "m")]
    Move {
        from: Square,

        to: Square,

        /// Piece to promote to, if the move brings a pawn to the far rank.
        #[arg(short, long)]
        promote: Option<PieceKind>,
    },

    /// Play one or more moves written in Standard Algebraic Notation.
    San { moves: Vec<String> },

    /// Start over and replay a game from PGN movetext, such as `1. e4 e5 2. Nf3 1-0`.
    Load {
        #[arg(required = true, allow_hyphen_values = true)]
        movetext: Vec<String>,
    },

    /// Start a new game from the provided FEN string.
    Setup {
        #[arg(required = true, allow_hyphen_values = true)]
        fen: Vec<String>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves { square: Option<Square> },

    /// Print the moves played so far.
    History,

    /// Show the board after the first move.
    First,

    /// Show the board after the latest move.
    Last,

    /// Show the board one move earlier than the one shown.
    #[command(alias = "previous")]
    Prev,

    /// Show the board one move later than the one shown.
    Next,

    /// Start over from the starting position.
    #[command(alias = "new")]
    Reset,

    /// The side to move resigns.
    Resign,

    /// Agree to a draw.
    Draw,

    /// Print the game as PGN text.
    Pgn {
        #[arg(long, default_value = "?")]
        event: String,

        #[arg(long, default_value = "?")]
        site: String,

        #[arg(long, default_value = "????.??.??")]
        date: String,

        #[arg(long, default_value = "?")]
        round: String,

        #[arg(long, default_value = "?")]
        white: String,

        #[arg(long, default_value = "?")]
        black: String,
    },

    /// Print the capture score of each side.
    Score,

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_moves() {
        assert_eq!(
            "move e7 e8 --promote n".parse::<EngineCommand>().unwrap(),
            EngineCommand::Move {
                from: Square::E7,
                to: Square::E8,
                promote: Some(PieceKind::Knight)
            }
        );
        assert_eq!(
            "san e4 e5 Nf3".parse::<EngineCommand>().unwrap(),
            EngineCommand::San {
                moves: vec![String::from("e4"), String::from("e5"), String::from("Nf3")]
            }
        );
        assert!("move e2".parse::<EngineCommand>().is_err());
        assert!("move e2 z9".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_parse_setup_and_load() {
        let fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";
        let EngineCommand::Setup { fen: parts } = format!("setup {fen}").parse().unwrap() else {
            panic!("expected setup");
        };
        assert_eq!(parts.join(" "), fen);

        let EngineCommand::Load { movetext } = "load 1. e4 e5 0-1".parse().unwrap() else {
            panic!("expected load");
        };
        assert_eq!(movetext.join(" "), "1. e4 e5 0-1");
    }

    #[test]
    fn test_parse_pgn_tags() {
        let EngineCommand::Pgn { white, black, event, .. } =
            "pgn --white Alice --black Bob".parse().unwrap()
        else {
            panic!("expected pgn");
        };
        assert_eq!((white.as_str(), black.as_str(), event.as_str()), ("Alice", "Bob", "?"));
    }

    #[test]
    fn test_aliases() {
        assert_eq!("d".parse::<EngineCommand>().unwrap(), EngineCommand::Display);
        assert_eq!("quit".parse::<EngineCommand>().unwrap(), EngineCommand::Exit);
        assert_eq!(
            "perft 3".parse::<EngineCommand>().unwrap(),
            EngineCommand::Perft { depth: 3 }
        );
    }
}
