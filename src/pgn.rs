/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::Write;

use anyhow::{bail, Context, Result};

use crate::{Game, Position, PGN_MOVES_PER_LINE, RESULT_UNKNOWN};

/// Values of the Seven Tag Roster, minus `Result`, which always comes from the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tags {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl Default for Tags {
    /// Every tag unknown.
    fn default() -> Self {
        let unknown = || String::from("?");
        Self {
            event: unknown(),
            site: unknown(),
            date: String::from("????.??.??"),
            round: unknown(),
            white: unknown(),
            black: unknown(),
        }
    }
}

/// Renders `game` as PGN text: tag pairs, a blank line, then numbered movetext ending in the result.
///
/// Games that did not start from the standard position also get `SetUp` and `FEN` tags.
///
/// # Example
/// ```
/// # use rookery::*;
/// let mut game = Game::new();
/// game.replay(["e4", "e5", "Nf3"]).unwrap();
/// let pgn = pgn::write_pgn(&game, &pgn::Tags::default());
/// assert!(pgn.starts_with("[Event \"?\"]\n"));
/// assert!(pgn.ends_with("\n\n1. e4 e5 2. Nf3 *\n"));
/// ```
pub fn write_pgn(game: &Game, tags: &Tags) -> String {
    let result = game.result().map_or(RESULT_UNKNOWN, |result| result.as_str());
    let mut pgn = String::with_capacity(512);

    let roster = [
        ("Event", tags.event.as_str()),
        ("Site", tags.site.as_str()),
        ("Date", tags.date.as_str()),
        ("Round", tags.round.as_str()),
        ("White", tags.white.as_str()),
        ("Black", tags.black.as_str()),
        ("Result", result),
    ];
    for (name, value) in roster {
        write_tag(&mut pgn, name, value);
    }

    let start = game.start();
    if *start != Position::default() {
        write_tag(&mut pgn, "SetUp", "1");
        write_tag(&mut pgn, "FEN", &start.to_fen());
    }
    pgn.push('\n');

    let mut number = start.fullmove();
    let mut color = start.side_to_move();
    let mut full_moves = 0;
    for (i, san) in game.history().sans().enumerate() {
        if color.is_white() {
            // Writing into a String cannot fail
            let _ = write!(pgn, "{number}. ");
        } else if i == 0 {
            let _ = write!(pgn, "{number}... ");
        }
        pgn.push_str(san);

        if color.is_white() {
            pgn.push(' ');
        } else {
            number += 1;
            full_moves += 1;
            pgn.push(if full_moves % PGN_MOVES_PER_LINE == 0 { '\n' } else { ' ' });
        }
        color = color.opponent();
    }

    pgn.push_str(result);
    pgn.push('\n');
    pgn
}

fn write_tag(pgn: &mut String, name: &str, value: &str) {
    let value = value.replace('\\', "\\\\").replace('"', "\\\"");
    let _ = writeln!(pgn, "[{name} \"{value}\"]");
}

/// A game read from PGN text, ready for [`Game::load_game`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PgnGame {
    /// Tag pairs, in the order they appeared.
    pub tags: Vec<(String, String)>,

    /// SAN tokens of the main line.
    pub moves: Vec<String>,

    /// The result token, or `*` if the game gives none.
    pub result: String,
}

impl PgnGame {
    /// Value of the tag called `name`, if present.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Reads one game of PGN text.
///
/// Move numbers, comments (`{...}` and `;` to end of line), variations, and NAGs are skipped.
/// Without a result token in the movetext, the `Result` tag is used.
///
/// # Example
/// ```
/// # use rookery::*;
/// let text = "[Event \"Casual\"]\n[Result \"1-0\"]\n\n1. e4 {best by test} e5 (1... c5) 2. Nf3 $1 Nc6 1-0";
/// let game = pgn::read_pgn(text).unwrap();
/// assert_eq!(game.tag("Event"), Some("Casual"));
/// assert_eq!(game.moves, ["e4", "e5", "Nf3", "Nc6"]);
/// assert_eq!(game.result, "1-0");
/// ```
pub fn read_pgn(text: &str) -> Result<PgnGame> {
    let mut game = PgnGame::default();
    let mut movetext = String::with_capacity(text.len());

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            game.tags.push(parse_tag(line)?);
        } else {
            movetext.push_str(line);
            movetext.push('\n');
        }
    }

    let mut result = None;
    for token in tokenize(&movetext)? {
        if token.starts_with('$') {
            continue;
        }

        if is_result(&token) {
            result = Some(token);
            break;
        }

        // Move numbers, possibly glued to the move as in `1.e4`
        let digits = token.trim_start_matches(|c: char| c.is_ascii_digit());
        let token = if digits.starts_with('.') {
            digits.trim_start_matches('.')
        } else {
            token.as_str()
        };
        if !token.is_empty() {
            game.moves.push(token.to_string());
        }
    }

    game.result = result
        .or_else(|| game.tag("Result").map(str::to_string))
        .unwrap_or_else(|| RESULT_UNKNOWN.to_string());

    Ok(game)
}

fn is_result(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Parses a `[Name "Value"]` line.
fn parse_tag(line: &str) -> Result<(String, String)> {
    let inner = line
        .strip_prefix('[')
        .and_then(|line| line.strip_suffix(']'))
        .with_context(|| format!("PGN tag must be enclosed in brackets. Got {line:?}"))?;

    let (name, value) = inner
        .split_once(char::is_whitespace)
        .with_context(|| format!("PGN tag must have a name and a value. Got {line:?}"))?;

    let Some(value) = value.trim().strip_prefix('"').and_then(|value| value.strip_suffix('"')) else {
        bail!("PGN tag value must be quoted. Got {line:?}");
    };

    Ok((name.to_string(), value.replace("\\\"", "\"").replace("\\\\", "\\")))
}

/// Splits movetext on whitespace, dropping comments and variations.
fn tokenize(movetext: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut chars = movetext.chars();
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !chars.by_ref().any(|c| c == '}') {
                    bail!("Unterminated comment in PGN movetext");
                }
            }
            ';' => {
                chars.by_ref().find(|&c| c == '\n');
            }
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .context("Unbalanced ')' in PGN movetext")?;
            }
            _ if depth > 0 => {}
            c if c.is_whitespace() => {}
            c => {
                token.push(c);
                continue;
            }
        }

        if !token.is_empty() {
            tokens.push(std::mem::take(&mut token));
        }
    }

    if depth > 0 {
        bail!("Unterminated variation in PGN movetext");
    }
    if !token.is_empty() {
        tokens.push(token);
    }

    Ok(tokens)
}
