/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;

use crate::{
    CastleSide, CheckStatus, File, Motion, Move, PieceKind, Ply, Position, Rank, SanError, Square,
    MEN_PER_SIDE,
};

/// Renders a committed ply in Standard Algebraic Notation.
///
/// Disambiguation uses the rivals recorded on the ply: the source file if no rival shares it,
/// else the source rank if no rival shares that, else the whole source square.
///
/// # Example
/// ```
/// # use rookery::*;
/// let mut position = Position::default();
/// let ply = position.commit(Square::G1, Square::F3, None).unwrap();
/// assert_eq!(san::render(&ply), "Nf3");
/// ```
pub fn render(ply: &Ply) -> String {
    let mut san = String::with_capacity(8);

    if let Motion::Castle(side) = ply.motion {
        san.push_str(side.san());
    } else {
        match ply.kind.san_letter() {
            Some(letter) => {
                san.push(letter);
                disambiguate(&mut san, ply);
            }
            // Pawn captures name the file they left
            None if ply.captured.is_some() => san.push(ply.from.file().char()),
            None => {}
        }

        if ply.captured.is_some() {
            san.push('x');
        }
        san.push_str(&ply.to.to_string());

        if let Some(letter) = ply.promotion.and_then(|kind| kind.san_letter()) {
            san.push('=');
            san.push(letter);
        }
    }

    match ply.status {
        CheckStatus::Check => san.push('+'),
        CheckStatus::Mate => san.push('#'),
        CheckStatus::Clear | CheckStatus::Stalemate => {}
    }

    san
}

fn disambiguate(san: &mut String, ply: &Ply) {
    let from = ply.from;
    if ply.rivals.is_empty() {
        return;
    }

    if ply.rivals.iter().all(|rival| rival.file() != from.file()) {
        san.push(from.file().char());
    } else if ply.rivals.iter().all(|rival| rival.rank() != from.rank()) {
        san.push(from.rank().char());
    } else {
        san.push_str(&from.to_string());
    }
}

/// A parsed SAN token, not yet tied to a board.
///
/// Check, mate, and annotation suffixes (`+ # ! ?`) are accepted and ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum San {
    Castle(CastleSide),
    Normal {
        kind: PieceKind,
        file: Option<File>,
        rank: Option<Rank>,
        capture: bool,
        to: Square,
        promotion: Option<PieceKind>,
    },
}

impl San {
    /// Finds the one move of the side to move that this token describes.
    ///
    /// Zero candidates is [`SanError::NoCandidate`], and more than one is [`SanError::Ambiguous`]; the
    /// token is never settled by picking the first match.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let mut position = Position::default();
    /// let san: San = "Nc3".parse().unwrap();
    /// assert_eq!(san.resolve(&mut position).unwrap(), Move::new(Square::B1, Square::C3));
    /// ```
    pub fn resolve(&self, position: &mut Position) -> Result<Move, SanError> {
        let color = position.side_to_move();

        let (kind, file, rank, capture, to, promotion) = match *self {
            San::Castle(side) => {
                let from = position.board().king_square(color);
                return Ok(Move::new(from, Square::new(side.king_file(), Rank::first(color))));
            }
            San::Normal {
                kind,
                file,
                rank,
                capture,
                to,
                promotion,
            } => (kind, file, rank, capture, to, promotion),
        };

        let mut candidates: ArrayVec<Square, MEN_PER_SIDE> = ArrayVec::new();
        let mut mismatched = false;
        for square in position.board().squares_of(color) {
            let fits = position.board().piece_at(square).is_some_and(|p| p.kind() == kind)
                && file.map_or(true, |file| square.file() == file)
                && rank.map_or(true, |rank| square.rank() == rank);
            if !fits {
                continue;
            }

            match position.validate(square, to) {
                Ok(motion) if motion.is_capture() == capture => candidates.push(square),
                Ok(_) => mismatched = true,
                Err(_) => {}
            }
        }

        let from = match candidates.as_slice() {
            [] if mismatched => return Err(SanError::CaptureMismatch(self.to_string())),
            [] => return Err(SanError::NoCandidate { kind, to }),
            [from] => *from,
            many => {
                return Err(SanError::Ambiguous {
                    kind,
                    to,
                    count: many.len(),
                })
            }
        };

        let promotes = kind == PieceKind::Pawn && to.rank() == Rank::eighth(color);
        match (promotes, promotion) {
            (true, None) => Err(SanError::MissingPromotion(to)),
            (false, Some(_)) => Err(SanError::BadPromotion(self.to_string())),
            (_, promotion) => Ok(Move {
                from,
                to,
                promotion,
            }),
        }
    }
}

impl FromStr for San {
    type Err = SanError;

    /// Parses a SAN token such as `e4`, `Nbd7`, `exd6`, `e8=Q+`, or `O-O-O`.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let san: San = "Raxd1+".parse().unwrap();
    /// assert!(matches!(san, San::Normal { kind: PieceKind::Rook, capture: true, .. }));
    /// assert_eq!("0-0".parse::<San>().unwrap(), San::Castle(CastleSide::Kingside));
    /// assert!("Zz9".parse::<San>().is_err());
    /// ```
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SanError::Empty);
        }

        let malformed = || SanError::Malformed(token.to_string());
        let body = token.trim_end_matches(['+', '#', '!', '?']);
        if !body.is_ascii() {
            return Err(malformed());
        }

        match body {
            "O-O" | "0-0" => return Ok(Self::Castle(CastleSide::Kingside)),
            "O-O-O" | "0-0-0" => return Ok(Self::Castle(CastleSide::Queenside)),
            _ => {}
        }

        let bad_promotion = || SanError::BadPromotion(token.to_string());
        let (body, promotion) = if let Some((rest, piece)) = body.split_once('=') {
            (rest, Some(parse_promotion(piece).ok_or_else(bad_promotion)?))
        } else {
            // A bare promotion letter straight after the destination rank, as in `e8Q`
            let bytes = body.as_bytes();
            match bytes {
                [.., rank, piece] if rank.is_ascii_digit() && piece.is_ascii_uppercase() => {
                    let kind = parse_promotion(&body[body.len() - 1..]).ok_or_else(bad_promotion)?;
                    (&body[..body.len() - 1], Some(kind))
                }
                _ => (body, None),
            }
        };

        let (kind, rest) = match body.chars().next() {
            Some(c @ ('K' | 'Q' | 'R' | 'B' | 'N')) => {
                (PieceKind::from_uci(c).map_err(|_| malformed())?, &body[1..])
            }
            _ => (PieceKind::Pawn, body),
        };

        if rest.len() < 2 {
            return Err(malformed());
        }
        let (prefix, destination) = rest.split_at(rest.len() - 2);
        let to = Square::from_str(destination).map_err(|_| malformed())?;

        let mut chars = prefix.chars().peekable();
        let file = chars
            .next_if(|&c| matches!(c, 'a'..='h'))
            .and_then(|c| File::from_char(c).ok());
        let rank = chars
            .next_if(|&c| matches!(c, '1'..='8'))
            .and_then(|c| Rank::from_char(c).ok());
        let capture = chars.next_if_eq(&'x').is_some();
        if chars.next().is_some() {
            return Err(malformed());
        }

        Ok(Self::Normal {
            kind,
            file,
            rank,
            capture,
            to,
            promotion,
        })
    }
}

/// A single promotion letter; kings and pawns are rejected.
fn parse_promotion(piece: &str) -> Option<PieceKind> {
    piece.parse::<PieceKind>().ok().filter(|kind| kind.is_promotion())
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Castle(side) => write!(f, "{}", side.san()),
            Self::Normal {
                kind,
                file,
                rank,
                capture,
                to,
                promotion,
            } => {
                if let Some(letter) = kind.san_letter() {
                    write!(f, "{letter}")?;
                }
                if let Some(file) = file {
                    write!(f, "{file}")?;
                }
                if let Some(rank) = rank {
                    write!(f, "{rank}")?;
                }
                if *capture {
                    write!(f, "x")?;
                }
                write!(f, "{to}")?;
                if let Some(letter) = promotion.and_then(|kind| kind.san_letter()) {
                    write!(f, "={letter}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(fen: &str, from: Square, to: Square) -> String {
        let mut position = Position::from_fen(fen).unwrap();
        render(&position.commit(from, to, None).unwrap())
    }

    #[test]
    fn test_render_plain_moves() {
        assert_eq!(play(crate::FEN_STARTPOS, Square::E2, Square::E4), "e4");
        assert_eq!(play(crate::FEN_STARTPOS, Square::B1, Square::C3), "Nc3");
    }

    #[test]
    fn test_render_captures() {
        assert_eq!(
            play("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", Square::E4, Square::D5),
            "exd5"
        );
        assert_eq!(
            play("4k3/8/8/3p4/8/8/8/3RK3 w - - 0 1", Square::D1, Square::D5),
            "Rxd5"
        );
        assert_eq!(
            play("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", Square::E5, Square::D6),
            "exd6"
        );
    }

    #[test]
    fn test_render_disambiguation() {
        // Different files
        assert_eq!(
            play("4k3/8/8/8/8/8/8/R4RK1 w - - 0 1", Square::A1, Square::D1),
            "Rad1"
        );
        // Same file, different ranks
        assert_eq!(
            play("4k3/8/8/R7/8/8/8/R5K1 w - - 0 1", Square::A1, Square::A3),
            "R1a3"
        );
        // One rival shares the file and another shares the rank
        assert_eq!(
            play("8/8/1k6/8/4Q2Q/8/8/K6Q w - - 0 1", Square::H4, Square::E1),
            "Qh4e1"
        );
        // A pinned rival does not count
        assert_eq!(
            play("4k3/4r3/8/4N3/8/8/8/2N1K3 w - - 0 1", Square::C1, Square::D3),
            "Nd3"
        );
    }

    #[test]
    fn test_render_promotion_and_check() {
        assert_eq!(
            play("3r3k/4P3/8/8/8/8/8/K7 w - - 0 1", Square::E7, Square::D8),
            "exd8=Q+"
        );
        // The knight uncovers the rook
        assert_eq!(
            play("4k3/8/8/8/4N3/8/8/4R1K1 w - - 0 1", Square::E4, Square::C5),
            "Nc5+"
        );
    }

    #[test]
    fn test_render_castles() {
        assert_eq!(
            play("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", Square::E1, Square::G1),
            "O-O"
        );
        assert_eq!(
            play("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", Square::E8, Square::C8),
            "O-O-O"
        );
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(
            "Nbd7".parse::<San>().unwrap(),
            San::Normal {
                kind: PieceKind::Knight,
                file: Some(File::B),
                rank: None,
                capture: false,
                to: Square::D7,
                promotion: None,
            }
        );
        assert_eq!(
            "exd8Q#".parse::<San>().unwrap(),
            San::Normal {
                kind: PieceKind::Pawn,
                file: Some(File::E),
                rank: None,
                capture: true,
                to: Square::D8,
                promotion: Some(PieceKind::Queen),
            }
        );
        assert_eq!("O-O-O+".parse::<San>().unwrap(), San::Castle(CastleSide::Queenside));
        assert_eq!("Qh4e1".parse::<San>().unwrap().to_string(), "Qh4e1");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<San>(), Err(SanError::Empty));
        assert!(matches!("Zf3".parse::<San>(), Err(SanError::Malformed(_))));
        assert!(matches!("e9".parse::<San>(), Err(SanError::Malformed(_))));
        assert!(matches!("Nf3xx".parse::<San>(), Err(SanError::Malformed(_))));
        assert!(matches!("e8=K".parse::<San>(), Err(SanError::BadPromotion(_))));
    }

    #[test]
    fn test_resolve_failures() {
        let mut position = Position::default();
        let san: San = "Nd2".parse().unwrap();
        assert_eq!(
            san.resolve(&mut position),
            Err(SanError::NoCandidate {
                kind: PieceKind::Knight,
                to: Square::D2
            })
        );

        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/R4RK1 w - - 0 1").unwrap();
        let san: San = "Rd1".parse().unwrap();
        assert_eq!(
            san.resolve(&mut position),
            Err(SanError::Ambiguous {
                kind: PieceKind::Rook,
                to: Square::D1,
                count: 2
            })
        );
        let san: San = "Rfd1".parse().unwrap();
        assert_eq!(san.resolve(&mut position).unwrap(), Move::new(Square::F1, Square::D1));

        let mut position = Position::from_fen("8/4P2k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let san: San = "e8".parse().unwrap();
        assert_eq!(san.resolve(&mut position), Err(SanError::MissingPromotion(Square::E8)));
        let san: San = "e8=N".parse().unwrap();
        assert_eq!(
            san.resolve(&mut position).unwrap(),
            Move::new(Square::E7, Square::E8).with_promotion(PieceKind::Knight)
        );
    }

    #[test]
    fn test_resolve_castle() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        let san: San = "O-O".parse().unwrap();
        assert_eq!(san.resolve(&mut position).unwrap(), Move::new(Square::E8, Square::G8));
    }

    #[test]
    fn test_resolve_capture_marker() {
        let mut position = Position::default();
        let san: San = "Nxf3".parse().unwrap();
        assert_eq!(
            san.resolve(&mut position),
            Err(SanError::CaptureMismatch(String::from("Nxf3")))
        );

        let mut position = Position::from_fen("4k3/8/8/8/4p3/3P4/8/4K3 w - - 0 1").unwrap();
        let san: San = "e4".parse().unwrap();
        assert_eq!(
            san.resolve(&mut position),
            Err(SanError::CaptureMismatch(String::from("e4")))
        );
        let san: San = "dxe4".parse().unwrap();
        assert_eq!(san.resolve(&mut position).unwrap(), Move::new(Square::D3, Square::E4));

        let mut position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let san: San = "exd6".parse().unwrap();
        assert_eq!(san.resolve(&mut position).unwrap(), Move::new(Square::E5, Square::D6));
    }
}
