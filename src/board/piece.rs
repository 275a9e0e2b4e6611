/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{File, Rank, Square};

/// Represents the color of a player or piece.
///
/// In Western chess, White traditionally moves first, and therefore [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Returns `true` if this [`Color`] is White.
    #[inline(always)]
    pub const fn is_white(&self) -> bool {
        matches!(self, Self::White)
    }

    /// Returns this [`Color`]'s opposite / inverse / enemy.
    ///
    /// # Example
    /// ```
    /// # use rookery::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns this [`Color`] as a `usize`.
    ///
    /// Will be `0` for White, `1` for Black.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Creates a [`Color`] from a `char`, as found in the side-to-move field of a FEN string.
    ///
    /// # Example
    /// ```
    /// # use rookery::Color;
    /// assert_eq!(Color::from_uci('w').unwrap(), Color::White);
    /// assert!(Color::from_uci('x').is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(color: char) -> Result<Self> {
        match color {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Color must be either 'w' or 'b' (case-insensitive). Found {color}"),
        }
    }

    /// Creates a [`Color`] based on the ASCII case of the provided character, with uppercase being White and lowercase being Black.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        if c.is_ascii_lowercase() {
            Self::Black
        } else {
            Self::White
        }
    }

    /// Converts this [`Color`] to its FEN side-to-move char.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::White => "w",
            Self::Black => "b",
        }
    }

    /// Fetches a human-readable name for this [`Color`].
    ///
    /// # Example
    /// ```
    /// # use rookery::Color;
    /// assert_eq!(Color::Black.name(), "black");
    /// ```
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

/// Represents the kind (or "role") that a chess piece can be.
///
/// These have no [`Color`] associated with them. See [`Piece`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Number of piece variants.
    pub const COUNT: usize = 6;

    /// Kinds a pawn may promote to, strongest first.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// An array of all 6 [`PieceKind`]s.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
            Self::King,
        ]
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Points awarded for capturing a piece of this kind.
    ///
    /// # Panics
    /// Kings are never captured, so asking for their value is a logic error.
    ///
    /// # Example
    /// ```
    /// # use rookery::PieceKind;
    /// assert_eq!(PieceKind::Pawn.value(), 1);
    /// assert_eq!(PieceKind::Queen.value(), 9);
    /// ```
    #[inline(always)]
    pub fn value(&self) -> u32 {
        match self {
            Self::Pawn => 1,
            Self::Knight | Self::Bishop => 3,
            Self::Rook => 5,
            Self::Queen => 9,
            Self::King => panic!("a king has no capture value"),
        }
    }

    /// Returns `true` if a pawn may promote to this kind.
    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        matches!(self, Self::Knight | Self::Bishop | Self::Rook | Self::Queen)
    }

    /// Creates a new [`PieceKind`] from a character, in either case.
    ///
    /// # Example
    /// ```
    /// # use rookery::PieceKind;
    /// assert_eq!(PieceKind::from_uci('N').unwrap(), PieceKind::Knight);
    /// assert!(PieceKind::from_uci('x').is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(kind: char) -> Result<Self> {
        match kind {
            'P' | 'p' => Ok(Self::Pawn),
            'N' | 'n' => Ok(Self::Knight),
            'B' | 'b' => Ok(Self::Bishop),
            'R' | 'r' => Ok(Self::Rook),
            'Q' | 'q' => Ok(Self::Queen),
            'K' | 'k' => Ok(Self::King),
            _ => bail!("Invalid char for PieceKind: Got {kind}."),
        }
    }

    /// Fetches a human-readable name for this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    /// Converts this [`PieceKind`] to a lowercase character.
    #[inline(always)]
    pub const fn to_uci(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// The uppercase letter SAN uses for this kind. Pawns have none.
    ///
    /// # Example
    /// ```
    /// # use rookery::PieceKind;
    /// assert_eq!(PieceKind::Knight.san_letter(), Some('N'));
    /// assert_eq!(PieceKind::Pawn.san_letter(), None);
    /// ```
    #[inline(always)]
    pub const fn san_letter(&self) -> Option<char> {
        match self {
            Self::Pawn => None,
            _ => Some(self.to_uci().to_ascii_uppercase()),
        }
    }

    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pawn => "p",
            Self::Knight => "n",
            Self::Bishop => "b",
            Self::Rook => "r",
            Self::Queen => "q",
            Self::King => "k",
        }
    }
}

/// One of the two directions a king may castle in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// File the king lands on.
    #[inline(always)]
    pub const fn king_file(&self) -> File {
        match self {
            Self::Kingside => File::G,
            Self::Queenside => File::C,
        }
    }

    /// File the rook starts on.
    #[inline(always)]
    pub const fn rook_file(&self) -> File {
        match self {
            Self::Kingside => File::H,
            Self::Queenside => File::A,
        }
    }

    /// File the rook lands on.
    #[inline(always)]
    pub const fn rook_destination_file(&self) -> File {
        match self {
            Self::Kingside => File::F,
            Self::Queenside => File::D,
        }
    }

    /// The corner square `color`'s rook for this side starts on.
    #[inline(always)]
    pub const fn rook_square(&self, color: Color) -> Square {
        Square::new(self.rook_file(), Rank::first(color))
    }

    /// The side whose rook starts on `square`, if `square` is one of `color`'s home corners.
    pub fn from_corner(square: Square, color: Color) -> Option<Self> {
        [Self::Kingside, Self::Queenside]
            .into_iter()
            .find(|side| side.rook_square(color) == square)
    }

    #[inline(always)]
    pub const fn san(&self) -> &'static str {
        match self {
            Self::Kingside => "O-O",
            Self::Queenside => "O-O-O",
        }
    }
}

/// What happened the last time a king tried to castle.
///
/// This is cleared at the start of every move attempt, so it only ever describes the most recent ply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CastleOutcome {
    #[default]
    Unattempted,
    Kingside,
    Queenside,
    Fail,
}

impl From<CastleSide> for CastleOutcome {
    fn from(side: CastleSide) -> Self {
        match side {
            CastleSide::Kingside => Self::Kingside,
            CastleSide::Queenside => Self::Queenside,
        }
    }
}

/// Whether a king is attacked, and whether its side can still move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckStatus {
    /// Not attacked.
    #[default]
    Clear,
    Check,
    Mate,
    Stalemate,
}

impl CheckStatus {
    /// Returns `true` if the king is attacked, mated or not.
    #[inline(always)]
    pub const fn is_check(&self) -> bool {
        matches!(self, Self::Check | Self::Mate)
    }
}

/// Transient state carried by a pawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PawnState {
    /// Set for exactly one opposing ply after this pawn advanced two squares.
    pub double_stepped: bool,
}

/// Castling eligibility and check bookkeeping owned by a king.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KingState {
    pub kingside: bool,
    pub queenside: bool,
    pub castle: CastleOutcome,
    pub check: CheckStatus,
}

impl KingState {
    /// Returns the eligibility flag for castling towards `side`.
    #[inline(always)]
    pub const fn can_castle(&self, side: CastleSide) -> bool {
        match side {
            CastleSide::Kingside => self.kingside,
            CastleSide::Queenside => self.queenside,
        }
    }

    /// Permanently forbid castling towards `side`.
    #[inline(always)]
    pub fn revoke(&mut self, side: CastleSide) {
        match side {
            CastleSide::Kingside => self.kingside = false,
            CastleSide::Queenside => self.queenside = false,
        }
    }
}

impl Default for KingState {
    fn default() -> Self {
        Self {
            kingside: true,
            queenside: true,
            castle: CastleOutcome::default(),
            check: CheckStatus::default(),
        }
    }
}

/// A chess piece: its kind, its [`Color`], and whatever state that kind carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn(Color, PawnState),
    Knight(Color),
    Bishop(Color),
    Rook(Color),
    Queen(Color),
    King(Color, KingState),
}

impl Piece {
    /// Creates a fresh piece of the given color and kind.
    ///
    /// Pawns start without an en passant window and kings start eligible to castle both ways.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let knight = Piece::new(Color::Black, PieceKind::Knight);
    /// assert_eq!(knight.color(), Color::Black);
    /// assert_eq!(knight.kind(), PieceKind::Knight);
    /// assert_eq!(knight.char(), 'n');
    /// ```
    #[inline(always)]
    pub fn new(color: Color, kind: PieceKind) -> Self {
        match kind {
            PieceKind::Pawn => Self::Pawn(color, PawnState::default()),
            PieceKind::Knight => Self::Knight(color),
            PieceKind::Bishop => Self::Bishop(color),
            PieceKind::Rook => Self::Rook(color),
            PieceKind::Queen => Self::Queen(color),
            PieceKind::King => Self::King(color, KingState::default()),
        }
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        match *self {
            Self::Pawn(color, _)
            | Self::Knight(color)
            | Self::Bishop(color)
            | Self::Rook(color)
            | Self::Queen(color)
            | Self::King(color, _) => color,
        }
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        match self {
            Self::Pawn(..) => PieceKind::Pawn,
            Self::Knight(_) => PieceKind::Knight,
            Self::Bishop(_) => PieceKind::Bishop,
            Self::Rook(_) => PieceKind::Rook,
            Self::Queen(_) => PieceKind::Queen,
            Self::King(..) => PieceKind::King,
        }
    }

    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        matches!(self, Self::Pawn(..))
    }

    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self, Self::King(..))
    }

    /// The king's extended state, if this is a king.
    #[inline(always)]
    pub const fn king_state(&self) -> Option<&KingState> {
        match self {
            Self::King(_, state) => Some(state),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn king_state_mut(&mut self) -> Option<&mut KingState> {
        match self {
            Self::King(_, state) => Some(state),
            _ => None,
        }
    }

    /// Returns `true` if this is a pawn that advanced two squares on the previous ply.
    #[inline(always)]
    pub const fn double_stepped(&self) -> bool {
        matches!(self, Self::Pawn(_, PawnState { double_stepped: true }))
    }

    /// Sets the en passant window of a pawn. Does nothing for other kinds.
    #[inline(always)]
    pub fn set_double_stepped(&mut self, value: bool) {
        if let Self::Pawn(_, state) = self {
            state.double_stepped = value;
        }
    }

    /// Creates a [`Piece`] from its FEN character, where uppercase is White.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// assert_eq!(Piece::from_uci('Q').unwrap(), Piece::Queen(Color::White));
    /// assert_eq!(Piece::from_uci('r').unwrap(), Piece::Rook(Color::Black));
    /// ```
    #[inline(always)]
    pub fn from_uci(piece: char) -> Result<Self> {
        let kind = PieceKind::from_uci(piece)?;
        let color = Color::from_case(piece);
        Ok(Self::new(color, kind))
    }

    /// The FEN character of this piece: uppercase for White, lowercase for Black.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind().to_uci();
        if self.color().is_white() {
            c.to_ascii_uppercase()
        } else {
            c
        }
    }

    /// Fetches a human-readable name, such as `"white knight"`.
    pub fn name(&self) -> String {
        format!("{} {}", self.color().name(), self.kind().name())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            bail!("Invalid str for Piece: Must be a str of len 1. Got {s:?}");
        };
        Self::from_uci(c)
    }
}

macro_rules! impl_common_traits {
    ($type:ty) => {
        impl<T> Index<$type> for [T; <$type>::COUNT] {
            type Output = T;
            /// [`$type`] can be used to index into a list of [`<$type>::COUNT`] elements.
            #[inline(always)]
            fn index(&self, index: $type) -> &Self::Output {
                &self[index.index()]
            }
        }

        impl<T> IndexMut<$type> for [T; <$type>::COUNT] {
            /// [`$type`] can be used to mutably index into a list of [`<$type>::COUNT`] elements.
            #[inline(always)]
            fn index_mut(&mut self, index: $type) -> &mut Self::Output {
                &mut self[index.index()]
            }
        }

        impl FromStr for $type {
            type Err = anyhow::Error;
            /// Does the same as [`Self::from_uci`], but only if `s` is one character in length.
            #[inline(always)]
            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let mut chars = s.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    bail!("Invalid str for {}: Must be a str of len 1. Got {s:?}", stringify!($type));
                };

                Self::from_uci(c)
            }
        }

        impl AsRef<str> for $type {
            /// Alias for [`Self::as_str`].
            #[inline(always)]
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $type {
            /// By default, a $type displays as a lowercase char.
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_uci())
            }
        }

        impl fmt::Debug for $type {
            /// Debug formatting displays a $type as its human-readable name and index value.
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "\"{}\" ({})", self.name(), self.index())
            }
        }
    };
}

impl_common_traits!(PieceKind);
impl_common_traits!(Color);
