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

use anyhow::{bail, Context, Result};

use super::Color;

/// One tile of the `8x8` grid, stored as `file + 8 * rank`.
///
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
///
/// Squares are plain coordinates; equality is structural.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

/// Declares a named constant for every square of one rank.
macro_rules! named_squares {
    ($rank:ident: $($name:ident => $file:ident),+) => {
        $(pub const $name: Self = Self::new(File::$file, Rank::$rank);)+
    };
}

impl Square {
    named_squares!(ONE: A1 => A, B1 => B, C1 => C, D1 => D, E1 => E, F1 => F, G1 => G, H1 => H);
    named_squares!(TWO: A2 => A, B2 => B, C2 => C, D2 => D, E2 => E, F2 => F, G2 => G, H2 => H);
    named_squares!(THREE: A3 => A, B3 => B, C3 => C, D3 => D, E3 => E, F3 => F, G3 => G, H3 => H);
    named_squares!(FOUR: A4 => A, B4 => B, C4 => C, D4 => D, E4 => E, F4 => F, G4 => G, H4 => H);
    named_squares!(FIVE: A5 => A, B5 => B, C5 => C, D5 => D, E5 => E, F5 => F, G5 => G, H5 => H);
    named_squares!(SIX: A6 => A, B6 => B, C6 => C, D6 => D, E6 => E, F6 => F, G6 => G, H6 => H);
    named_squares!(SEVEN: A7 => A, B7 => B, C7 => C, D7 => D, E7 => E, F7 => F, G7 => G, H7 => H);
    named_squares!(EIGHT: A8 => A, B8 => B, C8 => C, D8 => D, E8 => E, F8 => F, G8 => G, H8 => H);

    pub const MIN: u8 = 0;
    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    /// All 64 squares in scan order, `a1` first and `h8` last.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// let squares: Vec<_> = Square::iter().collect();
    /// assert_eq!(squares.len(), 64);
    /// assert_eq!((squares[0], squares[63]), (Square::A1, Square::H8));
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// # Example
    /// ```
    /// # use rookery::{Square, File, Rank};
    /// assert_eq!(Square::new(File::E, Rank::FOUR), Square::E4);
    /// ```
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(file.0 | rank.0 << 3)
    }

    /// Reads a file letter followed by a rank digit, like `"e4"`.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// assert_eq!(Square::from_algebraic("e4").unwrap(), Square::E4);
    /// assert!(Square::from_algebraic("z0").is_err());
    /// ```
    pub fn from_algebraic(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("A square is a file letter and a rank digit. Got {square:?}")
        };

        Ok(Self::new(File::from_char(file)?, Rank::from_char(rank)?))
    }

    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 & 7)
    }

    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Position of this square in a 64-element table.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The square `file_delta` files and `rank_delta` ranks away, or `None` off the board.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// assert_eq!(Square::E4.offset(1, 1), Some(Square::F5));
    /// assert_eq!(Square::H1.offset(1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        match (self.file().offset(file_delta), self.rank().offset(rank_delta)) {
            (Some(file), Some(rank)) => Some(Self::new(file, rank)),
            _ => None,
        }
    }

    /// The neighbor towards the eighth rank, or `None` on the board's top edge.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// assert_eq!(Square::E4.up(), Some(Square::new(rookery::File::E, rookery::Rank::FIVE)));
    /// assert_eq!(Square::E8.up(), None);
    /// ```
    #[inline(always)]
    pub const fn up(&self) -> Option<Self> {
        self.offset(0, 1)
    }

    /// The neighbor towards the first rank, or `None` on the board's bottom edge.
    #[inline(always)]
    pub const fn down(&self) -> Option<Self> {
        self.offset(0, -1)
    }

    /// The neighbor one rank closer to `color`'s opponent, if there is one.
    #[inline(always)]
    pub const fn forward(&self, color: Color) -> Option<Self> {
        match color {
            Color::White => self.up(),
            Color::Black => self.down(),
        }
    }

    /// The neighbor one rank closer to `color`'s own side, if there is one.
    #[inline(always)]
    pub const fn backward(&self, color: Color) -> Option<Self> {
        self.forward(color.opponent())
    }

    /// Signed number of files from `self` to `other`.
    #[inline(always)]
    pub const fn file_delta(&self, other: Self) -> i8 {
        other.file().0 as i8 - self.file().0 as i8
    }

    /// Signed number of ranks from `self` to `other`.
    #[inline(always)]
    pub const fn rank_delta(&self, other: Self) -> i8 {
        other.rank().0 as i8 - self.rank().0 as i8
    }

    /// Every square strictly between `self` and `other` along a straight line or diagonal.
    ///
    /// Yields nothing if the two squares are adjacent, identical, or do not share a line.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// let between: Vec<_> = Square::A1.between(Square::D4).collect();
    /// assert_eq!(between.len(), 2);
    /// assert_eq!(Square::A1.between(Square::B3).count(), 0);
    /// ```
    pub fn between(self, other: Self) -> impl Iterator<Item = Self> {
        let (df, dr) = (self.file_delta(other), self.rank_delta(other));
        let aligned = df == 0 || dr == 0 || df.abs() == dr.abs();
        let steps = if aligned && self != other {
            df.abs().max(dr.abs()) - 1
        } else {
            0
        };
        let (sf, sr) = (df.signum(), dr.signum());

        (1..=steps).filter_map(move |i| self.offset(sf * i, sr * i))
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    /// Wrapper for [`Square::from_algebraic`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_algebraic(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, square: Square) -> &Self::Output {
        &self[square.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, square: Square) -> &mut Self::Output {
        &mut self[square.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    /// Algebraic name followed by the raw index, like `e4 (28)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

/// A row of the board, `1` through `8` from White's side.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

/// A column of the board, `a` through `h` from White's left.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

/// Everything [`Rank`] and [`File`] share as a number in `0..8` named by a single character.
macro_rules! impl_coordinate {
    ($t:ident, $first_char:literal) => {
        impl $t {
            pub const MAX: u8 = 7;
            pub const COUNT: usize = 8;

            /// Every value, lowest first.
            #[inline(always)]
            pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
                (0..=Self::MAX).map(Self)
            }

            #[inline(always)]
            pub fn new(value: u8) -> Result<Self> {
                if value > Self::MAX {
                    bail!("{} out of range: expected 0..={}, got {value}", stringify!($t), Self::MAX);
                }

                Ok(Self(value))
            }

            #[inline(always)]
            pub const fn index(&self) -> usize {
                self.0 as usize
            }

            /// The character naming this value in algebraic notation.
            #[inline(always)]
            pub const fn char(&self) -> char {
                (self.0 + $first_char) as char
            }

            /// Steps `delta` along the board, or `None` past its edge.
            #[inline(always)]
            pub const fn offset(self, delta: i8) -> Option<Self> {
                match self.0.checked_add_signed(delta) {
                    Some(value) if value <= Self::MAX => Some(Self(value)),
                    _ => None,
                }
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.char())
            }
        }

        impl fmt::Debug for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} ({})", self.char(), self.0)
            }
        }
    };
}

impl_coordinate!(Rank, b'1');
impl_coordinate!(File, b'a');

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const THREE: Self = Self(2);
    pub const FOUR: Self = Self(3);
    pub const FIVE: Self = Self(4);
    pub const SIX: Self = Self(5);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    /// Home rank of `color`'s pieces.
    #[inline(always)]
    pub const fn first(color: Color) -> Self {
        [Self::ONE, Self::EIGHT][color.index()]
    }

    /// Home rank of `color`'s pawns.
    #[inline(always)]
    pub const fn second(color: Color) -> Self {
        [Self::TWO, Self::SEVEN][color.index()]
    }

    /// Where `color`'s pawns promote.
    #[inline(always)]
    pub const fn eighth(color: Color) -> Self {
        [Self::EIGHT, Self::ONE][color.index()]
    }

    /// Parses a rank from its digit, `'1'` through `'8'`.
    ///
    /// # Example
    /// ```
    /// # use rookery::Rank;
    /// assert_eq!(Rank::from_char('4').unwrap().offset(1), Some(Rank::FIVE));
    /// assert!(Rank::from_char('9').is_err());
    /// ```
    pub fn from_char(rank: char) -> Result<Self> {
        let value = rank
            .to_digit(10)
            .and_then(|digit| digit.checked_sub(1))
            .with_context(|| format!("A rank is a digit from 1 to 8. Got {rank:?}"))?;

        Self::new(value as u8)
    }
}

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    /// Parses a file from its letter, `'a'` through `'h'` in either case.
    ///
    /// # Example
    /// ```
    /// # use rookery::File;
    /// assert_eq!(File::from_char('c').unwrap(), File::C);
    /// assert!(File::from_char('z').is_err());
    /// ```
    pub fn from_char(file: char) -> Result<Self> {
        match file.to_ascii_lowercase() {
            f @ 'a'..='h' => Ok(Self(f as u8 - b'a')),
            _ => bail!("A file is a letter from a to h. Got {file:?}"),
        }
    }
}
