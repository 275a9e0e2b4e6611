/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, Square};

/// One committed ply, as the outside world sees it.
///
/// Records are immutable once made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    san: String,
    placement: String,
    from: Square,
    to: Square,
}

impl MoveRecord {
    #[inline(always)]
    pub fn new(san: String, placement: String, from: Square, to: Square) -> Self {
        Self {
            san,
            placement,
            from,
            to,
        }
    }

    /// The move in Standard Algebraic Notation.
    #[inline(always)]
    pub fn san(&self) -> &str {
        &self.san
    }

    /// Piece placement field of a FEN string for the position after the move.
    #[inline(always)]
    pub fn placement(&self) -> &str {
        &self.placement
    }

    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Rebuilds a display [`Board`] from the stored placement.
    ///
    /// # Panics
    /// If the placement is malformed. Records are only ever made from a live board, so this is a logic error.
    pub fn board(&self) -> Board {
        Board::from_placement(&self.placement)
            .unwrap_or_else(|err| panic!("history holds a malformed placement {:?}: {err}", self.placement))
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.san)
    }
}

/// An append-only log of [`MoveRecord`]s, with a cursor for navigating it.
///
/// The cursor is only for display; it never changes the live game.
///
/// # Example
/// ```
/// # use rookery::*;
/// let mut history = History::default();
/// history.push(MoveRecord::new("e4".into(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR".into(), Square::E2, Square::E4));
/// history.push(MoveRecord::new("e5".into(), "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR".into(), Square::E7, Square::E5));
///
/// assert_eq!(history.current().unwrap().san(), "e5");
/// assert_eq!(history.previous().unwrap().san(), "e4");
/// assert_eq!(history.previous().unwrap().san(), "e4");
/// assert_eq!(history.last().unwrap().san(), "e5");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<MoveRecord>,
    cursor: usize,
}

impl History {
    /// Appends `record` and moves the cursor onto it.
    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
        self.cursor = self.records.len() - 1;
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.cursor = 0;
    }

    #[inline(always)]
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline(always)]
    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.records.iter()
    }

    /// Index of the record under the cursor, or `None` if the history is empty.
    #[inline(always)]
    pub fn cursor(&self) -> Option<usize> {
        (!self.records.is_empty()).then_some(self.cursor)
    }

    /// The record under the cursor.
    #[inline(always)]
    pub fn current(&self) -> Option<&MoveRecord> {
        self.records.get(self.cursor)
    }

    pub fn first(&mut self) -> Option<&MoveRecord> {
        self.cursor = 0;
        self.current()
    }

    pub fn last(&mut self) -> Option<&MoveRecord> {
        self.cursor = self.records.len().saturating_sub(1);
        self.current()
    }

    /// Steps the cursor back one record, staying put at the first.
    pub fn previous(&mut self) -> Option<&MoveRecord> {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Steps the cursor forward one record, staying put at the last.
    pub fn next(&mut self) -> Option<&MoveRecord> {
        if self.cursor + 1 < self.records.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Moves the cursor to `index`, if there is a record there.
    pub fn seek(&mut self, index: usize) -> Option<&MoveRecord> {
        if index < self.records.len() {
            self.cursor = index;
        }
        self.records.get(index)
    }

    /// The board as it stood after the record under the cursor.
    #[inline(always)]
    pub fn board_at_cursor(&self) -> Option<Board> {
        self.current().map(MoveRecord::board)
    }

    /// SAN of every record, oldest first.
    pub fn sans(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(MoveRecord::san)
    }
}
