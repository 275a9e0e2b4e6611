/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use log::{debug, info};

use crate::{Color, GameResult, MoveError, MoveRecord, Square};

/// Something that happened to a [`crate::Game`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// A move was played by `color`.
    Committed {
        color: Color,
        record: &'a MoveRecord,
    },

    /// A requested move was refused. Nothing changed.
    Rejected {
        from: Square,
        to: Square,
        error: MoveError,
    },

    GameOver(GameResult),

    /// The game went back to its starting position.
    Reset,
}

/// Receives [`Event`]s from a [`crate::Game`].
///
/// A game reports to at most one observer, handed to it with [`crate::Game::with_observer`].
/// Any `FnMut(&Event)` closure is an observer.
///
/// # Example
/// ```
/// # use rookery::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let mut game = Game::new().with_observer(move |event: &Event<'_>| {
///     if let Event::Committed { record, .. } = event {
///         sink.borrow_mut().push(record.san().to_string());
///     }
/// });
///
/// game.play_san("d4").unwrap();
/// assert_eq!(*seen.borrow(), ["d4"]);
/// ```
pub trait Observer {
    fn notify(&mut self, event: &Event<'_>);
}

impl<F: FnMut(&Event<'_>)> Observer for F {
    #[inline(always)]
    fn notify(&mut self, event: &Event<'_>) {
        self(event)
    }
}

/// Forwards every [`Event`] to the [`log`] facade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&mut self, event: &Event<'_>) {
        match event {
            Event::Committed { color, record } => info!(
                "{} played {} ({}{})",
                color.name(),
                record.san(),
                record.from(),
                record.to()
            ),

            Event::Rejected { from, to, error } => debug!("{from}{to} was rejected: {error}"),

            Event::GameOver(result) => info!("game over: {result}"),

            Event::Reset => info!("game reset"),
        }
    }
}
