/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use log::info;

use crate::{
    pgn, san, Board, CheckStatus, Color, Event, History, Move, MoveError, MoveRecord, Observer,
    PieceKind, Position, ReplayError, San, SanError, Square, RESULT_UNKNOWN,
};

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    /// The result of `color` winning.
    #[inline(always)]
    pub const fn win_for(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWins,
            Color::Black => Self::BlackWins,
        }
    }

    /// The PGN result token.
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
        }
    }
}

impl FromStr for GameResult {
    type Err = anyhow::Error;

    /// Parses a PGN result token.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// assert_eq!("0-1".parse::<GameResult>().unwrap(), GameResult::BlackWins);
    /// assert!("*".parse::<GameResult>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1-0" => Ok(Self::WhiteWins),
            "0-1" => Ok(Self::BlackWins),
            "1/2-1/2" | "½-½" => Ok(Self::Draw),
            _ => bail!("Invalid game result: Expected 1-0, 0-1, or 1/2-1/2. Got {s:?}"),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A game of chess as a controller drives it: selections, moves, results, and a navigable history.
///
/// Every intent is validated by the live [`Position`]. Invalid moves change nothing.
///
/// # Example
/// ```
/// # use rookery::*;
/// let mut game = Game::new();
/// game.select_source(Square::E2);
/// game.select_destination(Square::E4);
/// assert_eq!(game.commit_pending().unwrap().san(), "e4");
///
/// // Not White's turn
/// game.select_source(Square::D2);
/// game.select_destination(Square::D4);
/// assert!(game.commit_pending().is_none());
/// assert_eq!(game.history().len(), 1);
/// ```
pub struct Game {
    /// The live position.
    position: Position,

    /// Where this game started, and where [`Game::reset`] returns to.
    start: Position,

    history: History,

    /// Pending source square of an interactive move.
    source: Option<Square>,

    /// Pending destination square of an interactive move.
    destination: Option<Square>,

    /// Piece a pawn promotes to when moved through [`Game::commit_pending`].
    promotion: PieceKind,

    result: Option<GameResult>,

    observer: Option<Box<dyn Observer>>,
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::default())
    }

    /// A game starting from the position described by `fen`.
    ///
    /// A position that is already mate or stalemate starts out finished.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    /// assert_eq!(game.result(), Some(GameResult::Draw));
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    fn from_position(start: Position) -> Self {
        let mut game = Self {
            position: start.clone(),
            start,
            history: History::default(),
            source: None,
            destination: None,
            promotion: PieceKind::Queen,
            result: None,
            observer: None,
        };
        game.result = game.settled_result();
        game
    }

    /// Reports every event of this game to `observer`, replacing any previous observer.
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The position this game started from.
    #[inline(always)]
    pub const fn start(&self) -> &Position {
        &self.start
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        self.position.board()
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    #[inline(always)]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[inline(always)]
    pub const fn result(&self) -> Option<GameResult> {
        self.result
    }

    #[inline(always)]
    pub const fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// Points `color` has earned by capturing.
    #[inline(always)]
    pub fn score(&self, color: Color) -> u32 {
        self.board().side(color).score()
    }

    /// The pending source and destination squares.
    #[inline(always)]
    pub const fn selection(&self) -> (Option<Square>, Option<Square>) {
        (self.source, self.destination)
    }

    #[inline(always)]
    pub const fn promotion(&self) -> PieceKind {
        self.promotion
    }

    /// Every legal move for the side to move, or none once the game is over.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.position.legal_moves()
    }

    /// Plays `from -> to` for the side to move, records it, and ends the game on mate or stalemate.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let mut game = Game::new();
    /// let record = game.commit_move(Square::G1, Square::F3, None).unwrap();
    /// assert_eq!(record.san(), "Nf3");
    /// assert_eq!(
    ///     game.commit_move(Square::G8, Square::G6, None),
    ///     Err(MoveError::Illegal { kind: PieceKind::Knight, from: Square::G8, to: Square::G6 })
    /// );
    /// ```
    pub fn commit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }

        let ply = match self.position.commit(from, to, promotion) {
            Ok(ply) => ply,
            Err(error) => {
                self.notify(Event::Rejected { from, to, error });
                return Err(error);
            }
        };

        let record = MoveRecord::new(
            san::render(&ply),
            self.board().placement(),
            from,
            to,
        );
        self.notify(Event::Committed {
            color: ply.color,
            record: &record,
        });
        self.history.push(record.clone());

        match ply.status {
            CheckStatus::Mate => self.finish(GameResult::win_for(ply.color)),
            CheckStatus::Stalemate => self.finish(GameResult::Draw),
            CheckStatus::Clear | CheckStatus::Check => {}
        }

        Ok(record)
    }

    /// Parses `token` as SAN, finds the one move it names, and plays it.
    pub fn play_san(&mut self, token: &str) -> Result<MoveRecord, SanError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver.into());
        }

        let san: San = token.parse()?;
        let mv = san.resolve(&mut self.position)?;
        Ok(self.commit_move(mv.from, mv.to, mv.promotion)?)
    }

    /// Sets the pending source square, if none is set yet. Returns `true` if it was set.
    pub fn select_source(&mut self, square: Square) -> bool {
        let empty = self.source.is_none();
        if empty {
            self.source = Some(square);
        }
        empty
    }

    /// Sets the pending destination square, if none is set yet. Returns `true` if it was set.
    pub fn select_destination(&mut self, square: Square) -> bool {
        let empty = self.destination.is_none();
        if empty {
            self.destination = Some(square);
        }
        empty
    }

    /// Chooses what pawns promote to through [`Game::commit_pending`].
    pub fn select_promotion(&mut self, kind: PieceKind) -> Result<(), MoveError> {
        if !kind.is_promotion() {
            return Err(MoveError::BadPromotion(kind));
        }
        self.promotion = kind;
        Ok(())
    }

    /// Plays the pending move once both squares are selected, then clears the selection.
    ///
    /// Returns `None` and changes nothing else if a square is missing or the move is invalid.
    pub fn commit_pending(&mut self) -> Option<MoveRecord> {
        let (Some(from), Some(to)) = (self.source, self.destination) else {
            return None;
        };
        self.source = None;
        self.destination = None;

        self.commit_move(from, to, Some(self.promotion)).ok()
    }

    /// Resets to the start, then plays each SAN token in order.
    ///
    /// A result token (`1-0`, `0-1`, `1/2-1/2`, or `*`) ends the replay; the first three also end the game.
    /// On failure, the moves before the bad token stay played.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let mut game = Game::new();
    /// game.replay(["e4", "e5", "Nf3", "Nc6"]).unwrap();
    /// assert_eq!(game.history().len(), 4);
    ///
    /// let err = game.replay(["e4", "e5", "Ke3"]).unwrap_err();
    /// assert!(matches!(err, ReplayError::Token { index: 2, .. }));
    /// assert_eq!(game.history().len(), 2);
    /// ```
    pub fn replay<I, T>(&mut self, tokens: I) -> Result<(), ReplayError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.reset();

        for (index, token) in tokens.into_iter().enumerate() {
            let token = token.as_ref();
            if token == RESULT_UNKNOWN {
                break;
            }
            if let Ok(result) = token.parse::<GameResult>() {
                self.finish(result);
                break;
            }

            self.play_san(token).map_err(|source| ReplayError::Token {
                token: token.to_string(),
                index,
                source,
            })?;
        }

        Ok(())
    }

    /// Replays `tokens`, then ends the game with `result` unless the moves already ended it.
    ///
    /// `result` is a PGN result token; `*` leaves the game open.
    pub fn load_game<I, T>(&mut self, tokens: I, result: &str) -> Result<(), ReplayError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let declared = match result {
            RESULT_UNKNOWN => None,
            _ => Some(
                result
                    .parse::<GameResult>()
                    .map_err(|_| ReplayError::BadResult(result.to_string()))?,
            ),
        };

        self.replay(tokens)?;
        if let Some(result) = declared {
            self.finish(result);
        }

        Ok(())
    }

    /// Loads a game from PGN text, starting from its `FEN` tag if it has one.
    ///
    /// # Example
    /// ```
    /// # use rookery::*;
    /// let mut game = Game::new();
    /// game.load_pgn("[White \"a\"]\n\n1. f3 e5 2. g4 Qh4# 0-1").unwrap();
    /// assert_eq!(game.result(), Some(GameResult::BlackWins));
    /// ```
    pub fn load_pgn(&mut self, text: &str) -> Result<()> {
        let pgn = pgn::read_pgn(text)?;
        self.start = match pgn.tag("FEN") {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::default(),
        };

        self.load_game(&pgn.moves, &pgn.result)?;
        Ok(())
    }

    /// Starts over from the position described by `fen`.
    pub fn setup(&mut self, fen: &str) -> Result<()> {
        self.start = Position::from_fen(fen)?;
        self.reset();
        Ok(())
    }

    /// The side to move gives up.
    pub fn resign(&mut self) -> Result<GameResult, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        let result = GameResult::win_for(self.side_to_move().opponent());
        self.finish(result);
        Ok(result)
    }

    /// Both sides agree to a draw.
    pub fn declare_draw(&mut self) -> Result<GameResult, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        self.finish(GameResult::Draw);
        Ok(GameResult::Draw)
    }

    /// Returns to the starting position, clearing history, selections, and any result.
    pub fn reset(&mut self) {
        self.position = self.start.clone();
        self.history.clear();
        self.source = None;
        self.destination = None;
        self.promotion = PieceKind::Queen;
        self.result = self.settled_result();
        self.notify(Event::Reset);
    }

    pub fn first(&mut self) -> Option<&MoveRecord> {
        self.history.first()
    }

    pub fn last(&mut self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn previous(&mut self) -> Option<&MoveRecord> {
        self.history.previous()
    }

    pub fn next(&mut self) -> Option<&MoveRecord> {
        self.history.next()
    }

    /// Result implied by the live position alone.
    fn settled_result(&self) -> Option<GameResult> {
        let color = self.side_to_move();
        match self.position.status(color) {
            CheckStatus::Mate => Some(GameResult::win_for(color.opponent())),
            CheckStatus::Stalemate => Some(GameResult::Draw),
            CheckStatus::Clear | CheckStatus::Check => None,
        }
    }

    /// Ends the game with `result`, unless it has already ended.
    fn finish(&mut self, result: GameResult) {
        if self.result.is_some() {
            return;
        }
        info!("{} after {} plies", result, self.history.len());
        self.result = Some(result);
        self.notify(Event::GameOver(result));
    }

    fn notify(&mut self, event: Event<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&event);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Game {
    /// The board of the live position, followed by the game state.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", self.position)?;
        match self.result {
            Some(result) => write!(f, "Result: {result}"),
            None => write!(
                f,
                "{} to move ({:?})",
                self.side_to_move().name(),
                self.position.status(self.side_to_move())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_selection_fills_empty_slots_only() {
        let mut game = Game::new();
        assert!(game.select_source(Square::E2));
        assert!(!game.select_source(Square::D2));
        assert_eq!(game.selection(), (Some(Square::E2), None));

        // Nothing happens until both squares are chosen
        assert!(game.commit_pending().is_none());
        assert!(game.select_destination(Square::E4));
        assert!(game.commit_pending().is_some());
        assert_eq!(game.selection(), (None, None));
    }

    #[test]
    fn test_invalid_pending_move_is_silent() {
        let mut game = Game::new();
        let before = game.position().clone();

        game.select_source(Square::E2);
        game.select_destination(Square::E5);
        assert!(game.commit_pending().is_none());
        assert_eq!(game.position(), &before);
        assert_eq!(game.selection(), (None, None));
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_pending_promotion() {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.select_promotion(PieceKind::King), Err(MoveError::BadPromotion(PieceKind::King)));
        game.select_promotion(PieceKind::Rook).unwrap();
        game.select_source(Square::A7);
        game.select_destination(Square::A8);
        let record = game.commit_pending().unwrap();
        assert_eq!(record.san(), "a8=R");
        assert_eq!(game.board().piece_at(Square::A8).map(|p| p.kind()), Some(PieceKind::Rook));
    }

    #[test]
    fn test_resign_and_draw() {
        let mut game = Game::new();
        game.play_san("e4").unwrap();
        assert_eq!(game.resign(), Ok(GameResult::WhiteWins));
        assert!(game.is_game_over());
        assert_eq!(game.declare_draw(), Err(MoveError::GameOver));
        assert_eq!(game.commit_move(Square::E7, Square::E5, None), Err(MoveError::GameOver));

        game.reset();
        assert!(!game.is_game_over());
        assert_eq!(game.declare_draw(), Ok(GameResult::Draw));
    }

    #[test]
    fn test_load_game_with_declared_result() {
        let mut game = Game::new();
        game.load_game(["d4", "d5", "c4"], "1/2-1/2").unwrap();
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.result(), Some(GameResult::Draw));

        game.load_game(["d4"], "*").unwrap();
        assert_eq!(game.result(), None);

        assert_eq!(
            game.load_game(["d4"], "2-0"),
            Err(ReplayError::BadResult(String::from("2-0")))
        );
    }

    #[test]
    fn test_result_token_ends_replay() {
        let mut game = Game::new();
        game.replay(["e4", "e5", "0-1", "Nf3"]).unwrap();
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.result(), Some(GameResult::BlackWins));
    }

    #[test]
    fn test_replay_surfaces_bad_tokens() {
        let mut game = Game::new();
        let err = game.replay(["e4", "e5", "Qh9"]).unwrap_err();
        assert_eq!(
            err,
            ReplayError::Token {
                token: String::from("Qh9"),
                index: 2,
                source: SanError::Malformed(String::from("Qh9")),
            }
        );

        let err = game.replay(["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#", "a6"]).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Token {
                index: 7,
                source: SanError::Rejected(MoveError::GameOver),
                ..
            }
        ));
    }

    #[test]
    fn test_setup_and_reset_use_start() {
        let mut game = Game::new();
        game.setup("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        game.play_san("O-O-O").unwrap();
        assert_eq!(game.board().piece_at(Square::D1).map(|p| p.kind()), Some(PieceKind::Rook));

        game.reset();
        assert_eq!(game.position().to_fen(), "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_observer_sees_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut game = Game::new().with_observer(move |event: &Event<'_>| {
            let line = match event {
                Event::Committed { record, .. } => record.san().to_string(),
                Event::Rejected { .. } => String::from("rejected"),
                Event::GameOver(result) => result.to_string(),
                Event::Reset => String::from("reset"),
            };
            sink.borrow_mut().push(line);
        });

        game.replay(["f3", "e5", "g4", "Qh4#"]).unwrap();
        let _ = game.commit_move(Square::E2, Square::E4, None);
        assert_eq!(*seen.borrow(), ["reset", "f3", "e5", "g4", "Qh4#", "0-1"]);

        let mut game = Game::new().with_observer(crate::LogObserver);
        assert!(game.commit_move(Square::E2, Square::E5, None).is_err());
    }

    #[test]
    fn test_rejection_is_reported() {
        let rejected = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&rejected);
        let mut game = Game::new().with_observer(move |event: &Event<'_>| {
            if let Event::Rejected { error, .. } = event {
                *sink.borrow_mut() = Some(*error);
            }
        });

        assert!(game.commit_move(Square::A1, Square::A3, None).is_err());
        assert_eq!(
            *rejected.borrow(),
            Some(MoveError::Blocked {
                from: Square::A1,
                to: Square::A3,
                blocker: Square::A2
            })
        );
    }
}
