/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::{
    perft_generic, pgn, Color, EngineCommand, Game, LogObserver, MoveRecord, PieceKind, Square,
};

/// The Rookery rules engine: one [`Game`] driven by text commands.
pub struct Engine {
    /// The game being played.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    game: Game,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            game: Game::new().with_observer(LogObserver),
            sender,
            receiver,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if its corresponding receiver doesn't exist,
        //  and our engine owns that receiver for as long as it exists.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                log::debug!("Input handler thread stopping: {err}");
            }
        });

        while let Ok(cmd) = self.receiver.recv() {
            if cmd == EngineCommand::Exit {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e}");
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`] against the current game.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Move { from, to, promote } => self.make_move(from, to, promote)?,

            EngineCommand::San { moves } => {
                for token in moves {
                    let record = self
                        .game
                        .play_san(&token)
                        .with_context(|| format!("Could not play {token:?}"))?;
                    self.announce(&record);
                }
            }

            EngineCommand::Load { movetext } => {
                self.game.load_pgn(&movetext.join(" "))?;
                println!("{}", self.game);
            }

            EngineCommand::Setup { fen } => {
                self.game.setup(&fen.join(" "))?;
                println!("{}", self.game);
            }

            EngineCommand::Display => println!("{}", self.game),

            EngineCommand::Fen => println!("{}", self.game.position().to_fen()),

            EngineCommand::Moves { square } => self.moves(square),

            EngineCommand::History => self.history(),

            EngineCommand::First => {
                let shown = self.game.first().cloned();
                self.show(shown);
            }

            EngineCommand::Last => {
                let shown = self.game.last().cloned();
                self.show(shown);
            }

            EngineCommand::Prev => {
                let shown = self.game.previous().cloned();
                self.show(shown);
            }

            EngineCommand::Next => {
                let shown = self.game.next().cloned();
                self.show(shown);
            }

            EngineCommand::Reset => {
                self.game.reset();
                println!("{}", self.game);
            }

            EngineCommand::Resign => println!("{}", self.game.resign()?),

            EngineCommand::Draw => println!("{}", self.game.declare_draw()?),

            EngineCommand::Pgn {
                event,
                site,
                date,
                round,
                white,
                black,
            } => {
                let tags = pgn::Tags {
                    event,
                    site,
                    date,
                    round,
                    white,
                    black,
                };
                print!("{}", pgn::write_pgn(&self.game, &tags));
            }

            EngineCommand::Score => {
                for color in Color::all() {
                    println!("{:>5}: {}", color.name(), self.game.score(color));
                }
            }

            EngineCommand::Perft { depth } => self.perft::<false>(depth),

            EngineCommand::Splitperft { depth } => self.perft::<true>(depth),

            EngineCommand::Exit => bail!("{} cannot execute exit outside of its run loop", self.name()),
        }

        Ok(())
    }

    /// Executes the `move` command through the selection contract a board controller would use.
    fn make_move(&mut self, from: Square, to: Square, promote: Option<PieceKind>) -> Result<()> {
        if let Some(kind) = promote {
            self.game.select_promotion(kind)?;
        }

        self.game.select_source(from);
        self.game.select_destination(to);
        let Some(record) = self.game.commit_pending() else {
            bail!("{from}{to} is not a legal move");
        };

        self.announce(&record);
        Ok(())
    }

    /// Prints a freshly played move, and the result if it ended the game.
    fn announce(&self, record: &MoveRecord) {
        println!("{record}");
        if let Some(result) = self.game.result() {
            println!("{result}");
        }
    }

    /// Executes the `moves` command, printing legal moves for the side to move or one of its pieces.
    fn moves(&mut self, square: Option<Square>) {
        let moves = self.game.legal_moves();
        let moves = moves
            .into_iter()
            .filter(|mv| square.map_or(true, |square| mv.from == square))
            .map(|mv| mv.to_string())
            .collect::<Vec<_>>();

        // If there are none, print "(none)"
        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else {
            moves.join(", ")
        };
        println!("{moves_string}");
    }

    /// Executes the `history` command, printing every move with a marker on the one shown.
    fn history(&self) {
        let history = self.game.history();
        if history.is_empty() {
            println!("(none)");
            return;
        }

        for (i, record) in history.iter().enumerate() {
            let marker = if history.cursor() == Some(i) { '>' } else { ' ' };
            println!("{marker} {:>3}. {record}", i + 1);
        }
    }

    /// Prints the board as it stood after `record`.
    fn show(&self, record: Option<MoveRecord>) {
        match record {
            Some(record) => println!("{record}\n{}", record.board()),
            None => println!("(none)"),
        }
    }

    /// Counts the nodes of the move tree below the current position, printing timings.
    fn perft<const SPLIT: bool>(&self, depth: usize) {
        let now = Instant::now();
        let nodes = perft_generic::<true, SPLIT>(self.game.position(), depth);
        let elapsed = now.elapsed();

        let nps = nodes as f64 / elapsed.as_secs_f64();
        println!("\n{nodes} nodes in {elapsed:.1?} ({nps:.0} nps)");
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing engine commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut Engine, line: &str) -> Result<()> {
        engine.execute(line.parse()?)
    }

    #[test]
    fn test_commands_drive_the_game() {
        let mut engine = Engine::new();
        run(&mut engine, "move e2 e4").unwrap();
        run(&mut engine, "san e5 Nf3").unwrap();
        assert_eq!(engine.game.history().sans().collect::<Vec<_>>(), ["e4", "e5", "Nf3"]);

        assert!(run(&mut engine, "move e2 e4").is_err());
        assert!(run(&mut engine, "san Qh9").is_err());
        assert_eq!(engine.game.history().len(), 3);

        run(&mut engine, "first").unwrap();
        assert_eq!(engine.game.history().cursor(), Some(0));
        run(&mut engine, "reset").unwrap();
        assert!(engine.game.history().is_empty());
    }

    #[test]
    fn test_setup_and_load() {
        let mut engine = Engine::new();
        run(&mut engine, "setup 4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert_eq!(engine.game.position().to_fen(), "4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(run(&mut engine, "setup 8/8/8/8/8/8/8/8 w - - 0 1").is_err());

        run(&mut engine, "load 1. f3 e5 2. g4 Qh4#").unwrap();
        assert_eq!(engine.game.result(), Some(crate::GameResult::BlackWins));
        assert!(run(&mut engine, "resign").is_err());
    }

    #[test]
    fn test_exit_is_only_for_the_loop() {
        let mut engine = Engine::new();
        assert!(engine.execute(EngineCommand::Exit).is_err());
    }
}
