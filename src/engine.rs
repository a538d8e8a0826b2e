use crate::{
    model::Board,
    session::Event
};
use rand::{
    rngs::StdRng,
    seq::SliceRandom,
    SeedableRng
};
use std::{io::BufRead, thread};
use tokio::{
    sync::mpsc,
    task::JoinHandle
};
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Play(usize, usize),
    Pass,
    Quit
}

/*
    Player commands, one per line:
    Play: "3 4" (column, row)
    Pass: "pass"
    Quit: "quit"
*/
pub fn parse_command(line: &str) -> Option<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["pass"] => Some(Command::Pass),
        ["quit"] | ["exit"] => Some(Command::Quit),
        [x, y] => {
            let x = x.parse().ok()?;
            let y = y.parse().ok()?;
            Some(Command::Play(x, y))
        },
        _ => None
    }
}

/// Reads commands on a plain thread. Blocking reads there can never hold
/// up runtime shutdown; the thread is simply left behind at exit.
pub fn read_commands<R>(input: R) -> mpsc::UnboundedReceiver<Command>
where
    R: BufRead + Send + 'static
{
    let (sender, receiver) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to read command");
                    break
                }
            };
            let command = match parse_command(line.trim()) {
                Some(command) => command,
                None => {
                    if !line.trim().is_empty() {
                        warn!(%line, "unrecognised command");
                    }
                    continue
                }
            };
            let quit = command == Command::Quit;
            if sender.send(command).is_err() || quit {
                break
            }
        }
    });
    receiver
}

/// Forwards commands read from `input` until it ends or the player quits.
/// Aborting the task drops `sender` whether or not a read is pending.
pub fn commands<R>(input: R, sender: mpsc::UnboundedSender<Event>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static
{
    let mut commands = UnboundedReceiverStream::new(read_commands(input));
    tokio::spawn(async move {
        while let Some(command) = commands.next().await {
            let event = match command {
                Command::Play(x, y) => Event::Click(x, y),
                Command::Pass => Event::Pass,
                Command::Quit => break
            };
            if sender.send(event).is_err() {
                break
            }
        }
        debug!("command input closed");
    })
}

/// Picks a random empty cell whenever the local player is to move.
pub struct Autoplay {
    rng: StdRng
}

impl Autoplay {
    pub fn new() -> Autoplay {
        Autoplay {
            rng: StdRng::from_entropy()
        }
    }
    pub fn seeded(seed: u64) -> Autoplay {
        Autoplay {
            rng: StdRng::seed_from_u64(seed)
        }
    }
    pub fn choose(&mut self, board: &Board) -> Option<(usize, usize)> {
        board.empty_cells().choose(&mut self.rng).copied()
    }
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new()
    }
}
