use crate::{
    engine::Autoplay,
    error::ProtocolError,
    frame::{self, Opcode},
    identity::{Bootstrap, Session},
    model::{Board, BoardConfig, Score, Stone},
    packet::Handshake,
    render::{RenderSink, Snapshot}
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingConfig,
    Ready,
    Finished
}

pub enum Event {
    //Transport
    Open,
    Frame(Vec<u8>),
    //Player
    Click(usize, usize),
    Pass
}

/// Everything the client knows about the game. Only the protocol handlers
/// below mutate it; renderers get a [`Snapshot`].
pub struct ClientSession {
    bootstrap: Bootstrap,
    config: Option<BoardConfig>,
    board: Board,
    turn: Stone,
    score: Score,
    phase: Phase
}

impl ClientSession {
    pub fn new(bootstrap: Bootstrap) -> ClientSession {
        ClientSession {
            bootstrap,
            config: None,
            board: Board::default(),
            turn: Stone::Black,
            score: Score::default(),
            phase: Phase::AwaitingConfig
        }
    }
    pub fn session(&self) -> &Session {
        self.bootstrap.session()
    }
    pub fn config(&self) -> Option<&BoardConfig> {
        self.config.as_ref()
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn turn(&self) -> Stone {
        self.turn
    }
    pub fn score(&self) -> Score {
        self.score
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn snapshot(&self) -> Option<Snapshot<'_>> {
        let config = self.config.as_ref()?;
        Some(Snapshot {
            config,
            board: &self.board,
            turn: self.turn,
            score: self.score,
            phase: self.phase
        })
    }
    pub fn local_colour(&self) -> Stone {
        self.config.as_ref().map_or(Stone::Empty, |config| config.local_colour)
    }
    pub fn is_local_turn(&self) -> bool {
        self.phase == Phase::Ready
            && self.local_colour() != Stone::Empty
            && self.local_colour() == self.turn
    }
    /// SESSION frame for a freshly opened transport.
    pub fn open(&self) -> Result<Vec<u8>, serde_json::Error> {
        self.bootstrap.open()
    }

    //Sends

    /// UPDATE request for a click, or `None` when the click should be ignored.
    /// The server stays authoritative; this only spares it obviously bad moves.
    pub fn play(&self, x: usize, y: usize) -> Option<Vec<u8>> {
        if !self.is_local_turn() {
            debug!(x, y, turn = ?self.turn, "ignoring click out of turn");
            return None;
        }
        match self.board.at(x, y) {
            Ok(Stone::Empty) => Some(frame::encode(Opcode::Update, &[x as u8, y as u8])),
            Ok(_) => {
                debug!(x, y, "ignoring click on occupied cell");
                None
            },
            Err(e) => {
                debug!(error = %e, "ignoring click");
                None
            }
        }
    }
    /// UPDATE request carrying the off-board `(dimensions, dimensions)` sentinel.
    pub fn pass(&self) -> Option<Vec<u8>> {
        if !self.is_local_turn() {
            debug!(turn = ?self.turn, "ignoring pass out of turn");
            return None;
        }
        let sentinel = self.board.dimensions() as u8;
        Some(frame::encode(Opcode::Update, &[sentinel, sentinel]))
    }

    //Receives

    pub fn handle_frame(&mut self, raw: &[u8]) -> Result<(), ProtocolError> {
        let (opcode, payload) = frame::decode(raw)?;
        debug!(?opcode, len = payload.len(), "received frame");
        match opcode {
            Opcode::Configure => self.configure(payload),
            Opcode::Session => self.establish(payload),
            Opcode::LoadBoard => {
                self.require_config()?;
                self.board.load(payload)?;
                debug!(
                    black = self.board.count(Stone::Black),
                    white = self.board.count(Stone::White),
                    "loaded board"
                );
                Ok(())
            },
            Opcode::Update => {
                self.require_config()?;
                self.update(payload)
            },
            Opcode::Pass => {
                self.require_config()?;
                self.pass_turn();
                Ok(())
            },
            Opcode::Fin => {
                self.require_config()?;
                self.phase = Phase::Finished;
                info!(
                    black_score = self.score.black,
                    white_score = self.score.white,
                    "game over"
                );
                Ok(())
            }
        }
    }
    fn require_config(&self) -> Result<(), ProtocolError> {
        if self.phase == Phase::AwaitingConfig {
            Err(ProtocolError::NotConfigured)
        } else {
            Ok(())
        }
    }
    fn configure(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        let handshake = Handshake::parse(payload)?;
        let config = handshake.board_config()?;
        //Players only; spectators come in through SESSION
        handshake.player_colour()?;
        let (id, token) = handshake.identity()?;
        let turn = handshake.turn()?;
        self.bootstrap.establish(id, token);
        self.apply_config(config, turn, handshake.score());
        Ok(())
    }
    fn establish(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        let handshake = Handshake::parse(payload)?;
        let (id, token) = handshake.identity()?;
        let config = if handshake.has_board() {
            Some(handshake.board_config()?)
        } else {
            None
        };
        let turn = handshake.turn()?;
        //Persist before anything can be rendered or sent
        self.bootstrap.establish(id, token);
        match config {
            Some(config) => self.apply_config(config, turn, handshake.score()),
            None => {
                if let Some(turn) = turn {
                    self.turn = turn;
                }
                if let Some(score) = handshake.score() {
                    self.score = score;
                }
            }
        }
        Ok(())
    }
    fn apply_config(&mut self, config: BoardConfig, turn: Option<Stone>, score: Option<Score>) {
        info!(
            dimensions = config.dimensions,
            colours = ?config.colours,
            cell_size = config.cell_size,
            canvas = config.canvas_size(),
            colour = <&str>::from(config.local_colour),
            "loaded configuration"
        );
        self.board = Board::new(config.dimensions);
        self.turn = turn.unwrap_or(Stone::Black);
        self.score = score.unwrap_or_default();
        self.config = Some(config);
        self.phase = Phase::Ready;
    }
    fn pass_turn(&mut self) {
        self.turn = self.turn.opposite();
        debug!(turn = ?self.turn, "turn passed");
    }
    fn update(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        let sentinel = self.board.dimensions();
        if payload.len() >= 2 && payload.iter().all(|&b| b as usize == sentinel) {
            self.pass_turn();
            return Ok(());
        }
        if payload.len() < 3 {
            return Err(ProtocolError::MalformedFrame("update shorter than a placement"));
        }
        if (payload.len() - 3) % 2 != 0 {
            return Err(ProtocolError::MalformedFrame("dangling capture coordinate"));
        }
        let stone = Stone::from_byte(payload[0])?;
        if stone == Stone::Empty {
            return Err(ProtocolError::InvalidCell(payload[0]));
        }
        let (x, y) = (payload[1] as usize, payload[2] as usize);
        self.board.set(x, y, stone)?;
        //Captures
        let mut captures = 0;
        for pair in payload[3..].chunks_exact(2) {
            let (cx, cy) = (pair[0] as usize, pair[1] as usize);
            if let Err(e) = self.board.set(cx, cy, Stone::Empty) {
                //Removed stones stay removed but are not scored, and the turn stays
                warn!(x, y, applied = captures, "capture list aborted mid-frame");
                return Err(e);
            }
            captures += 1;
        }
        self.score.add(stone, captures);
        self.turn = stone.opposite();
        debug!(?stone, x, y, captures, "applied update");
        Ok(())
    }
}

/// Consumes events one at a time until the channel closes.
///
/// Each inbound frame is decoded, applied and rendered before the next event
/// is looked at. Errors drop the frame and leave the state as it is.
pub async fn run<S: RenderSink>(
    mut client: ClientSession,
    mut events: mpsc::UnboundedReceiver<Event>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    sink: &mut S,
    mut autoplay: Option<Autoplay>
) -> ClientSession {
    while let Some(event) = events.recv().await {
        let request = match event {
            Event::Open => match client.open() {
                Ok(request) => Some(request),
                Err(e) => {
                    warn!(error = %e, "could not encode session request");
                    None
                }
            },
            Event::Frame(raw) => match client.handle_frame(&raw) {
                Ok(()) => {
                    if let Some(snapshot) = client.snapshot() {
                        sink.render(snapshot);
                    }
                    match autoplay.as_mut() {
                        Some(autoplay) if client.is_local_turn() => autoplay
                            .choose(client.board())
                            .and_then(|(x, y)| client.play(x, y)),
                        _ => None
                    }
                },
                Err(e) => {
                    warn!(error = %e, "dropped frame");
                    None
                }
            },
            Event::Click(x, y) => client.play(x, y),
            Event::Pass => client.pass()
        };
        if let Some(request) = request {
            if outbound.send(request).is_err() {
                break
            }
        }
    }
    debug!("event channel closed");
    client
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MemoryStore;

    fn configured(dimensions: usize, colour: u8) -> ClientSession {
        let mut client = ClientSession::new(Bootstrap::new(
            Session::default(),
            Box::new(MemoryStore::default())
        ));
        let json = format!(
            r#"{{"map_dimensions":{},"circle_colours":["w","b"],"circle_size":30,"this_colour":{},"token":"t","id":"s"}}"#,
            dimensions, colour
        );
        client.handle_frame(&frame::encode(Opcode::Configure, json.as_bytes())).unwrap();
        client
    }
    #[test]
    fn test_frames_before_config_are_dropped() {
        let mut client = ClientSession::new(Bootstrap::new(
            Session::default(),
            Box::new(MemoryStore::default())
        ));
        assert!(matches!(client.handle_frame(&[2, 0, 0, 0, 0]), Err(ProtocolError::NotConfigured)));
        assert!(matches!(client.handle_frame(&[1, 1, 0, 0]), Err(ProtocolError::NotConfigured)));
        assert_eq!(client.phase(), Phase::AwaitingConfig);
        assert!(client.snapshot().is_none());
    }
    #[test]
    fn test_bad_config_keeps_state() {
        let mut client = configured(3, 1);
        let before = client.config().cloned();
        assert!(client.handle_frame(&frame::encode(Opcode::Configure, b"{}")).is_err());
        assert_eq!(client.config().cloned(), before);
        assert_eq!(client.phase(), Phase::Ready);
    }
    #[test]
    fn test_configure_requires_player_and_identity() {
        let store = MemoryStore::default();
        let mut client = ClientSession::new(Bootstrap::new(
            Session::default(),
            Box::new(store.clone())
        ));
        let rejected: [&[u8]; 4] = [
            br#"{"map_dimensions":9,"circle_colours":["w","b"],"circle_size":30}"#,
            br#"{"map_dimensions":9,"circle_colours":["w","b"],"circle_size":30,"this_colour":1}"#,
            br#"{"map_dimensions":9,"circle_colours":["w","b"],"circle_size":30,"this_colour":1,"id":"s"}"#,
            br#"{"map_dimensions":9,"circle_colours":["w","b"],"circle_size":30,"this_colour":0,"token":"t","id":"s"}"#
        ];
        for json in rejected {
            let result = client.handle_frame(&frame::encode(Opcode::Configure, json));
            assert!(matches!(result, Err(ProtocolError::ConfigParse(_))));
            assert_eq!(client.phase(), Phase::AwaitingConfig);
            assert!(client.config().is_none());
            assert_eq!(store.snapshot(), Session::default());
        }
    }
    #[test]
    fn test_truncated_update_is_rejected_whole() {
        let mut client = configured(5, 1);
        assert!(matches!(client.handle_frame(&[1, 1, 2]), Err(ProtocolError::MalformedFrame(_))));
        assert!(matches!(
            client.handle_frame(&[1, 1, 2, 2, 0]),
            Err(ProtocolError::MalformedFrame(_))
        ));
        assert!(matches!(client.handle_frame(&[1, 0, 2, 2]), Err(ProtocolError::InvalidCell(0))));
        assert_eq!(client.board(), &Board::new(5));
        assert_eq!(client.turn(), Stone::Black);
    }
    #[test]
    fn test_capture_out_of_range_keeps_earlier_captures() {
        let mut client = configured(5, 1);
        let mut cells: Vec<u8> = vec![2; 5];
        cells.extend([0; 20]);
        client.handle_frame(&frame::encode(Opcode::LoadBoard, &cells)).unwrap();
        let result = client.handle_frame(&[1, 1, 4, 4, 0, 0, 9, 9, 1, 0]);
        assert!(matches!(result, Err(ProtocolError::OutOfRange { x: 9, y: 9, .. })));
        assert_eq!(client.board().at(4, 4).unwrap(), Stone::Black);
        assert_eq!(client.board().at(0, 0).unwrap(), Stone::Empty);
        //Aborted before this one
        assert_eq!(client.board().at(1, 0).unwrap(), Stone::White);
        assert_eq!(client.score(), Score::default());
        assert_eq!(client.turn(), Stone::Black);
    }
    #[test]
    fn test_pass_opcode_and_fin() {
        let mut client = configured(3, 2);
        client.handle_frame(&[Opcode::Pass.as_byte()]).unwrap();
        assert_eq!(client.turn(), Stone::White);
        assert!(client.pass().is_some());
        client.handle_frame(&[Opcode::Fin.as_byte()]).unwrap();
        assert_eq!(client.phase(), Phase::Finished);
        assert!(client.pass().is_none());
        assert!(client.play(0, 0).is_none());
    }
    #[test]
    fn test_pass_request_uses_sentinel() {
        let client = configured(9, 1);
        assert_eq!(client.pass(), Some(vec![Opcode::Update.as_byte(), 9, 9]));
    }
    #[test]
    fn test_spectator_never_sends() {
        let mut client = ClientSession::new(Bootstrap::new(
            Session::default(),
            Box::new(MemoryStore::default())
        ));
        let json = br#"{"map_dimensions":3,"circle_colours":["w","b"],"circle_size":30,"this_colour":0,"token":"t","id":"s"}"#;
        client.handle_frame(&frame::encode(Opcode::Session, json)).unwrap();
        assert_eq!(client.local_colour(), Stone::Empty);
        assert!(client.play(0, 0).is_none());
        assert!(client.pass().is_none());
    }
    #[test]
    fn test_click_outside_board_is_ignored() {
        let client = configured(3, 1);
        assert!(client.play(3, 0).is_none());
        assert_eq!(client.play(2, 1), Some(vec![Opcode::Update.as_byte(), 2, 1]));
    }
    #[test]
    fn test_session_restores_turn_and_score() {
        let mut client = configured(3, 1);
        let json = br#"{"id":4,"token":"x","curr_turn":2,"black_score":1,"white_score":5}"#;
        client.handle_frame(&frame::encode(Opcode::Session, json)).unwrap();
        assert_eq!(client.turn(), Stone::White);
        assert_eq!(client.score(), Score { black: 1, white: 5 });
        //Board untouched without board fields
        assert_eq!(client.board().dimensions(), 3);
    }
}
