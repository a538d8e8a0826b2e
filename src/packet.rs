use crate::{
    error::ProtocolError,
    model::{BoardConfig, Stone, Score}
};
use serde::{Serialize, Deserialize};
use std::fmt;

//The server may hand out numeric or string ids; echo back whichever it used
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    Number(u64),
    Text(String)
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id)
        }
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> SessionId {
        match id.parse::<u64>() {
            Ok(id) => SessionId::Number(id),
            Err(_) => SessionId::Text(id.to_string())
        }
    }
}

/// Outgoing SESSION payload. Absent fields serialize as `null`.
#[derive(Serialize)]
pub struct SessionRequest<'a> {
    pub id: Option<&'a SessionId>,
    pub token: Option<&'a str>
}

/// Incoming CONFIGURE or SESSION payload.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Handshake {
    //Board
    pub map_dimensions: Option<usize>,
    pub circle_colours: Option<[String; 2]>,
    pub circle_size: Option<u32>,
    pub this_colour: Option<u8>,
    //Identity
    pub token: Option<String>,
    pub id: Option<SessionId>,
    //Resumed game
    pub curr_turn: Option<u8>,
    pub black_score: Option<u32>,
    pub white_score: Option<u32>
}

fn missing(field: &str) -> ProtocolError {
    ProtocolError::ConfigParse(format!("missing field `{}`", field))
}

impl Handshake {
    pub fn parse(payload: &[u8]) -> Result<Handshake, ProtocolError> {
        Ok(serde_json::from_slice(payload)?)
    }
    pub fn has_board(&self) -> bool {
        self.map_dimensions.is_some()
            || self.circle_colours.is_some()
            || self.circle_size.is_some()
    }
    pub fn board_config(&self) -> Result<BoardConfig, ProtocolError> {
        let dimensions = self.map_dimensions.ok_or_else(|| missing("map_dimensions"))?;
        let colours = self.circle_colours.clone().ok_or_else(|| missing("circle_colours"))?;
        let cell_size = self.circle_size.ok_or_else(|| missing("circle_size"))?;
        //Coordinates and the pass sentinel must fit in one byte
        if !(1..=u8::MAX as usize).contains(&dimensions) {
            return Err(ProtocolError::ConfigParse(
                format!("map_dimensions {} out of range", dimensions)
            ));
        }
        let local_colour = match self.this_colour {
            Some(colour) => Stone::from_byte(colour).map_err(|_| ProtocolError::ConfigParse(
                format!("this_colour {} is not a colour", colour)
            ))?,
            None => Stone::Empty
        };
        Ok(BoardConfig {
            dimensions,
            colours,
            cell_size,
            local_colour
        })
    }
    /// `this_colour` as a seat at the board; CONFIGURE always names one.
    pub fn player_colour(&self) -> Result<Stone, ProtocolError> {
        match self.this_colour {
            Some(colour @ (1 | 2)) => Stone::from_byte(colour),
            Some(colour) => Err(ProtocolError::ConfigParse(
                format!("this_colour {} is not a player colour", colour)
            )),
            None => Err(missing("this_colour"))
        }
    }
    pub fn turn(&self) -> Result<Option<Stone>, ProtocolError> {
        match self.curr_turn {
            Some(turn @ (1 | 2)) => Ok(Some(Stone::from_byte(turn)?)),
            Some(turn) => Err(ProtocolError::ConfigParse(
                format!("curr_turn {} is not a colour", turn)
            )),
            None => Ok(None)
        }
    }
    pub fn score(&self) -> Option<Score> {
        if self.black_score.is_none() && self.white_score.is_none() {
            return None;
        }
        Some(Score {
            black: self.black_score.unwrap_or(0),
            white: self.white_score.unwrap_or(0)
        })
    }
    pub fn identity(&self) -> Result<(SessionId, String), ProtocolError> {
        let id = self.id.clone().ok_or_else(|| missing("id"))?;
        let token = self.token.clone().ok_or_else(|| missing("token"))?;
        Ok((id, token))
    }
}
