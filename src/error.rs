use thiserror::Error;

/// Reasons an inbound frame is dropped. None of these close the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),
    #[error("configuration parse error: {0}")]
    ConfigParse(String),
    #[error("board size mismatch: expected {expected} cells, got {actual}")]
    SizeMismatch {
        expected: usize,
        actual: usize
    },
    #[error("({x}, {y}) is outside a {dimensions}x{dimensions} board")]
    OutOfRange {
        x: usize,
        y: usize,
        dimensions: usize
    },
    #[error("invalid cell value {0}")]
    InvalidCell(u8),
    #[error("frame received before the board was configured")]
    NotConfigured
}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        Self::ConfigParse(error.to_string())
    }
}

/// Failures outside the protocol itself: the socket, the session store, the renderer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("session store error: {0}")]
    Store(#[from] std::io::Error),
    #[error("session store contents are invalid: {0}")]
    StoreFormat(#[from] serde_json::Error),
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError)
}
