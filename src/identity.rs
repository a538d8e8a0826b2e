use crate::{
    error::ClientError,
    frame::{self, Opcode},
    packet::{SessionId, SessionRequest}
};
use serde::{Serialize, Deserialize};
use std::{
    fs,
    io,
    path::PathBuf,
    sync::{Arc, Mutex}
};
use tracing::{debug, error, info};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub id: Option<SessionId>,
    pub token: Option<String>
}

impl Session {
    /// Values given on the command line win over stored ones.
    pub fn merge(self, id: Option<SessionId>, token: Option<String>) -> Session {
        Session {
            id: id.or(self.id),
            token: token.or(self.token)
        }
    }
}

pub trait SessionStore: Send {
    fn load(&self) -> Result<Session, ClientError>;
    fn save(&mut self, session: &Session) -> Result<(), ClientError>;
}

//On-disk layout, keyed like the browser's storage entries
#[derive(Default, Serialize, Deserialize)]
struct Stored {
    session_id: Option<SessionId>,
    token: Option<String>
}

pub struct FileStore {
    path: PathBuf
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> FileStore {
        FileStore {
            path: path.into()
        }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Session, ClientError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(e) => return Err(e.into())
        };
        let stored: Stored = serde_json::from_slice(&bytes)?;
        Ok(Session {
            id: stored.session_id,
            token: stored.token
        })
    }
    fn save(&mut self, session: &Session) -> Result<(), ClientError> {
        let stored = Stored {
            session_id: session.id.clone(),
            token: session.token.clone()
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&stored)?)?;
        Ok(())
    }
}

/// In-process store; clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Session>>
}

impl MemoryStore {
    pub fn snapshot(&self) -> Session {
        match self.slot.lock() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone()
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Session, ClientError> {
        Ok(self.snapshot())
    }
    fn save(&mut self, session: &Session) -> Result<(), ClientError> {
        let mut slot = match self.slot.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner()
        };
        *slot = session.clone();
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    Established
}

pub struct Bootstrap {
    session: Session,
    state: BootstrapState,
    store: Box<dyn SessionStore>
}

impl Bootstrap {
    pub fn new(session: Session, store: Box<dyn SessionStore>) -> Bootstrap {
        Bootstrap {
            session,
            state: BootstrapState::Uninitialized,
            store
        }
    }
    pub fn session(&self) -> &Session {
        &self.session
    }
    pub fn state(&self) -> BootstrapState {
        self.state
    }
    /// SESSION frame sent when the transport opens.
    pub fn open(&self) -> Result<Vec<u8>, serde_json::Error> {
        let request = SessionRequest {
            id: self.session.id.as_ref(),
            token: self.session.token.as_deref()
        };
        let payload = serde_json::to_vec(&request)?;
        if self.session.id.is_none() {
            debug!("requesting a new session");
        } else {
            debug!(id = ?self.session.id, "requesting to rejoin session");
        }
        Ok(frame::encode(Opcode::Session, &payload))
    }
    /// Records the identity issued by the server and persists it.
    pub fn establish(&mut self, id: SessionId, token: String) {
        self.session = Session {
            id: Some(id),
            token: Some(token)
        };
        if let Err(e) = self.store.save(&self.session) {
            error!(error = %e, "failed to persist session");
        }
        if self.state == BootstrapState::Uninitialized {
            info!(id = ?self.session.id, "session established");
        }
        self.state = BootstrapState::Established;
    }
}
