use argon2::password_hash::rand_core::{OsRng, RngCore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::{AppError, Result};
use crate::modules::auth::models::Session;

/// Open sessions keyed by bearer token
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 32 random bytes, hex encoded
    pub fn new_token() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    pub fn insert(&self, session: Session) -> Result<()> {
        self.sessions
            .write()
            .map_err(|_| AppError::internal("Session registry lock poisoned"))?
            .insert(session.token.clone(), session);
        Ok(())
    }

    pub fn get(&self, token: &str) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| AppError::internal("Session registry lock poisoned"))?
            .get(token)
            .cloned())
    }

    pub fn remove(&self, token: &str) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .write()
            .map_err(|_| AppError::internal("Session registry lock poisoned"))?
            .remove(token))
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
