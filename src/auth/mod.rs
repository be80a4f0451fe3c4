//! Authentication: static credential table, password hashing, and
//! signed bearer tokens.

pub mod middleware;
pub mod token;

pub use token::TokenService;

use anyhow::Context;
use bcrypt::{hash, verify, DEFAULT_COST};
use std::collections::HashMap;

/// Username -> bcrypt digest table, built from configuration at startup
/// and never mutated afterwards.
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Hash `password` and register it under `username`.
    pub fn with_user(mut self, username: &str, password: &str) -> anyhow::Result<Self> {
        let digest = hash(password, DEFAULT_COST).context("Failed to hash password")?;
        self.users.insert(username.to_string(), digest);
        Ok(self)
    }

    /// True iff the username is known and the password matches its digest.
    /// A malformed digest verifies as false rather than erroring.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|digest| verify(password, digest).unwrap_or(false))
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}
