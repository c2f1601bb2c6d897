//! Identifier types.
//!
//! Two identities exist and must never be confused: the [`ActorId`] on
//! whose behalf a write is attempted (an opaque, caller-supplied token
//! that keys the cooldown ledger), and the [`SubscriberId`] of one live
//! observer connection (generated server-side, UUID v7).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Longest accepted actor token, in bytes.
pub const MAX_ACTOR_ID_LEN: usize = 128;

/// Connection-scoped identifier of one live observer.
///
/// Minted by the registry on join and never reused. UUID v7 keeps ids
/// time-ordered in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Errors produced when an actor token is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorIdError {
    /// The token is missing or consists only of whitespace.
    #[error("actor identity is missing")]
    Empty,

    /// The token exceeds [`MAX_ACTOR_ID_LEN`] bytes.
    #[error("actor identity is {len} bytes, limit is {MAX_ACTOR_ID_LEN}")]
    TooLong {
        /// Length of the rejected token.
        len: usize,
    },
}

/// Opaque identity of the party attempting a write.
///
/// The token is not verified in any way; it only keys the cooldown ledger.
/// Surrounding whitespace is trimmed so `"alice"` and `" alice "` share a
/// cooldown.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Validate and wrap a caller-supplied token.
    ///
    /// # Errors
    ///
    /// Returns [`ActorIdError::Empty`] for blank input and
    /// [`ActorIdError::TooLong`] for oversized input.
    pub fn new(raw: &str) -> Result<Self, ActorIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ActorIdError::Empty);
        }
        if trimmed.len() > MAX_ACTOR_ID_LEN {
            return Err(ActorIdError::TooLong { len: trimmed.len() });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ActorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ActorId {
    type Error = ActorIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ActorId> for String {
    fn from(id: ActorId) -> Self {
        id.0
    }
}
