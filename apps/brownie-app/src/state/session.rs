//! # Session
//!
//! Who is signed in. Identity itself comes from the external provider; the
//! session only remembers the owner id it handed us.

use chrono::{DateTime, Utc};
use tracing::error;

use brownie_core::{CoreError, OwnerId};

/// The current owner, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    owner: Option<OwnerId>,
    signed_in_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn signed_in(owner: OwnerId) -> Self {
        Session {
            owner: Some(owner),
            signed_in_at: Some(Utc::now()),
        }
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    pub fn signed_in_at(&self) -> Option<DateTime<Utc>> {
        self.signed_in_at
    }

    pub fn is_signed_in(&self) -> bool {
        self.owner.is_some()
    }

    /// The owner for a mutation, or `NotAuthenticated`.
    ///
    /// Reaching the error means a caller skipped the sign-in guard, so it is
    /// logged at error level.
    pub fn require(&self, operation: &str) -> Result<&OwnerId, CoreError> {
        self.owner.as_ref().ok_or_else(|| {
            error!(operation, "Mutation attempted without an authenticated owner");
            CoreError::NotAuthenticated {
                operation: operation.to_string(),
            }
        })
    }
}
