use tracing::info;

use crate::error::StorageError;
use crate::storage::StorageBackend;

/// Session slot holding the logged-in username.
pub const IDENTITY_KEY: &str = "logueado";

/// The username that unlocks delete affordances.
pub const ADMIN_USERNAME: &str = "admin";

/// Who, if anyone, is logged in for the current browser session.
///
/// Only the identity slot is owned here; `logout` leaves any other
/// session-scoped slot alone.
pub struct SessionState<B> {
    backend: B,
}

impl<B: StorageBackend> SessionState<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn login(&self, identity: &str) -> Result<(), StorageError> {
        self.backend.set_item(IDENTITY_KEY, identity)?;
        info!(user = identity, "session opened");
        Ok(())
    }

    pub fn logout(&self) {
        if let Some(identity) = self.current_identity() {
            info!(user = %identity, "session closed");
        }
        self.backend.remove_item(IDENTITY_KEY);
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_identity().is_some()
    }

    /// Name match against [`ADMIN_USERNAME`]; there is no role system.
    pub fn is_admin(&self) -> bool {
        self.current_identity().as_deref() == Some(ADMIN_USERNAME)
    }

    pub fn current_identity(&self) -> Option<String> {
        self.backend.get_item(IDENTITY_KEY)
    }
}
