pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod storage;
pub mod store;
pub mod view;
pub mod web;
pub mod workflow;

pub use config::Config;
pub use error::{StorageError, ValidationError};
pub use guard::{AccessGuard, GuardAction};
pub use session::SessionState;
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::{Appointment, AppointmentStore};
pub use workflow::{authenticate, create_appointment, Credential, CredentialList};
