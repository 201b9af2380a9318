use std::fmt;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ValidationError;
use crate::session::{SessionState, ADMIN_USERNAME};
use crate::storage::StorageBackend;
use crate::store::{Appointment, AppointmentStore};

/// A static (username, secret) allowlist entry.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"REDACTED")
            .finish()
    }
}

/// Fixed set of accepted credentials, built once at startup.
#[derive(Debug, Clone)]
pub struct CredentialList {
    entries: Vec<Credential>,
}

impl Default for CredentialList {
    fn default() -> Self {
        Self::new(vec![
            Credential::new(ADMIN_USERNAME, "1234"),
            Credential::new("paciente", "5678"),
        ])
    }
}

impl CredentialList {
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    /// Replaces the secret of `username`, if present.
    pub fn with_secret(mut self, username: &str, secret: &str) -> Self {
        for entry in self.entries.iter_mut().filter(|c| c.username == username) {
            entry.secret = secret.to_string();
        }
        self
    }

    /// Exact, case-sensitive match on both fields.
    pub fn find(&self, username: &str, secret: &str) -> Option<&Credential> {
        self.entries
            .iter()
            .find(|c| c.username == username && c.secret == secret)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Login form payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// New appointment form payload.
#[derive(Debug, Deserialize)]
pub struct AppointmentRequest {
    pub name: String,
    pub doctor: String,
    pub date: String,
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

/// Validates a new booking against the freshly loaded list and stores it.
/// The duplicate check and the write happen under the store's write lock.
pub fn create_appointment<B: StorageBackend>(
    store: &AppointmentStore<B>,
    name: &str,
    doctor: &str,
    date: &str,
) -> Result<Appointment, ValidationError> {
    let name = required("name", name)?;
    let doctor = required("doctor", doctor)?;
    let date = required("date", date)?;

    let appointment = Appointment::new(name, doctor, date);
    if !store.append_unique(appointment.clone())? {
        return Err(ValidationError::DuplicateAppointment);
    }
    info!(doctor, date, "appointment created");
    Ok(appointment)
}

/// Checks `username`/`password` against the allowlist and opens the session on success.
pub fn authenticate<B: StorageBackend>(
    credentials: &CredentialList,
    session: &SessionState<B>,
    username: &str,
    password: &str,
) -> Result<Credential, ValidationError> {
    let username = required("username", username)?;
    let password = required("password", password)?;

    let Some(credential) = credentials.find(username, password) else {
        warn!(user = username, "rejected login");
        return Err(ValidationError::InvalidCredentials);
    };

    session.login(&credential.username)?;
    Ok(credential.clone())
}
