use thiserror::Error;

/// Failure to read or write one of the storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("session storage error: {0}")]
    Session(String),
}

/// Outcome of a rejected login or appointment request.
///
/// Every variant leaves the stores in the state they had before the call.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields ({0} is empty).")]
    MissingField(&'static str),

    #[error("Incorrect username or password.")]
    InvalidCredentials,

    #[error("You already have an appointment with this doctor on this date.")]
    DuplicateAppointment,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
