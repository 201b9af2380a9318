use std::env;
use std::path::PathBuf;

use crate::session::ADMIN_USERNAME;
use crate::workflow::CredentialList;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_FILE: &str = "data/appointments.json";
const DEFAULT_DATE_LOCALE: &str = "es";

/// Runtime settings for the booking server.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_file: PathBuf,
    pub admin_secret: Option<String>,
    pub date_locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            admin_secret: None,
            date_locale: DEFAULT_DATE_LOCALE.to_string(),
        }
    }
}

impl Config {
    /// Reads the port from the first argument and everything else from the environment.
    pub fn from_env_and_args(args: &[String]) -> Self {
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    fn from_lookup<F>(args: &[String], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = args
            .get(1)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let data_file = lookup("BOOKING_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_file);
        let admin_secret = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty());
        let date_locale = lookup("BOOKING_DATE_LOCALE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.date_locale);

        Self {
            port,
            data_file,
            admin_secret,
            date_locale,
        }
    }

    pub fn credentials(&self) -> CredentialList {
        match &self.admin_secret {
            Some(secret) => CredentialList::default().with_secret(ADMIN_USERNAME, secret),
            None => CredentialList::default(),
        }
    }
}
