//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Storage-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt persisted state under key '{key}': {details}")]
    CorruptPersistedState { key: String, details: String },

    // ---------------------------
    // Session state machine
    // ---------------------------
    #[error("Cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Unknown district: {0}")]
    UnknownDistrict(String),

    #[error("Active session references district '{0}', which no longer exists")]
    DanglingSession(String),

    #[error("Clock skew: now is {0} ms before the recorded timestamp")]
    ClockSkew(i64),

    // ---------------------------
    // Input errors
    // ---------------------------
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid district: {0}")]
    InvalidDistrict(String),

    #[error("Invalid parking duration: {0}h (choose 1 to 5 hours)")]
    InvalidDuration(u32),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type AppResult<T> = Result<T, AppError>;
