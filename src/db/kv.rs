//! Key/value backends for the persistence adapter.

use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{kv_delete, kv_get, kv_put};
use crate::errors::{AppError, AppResult};
use std::collections::HashMap;

/// Minimal storage contract: raw string values under string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&mut self, key: &str) -> AppResult<()>;

    /// Append an audit line. Backends without an audit trail ignore it.
    fn audit(&mut self, _operation: &str, _target: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }
}

impl KeyValueStore for DbPool {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        kv_get(&self.conn, key)
    }

    fn put(&mut self, key: &str, value: &str) -> AppResult<()> {
        kv_put(&self.conn, key, value)
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        kv_delete(&self.conn, key)
    }

    fn audit(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        ttlog(&self.conn, operation, target, message)
    }
}

/// HashMap-backed store. `fail_writes` simulates a broken disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub values: HashMap<String, String>,
    pub audit_lines: Vec<String>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&self) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::Io(std::io::Error::other("store is read-only")));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.check_writable()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.check_writable()?;
        self.values.remove(key);
        Ok(())
    }

    fn audit(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        self.check_writable()?;
        self.audit_lines
            .push(format!("{} ({}) {}", operation, target, message));
        Ok(())
    }
}
