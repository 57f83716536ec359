//! Persistence adapter: typed load/save/clear over a `KeyValueStore`.
//!
//! Values are stored as JSON. A value that no longer parses is reported as
//! `CorruptPersistedState`; `load_snapshot` turns that into documented
//! defaults so a damaged record never stops the program.

use crate::db::kv::KeyValueStore;
use crate::errors::{AppError, AppResult};
use crate::models::district::{District, seed_districts};
use crate::models::session::ParkingSession;
use crate::models::settings::Settings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub const KEY_DISTRICTS: &str = "districts";
pub const KEY_SETTINGS: &str = "settings";
pub const KEY_SESSION: &str = "session";

/// Everything the state object needs at start-up.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub districts: Vec<District>,
    pub settings: Settings,
    pub session: Option<ParkingSession>,
    /// Keys whose stored value was unreadable and got replaced by defaults.
    pub recovered: Vec<String>,
}

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AppError::CorruptPersistedState {
                key: key.to_string(),
                details: e.to_string(),
            })
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.put(key, &json)
    }

    pub fn clear(&mut self, key: &str) -> AppResult<()> {
        self.store.remove(key)
    }

    /// Save the session, or remove the record entirely when idle.
    pub fn save_session(&mut self, session: Option<&ParkingSession>) -> AppResult<()> {
        match session {
            Some(s) => self.save(KEY_SESSION, s),
            None => self.clear(KEY_SESSION),
        }
    }

    /// Load all three records, falling back to defaults on damage.
    ///
    /// - districts: missing → seed catalog (written back), unreadable → empty
    /// - settings: missing or unreadable → defaults
    /// - session: missing → idle, unreadable → idle and the record is cleared
    pub fn load_snapshot(&mut self) -> Snapshot {
        let mut recovered = Vec::new();

        let districts = match self.load::<Vec<District>>(KEY_DISTRICTS) {
            Ok(Some(d)) => d,
            Ok(None) => {
                let seeds = seed_districts();
                if let Err(e) = self.save(KEY_DISTRICTS, &seeds) {
                    warn!(error = %e, "failed to store seed districts");
                }
                seeds
            }
            Err(e) => {
                self.note_recovery(&mut recovered, KEY_DISTRICTS, &e);
                Vec::new()
            }
        };

        let settings = match self.load::<Settings>(KEY_SETTINGS) {
            Ok(Some(s)) => s,
            Ok(None) => Settings::default(),
            Err(e) => {
                self.note_recovery(&mut recovered, KEY_SETTINGS, &e);
                Settings::default()
            }
        };

        let session = match self.load::<ParkingSession>(KEY_SESSION) {
            Ok(s) => s,
            Err(e) => {
                self.note_recovery(&mut recovered, KEY_SESSION, &e);
                if let Err(e) = self.clear(KEY_SESSION) {
                    warn!(error = %e, "failed to clear unreadable session record");
                }
                None
            }
        };

        Snapshot {
            districts,
            settings,
            session,
            recovered,
        }
    }

    fn note_recovery(&mut self, recovered: &mut Vec<String>, key: &str, err: &AppError) {
        warn!(key, error = %err, "stored value unreadable, falling back to defaults");
        if let Err(e) = self
            .store
            .audit("recover", key, &format!("fallback to defaults: {}", err))
        {
            warn!(error = %e, key, "failed to write audit log");
        }
        recovered.push(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::kv::MemoryStore;
    use crate::db::pool::DbPool;
    use chrono::{TimeZone, Utc};

    fn session() -> ParkingSession {
        ParkingSession::new("1", Utc.timestamp_millis_opt(1_000).unwrap(), 2)
    }

    #[test]
    fn missing_key_loads_as_none() {
        let p = Persistence::new(MemoryStore::new());
        assert_eq!(p.load::<Settings>(KEY_SETTINGS).unwrap(), None);
    }

    #[test]
    fn idle_session_clears_the_record() {
        let mut p = Persistence::new(MemoryStore::new());
        p.save_session(Some(&session())).unwrap();
        assert!(p.store().values.contains_key(KEY_SESSION));

        p.save_session(None).unwrap();
        assert!(!p.store().values.contains_key(KEY_SESSION));
        assert_eq!(p.load::<ParkingSession>(KEY_SESSION).unwrap(), None);
    }

    #[test]
    fn malformed_session_is_reported_as_corrupt() {
        let mut store = MemoryStore::new();
        store.values.insert(KEY_SESSION.into(), "{not json".into());
        let p = Persistence::new(store);

        let err = p.load::<ParkingSession>(KEY_SESSION).unwrap_err();
        assert!(matches!(err, AppError::CorruptPersistedState { ref key, .. } if key == "session"));
    }

    #[test]
    fn snapshot_recovers_from_malformed_session() {
        let mut store = MemoryStore::new();
        store.values.insert(KEY_SESSION.into(), "{\"districtId\":".into());
        let mut p = Persistence::new(store);

        let snap = p.load_snapshot();
        assert_eq!(snap.session, None);
        assert_eq!(snap.recovered, vec!["session".to_string()]);
        assert!(!p.store().values.contains_key(KEY_SESSION));
        assert_eq!(p.store().audit_lines.len(), 1);
    }

    #[test]
    fn snapshot_recovers_even_when_audit_fails() {
        let mut store = MemoryStore::new();
        store.values.insert(KEY_SESSION.into(), "{\"districtId\":".into());
        store.values.insert(KEY_DISTRICTS.into(), "[]".into());
        store.fail_writes = true;
        let mut p = Persistence::new(store);

        let snap = p.load_snapshot();
        assert_eq!(snap.session, None);
        assert_eq!(snap.recovered, vec!["session".to_string()]);
        assert!(p.store().audit_lines.is_empty());
    }

    #[test]
    fn fresh_store_gets_seed_catalog_and_default_settings() {
        let mut p = Persistence::new(MemoryStore::new());
        let snap = p.load_snapshot();

        assert_eq!(snap.districts, seed_districts());
        assert_eq!(snap.settings, Settings::default());
        assert!(snap.recovered.is_empty());
        assert!(p.store().values.contains_key(KEY_DISTRICTS));
    }

    #[test]
    fn corrupt_catalog_falls_back_to_empty() {
        let mut store = MemoryStore::new();
        store.values.insert(KEY_DISTRICTS.into(), "[{\"id\":1}]".into());
        store.values.insert(KEY_SETTINGS.into(), "\"x\"".into());
        let mut p = Persistence::new(store);

        let snap = p.load_snapshot();
        assert!(snap.districts.is_empty());
        assert_eq!(snap.settings, Settings::default());
        assert_eq!(snap.recovered, vec!["districts".to_string(), "settings".to_string()]);
    }

    #[test]
    fn sqlite_backend_round_trips_records() {
        let mut p = Persistence::new(DbPool::in_memory().unwrap());
        let s = Settings {
            default_duration: 4,
            default_reminder: 10,
        };
        p.save(KEY_SETTINGS, &s).unwrap();
        p.save_session(Some(&session())).unwrap();

        let snap = p.load_snapshot();
        assert_eq!(snap.settings, s);
        assert_eq!(snap.session, Some(session()));
    }
}
