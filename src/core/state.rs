//! The owned application state: catalog, settings and the session machine.
//!
//! Every mutation is written through the persistence adapter right away and
//! announced to subscribed observers. A failed write is logged; the
//! in-memory state is kept.

use crate::core::catalog::{self, DistrictPatch};
use crate::core::ranking::rank_with_distance;
use crate::core::reminder::{Reminder, next_reminder};
use crate::core::session::SessionMachine;
use crate::db::kv::KeyValueStore;
use crate::db::persistence::{KEY_DISTRICTS, KEY_SETTINGS, Persistence};
use crate::errors::AppResult;
use crate::models::district::District;
use crate::models::position::GeoPoint;
use crate::models::session::{ParkingSession, SessionState};
use crate::models::settings::Settings;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::warn;

/// Source of "now".
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F: Fn() -> DateTime<Utc>> Clock for F {
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// What changed after a successful mutation.
#[derive(Debug, Clone, Copy)]
pub enum StateChange<'a> {
    Session(Option<&'a ParkingSession>),
    Settings(&'a Settings),
    Catalog(&'a [District]),
}

pub trait StateObserver {
    fn on_change(&mut self, change: &StateChange<'_>);
}

pub struct ParkingState<S: KeyValueStore, C: Clock = SystemClock> {
    persistence: Persistence<S>,
    clock: C,
    districts: Vec<District>,
    settings: Settings,
    machine: SessionMachine,
    observers: Vec<Box<dyn StateObserver>>,
    recovered: Vec<String>,
}

impl<S: KeyValueStore> ParkingState<S, SystemClock> {
    pub fn open(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> ParkingState<S, C> {
    /// Load state from `store`, recovering from damaged records.
    pub fn with_clock(store: S, clock: C) -> Self {
        let mut persistence = Persistence::new(store);
        let snap = persistence.load_snapshot();

        Self {
            persistence,
            clock,
            districts: snap.districts,
            settings: snap.settings,
            machine: SessionMachine::new(snap.session),
            observers: Vec::new(),
            recovered: snap.recovered,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    // ---------------------------
    // Reads
    // ---------------------------

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Option<&ParkingSession> {
        self.machine.session()
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Keys that were unreadable at load time.
    pub fn recovered_keys(&self) -> &[String] {
        &self.recovered
    }

    pub fn ranked(&self, origin: Option<GeoPoint>) -> Vec<(District, Option<f64>)> {
        rank_with_distance(&self.districts, origin)
    }

    /// First entry of the ranking: nearest district, or the first one in
    /// the catalog when there is no fix.
    pub fn nearest(&self, origin: Option<GeoPoint>) -> Option<District> {
        self.ranked(origin).into_iter().next().map(|(d, _)| d)
    }

    /// District of the active session, re-resolved on every call.
    pub fn active_district(&self) -> AppResult<Option<&District>> {
        self.machine.active_district(&self.districts)
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.machine.elapsed(self.clock.now())
    }

    pub fn next_reminder(&self) -> Option<Reminder> {
        self.machine
            .session()
            .map(|s| next_reminder(s, &self.settings, self.clock.now()))
    }

    // ---------------------------
    // Session transitions
    // ---------------------------

    pub fn enter(&mut self, district_id: &str, duration_hours: u32) -> AppResult<ParkingSession> {
        let now = self.clock.now();
        let s = self
            .machine
            .enter(&self.districts, district_id, duration_hours, now)?;
        self.audit("enter", district_id, &format!("expected {}h", duration_hours));
        self.session_changed();
        Ok(s)
    }

    pub fn checkout(&mut self) -> AppResult<ParkingSession> {
        let now = self.clock.now();
        let s = self.machine.checkout(now)?;
        self.audit("checkout", &s.district_id, "exit window started");
        self.session_changed();
        Ok(s)
    }

    pub fn delay(&mut self) -> AppResult<ParkingSession> {
        let s = self.machine.delay()?;
        self.audit(
            "delay",
            &s.district_id,
            &format!("delay now {}h", s.delay_hours),
        );
        self.session_changed();
        Ok(s)
    }

    /// Leave; a no-op when already idle.
    pub fn exit(&mut self) -> Option<ParkingSession> {
        let old = self.machine.exit()?;
        self.audit("exit", &old.district_id, "session closed");
        self.session_changed();
        Some(old)
    }

    // ---------------------------
    // Settings and catalog
    // ---------------------------

    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Err(e) = self.persistence.save(KEY_SETTINGS, &self.settings) {
            warn!(error = %e, "failed to persist settings");
        }
        self.audit(
            "settings",
            "",
            &format!(
                "duration {}h, reminder {}min",
                settings.default_duration, settings.default_reminder
            ),
        );
        self.notify(StateChange::Settings(&settings));
    }

    pub fn add_district(&mut self, patch: &DistrictPatch) -> AppResult<District> {
        let d = catalog::new_district(&self.districts, patch, self.clock.now())?;
        self.districts.push(d.clone());
        self.audit("district_add", &d.id, &d.name);
        self.catalog_changed();
        Ok(d)
    }

    pub fn update_district(&mut self, id: &str, patch: &DistrictPatch) -> AppResult<District> {
        let d = catalog::update_district(&mut self.districts, id, patch)?;
        self.audit("district_edit", &d.id, &d.name);
        self.catalog_changed();
        Ok(d)
    }

    /// Remove a district. An active session pointing at it is left in
    /// place and shows up as dangling.
    pub fn remove_district(&mut self, id: &str) -> AppResult<District> {
        let d = catalog::remove_district(&mut self.districts, id)?;
        if self.session().is_some_and(|s| s.district_id == d.id) {
            warn!(district = %d.id, "removed the district of the active session");
        }
        self.audit("district_del", &d.id, &d.name);
        self.catalog_changed();
        Ok(d)
    }

    pub fn into_store(self) -> S {
        self.persistence.into_inner()
    }

    // ---------------------------
    // Write-through helpers
    // ---------------------------

    fn session_changed(&mut self) {
        if let Err(e) = self.persistence.save_session(self.machine.session()) {
            warn!(error = %e, "failed to persist session");
        }
        let session = self.machine.session().cloned();
        self.notify(StateChange::Session(session.as_ref()));
    }

    fn catalog_changed(&mut self) {
        if let Err(e) = self.persistence.save(KEY_DISTRICTS, &self.districts) {
            warn!(error = %e, "failed to persist districts");
        }
        let districts = self.districts.clone();
        self.notify(StateChange::Catalog(&districts));
    }

    fn notify(&mut self, change: StateChange<'_>) {
        for obs in self.observers.iter_mut() {
            obs.on_change(&change);
        }
    }

    fn audit(&mut self, operation: &str, target: &str, message: &str) {
        if let Err(e) = self.persistence.store_mut().audit(operation, target, message) {
            warn!(error = %e, operation, "failed to write audit log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::kv::MemoryStore;
    use crate::db::persistence::KEY_SESSION;
    use crate::errors::AppError;
    use chrono::TimeZone;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const MIN: i64 = 60_000;
    const H: i64 = 60 * MIN;

    fn clock(ms: &Rc<Cell<i64>>) -> impl Fn() -> DateTime<Utc> + use<> {
        let ms = Rc::clone(ms);
        move || Utc.timestamp_millis_opt(ms.get()).unwrap()
    }

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl StateObserver for Recorder {
        fn on_change(&mut self, change: &StateChange<'_>) {
            let tag = match change {
                StateChange::Session(Some(s)) => format!("session:{}", s.state().label()),
                StateChange::Session(None) => "session:idle".to_string(),
                StateChange::Settings(_) => "settings".to_string(),
                StateChange::Catalog(c) => format!("catalog:{}", c.len()),
            };
            self.0.borrow_mut().push(tag);
        }
    }

    #[test]
    fn transitions_write_through_to_the_store() {
        let now = Rc::new(Cell::new(0));
        let mut st = ParkingState::with_clock(MemoryStore::new(), clock(&now));

        st.enter("1", 2).unwrap();
        let stored: ParkingSession = serde_json::from_str(
            st.persistence.store().values.get(KEY_SESSION).unwrap(),
        )
        .unwrap();
        assert_eq!(stored.district_id, "1");

        now.set(H);
        st.checkout().unwrap();
        st.exit();
        assert!(!st.persistence.store().values.contains_key(KEY_SESSION));
    }

    #[test]
    fn session_survives_a_restart() {
        let now = Rc::new(Cell::new(10 * MIN));
        let mut st = ParkingState::with_clock(MemoryStore::new(), clock(&now));
        st.enter("2", 3).unwrap();
        st.delay().unwrap();

        let store = st.into_store();
        let st2 = ParkingState::with_clock(store, clock(&now));
        let s = st2.session().unwrap();
        assert_eq!(s.district_id, "2");
        assert_eq!(s.delay_hours, 1);
        assert_eq!(st2.state(), SessionState::Parked);
    }

    #[test]
    fn reminder_scenario_two_hours_three_minutes() {
        let now = Rc::new(Cell::new(0));
        let mut st = ParkingState::with_clock(MemoryStore::new(), clock(&now));
        st.enter("1", 2).unwrap();

        now.set(2 * H - 3 * MIN);
        assert_eq!(st.next_reminder().unwrap().due_in, TimeDelta::zero());

        now.set(2 * H);
        assert!(st.next_reminder().unwrap().is_overdue());
        assert_eq!(st.elapsed(), TimeDelta::hours(2));
    }

    #[test]
    fn failed_writes_do_not_roll_back() {
        let now = Rc::new(Cell::new(0));
        let mut store = MemoryStore::new();
        store.fail_writes = true;

        let mut st = ParkingState::with_clock(store, clock(&now));
        st.enter("1", 2).unwrap();
        assert_eq!(st.state(), SessionState::Parked);
        assert!(st.persistence.store().values.is_empty());
    }

    #[test]
    fn unknown_district_leaves_state_idle() {
        let now = Rc::new(Cell::new(0));
        let mut st = ParkingState::with_clock(MemoryStore::new(), clock(&now));
        let err = st.enter("unknown-id", 2).unwrap_err();
        assert!(matches!(err, AppError::UnknownDistrict(_)));
        assert_eq!(st.state(), SessionState::Idle);
        assert!(!st.persistence.store().values.contains_key(KEY_SESSION));
    }

    #[test]
    fn observers_see_every_mutation() {
        let now = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut st = ParkingState::with_clock(MemoryStore::new(), clock(&now));
        st.subscribe(Box::new(Recorder(Rc::clone(&seen))));

        st.enter("1", 2).unwrap();
        st.checkout().unwrap();
        st.exit();
        st.exit(); // idle: no notification
        st.update_settings(Settings {
            default_duration: 3,
            default_reminder: 5,
        });
        st.add_district(&DistrictPatch {
            name: Some("New".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                "session:parked",
                "session:checked out",
                "session:idle",
                "settings",
                "catalog:3",
            ]
        );
    }

    #[test]
    fn removing_active_district_makes_session_dangling() {
        let now = Rc::new(Cell::new(0));
        let mut st = ParkingState::with_clock(MemoryStore::new(), clock(&now));
        st.enter("1", 2).unwrap();
        st.remove_district("1").unwrap();

        assert!(matches!(st.active_district(), Err(AppError::DanglingSession(_))));
        assert_eq!(st.state(), SessionState::Parked);

        st.exit();
        assert!(st.active_district().unwrap().is_none());
    }

    #[test]
    fn nearest_falls_back_to_catalog_order() {
        let now = Rc::new(Cell::new(0));
        let st = ParkingState::with_clock(MemoryStore::new(), clock(&now));

        assert_eq!(st.nearest(None).unwrap().id, "1");
        // close to the second seed district
        let near_skp = GeoPoint::new(1.5, 55.3);
        assert_eq!(st.nearest(Some(near_skp)).unwrap().id, "2");
    }
}
