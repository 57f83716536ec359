//! Library-level tests of the parking state against a real SQLite file.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parkwatch::core::state::ParkingState;
use parkwatch::db::pool::DbPool;
use parkwatch::errors::AppError;
use parkwatch::models::session::SessionState;
use std::cell::Cell;
use std::env;
use std::path::PathBuf;
use std::rc::Rc;

const MIN: i64 = 60_000;
const H: i64 = 60 * MIN;

fn setup_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_parkwatch_state.sqlite", name));
    let p = path.to_string_lossy().to_string();
    std::fs::remove_file(&p).ok();
    p
}

fn clock(ms: &Rc<Cell<i64>>) -> impl Fn() -> DateTime<Utc> + use<> {
    let ms = Rc::clone(ms);
    move || Utc.timestamp_millis_opt(ms.get()).unwrap()
}

#[test]
fn session_is_restored_after_restart() {
    let db = setup_db("restart");
    let now = Rc::new(Cell::new(0));

    {
        let mut st = ParkingState::with_clock(DbPool::open(&db).unwrap(), clock(&now));
        st.enter("1", 2).unwrap();
        now.set(5 * H);
        st.checkout().unwrap();
    }

    let st = ParkingState::with_clock(DbPool::open(&db).unwrap(), clock(&now));
    assert_eq!(st.state(), SessionState::CheckedOut);

    let r = st.next_reminder().unwrap();
    assert_eq!(r.deadline, Utc.timestamp_millis_opt(6 * H - 3 * MIN).unwrap());
}

#[test]
fn checkout_then_delay_shifts_deadline_by_one_hour() {
    let db = setup_db("checkout_delay");
    let now = Rc::new(Cell::new(0));
    let mut st = ParkingState::with_clock(DbPool::open(&db).unwrap(), clock(&now));

    st.enter("2", 2).unwrap();
    now.set(5 * H);
    st.checkout().unwrap();
    let before = st.next_reminder().unwrap();
    assert_eq!(before.due_in, TimeDelta::minutes(57));

    st.delay().unwrap();
    let after = st.next_reminder().unwrap();
    assert_eq!(after.deadline - before.deadline, TimeDelta::hours(1));
    // elapsed counts from checkout and is not affected by the delay
    now.set(5 * H + 10 * MIN);
    assert_eq!(st.elapsed(), TimeDelta::minutes(10));
}

#[test]
fn exit_clears_the_stored_record() {
    let db = setup_db("exit_clears");
    let now = Rc::new(Cell::new(0));

    {
        let mut st = ParkingState::with_clock(DbPool::open(&db).unwrap(), clock(&now));
        st.enter("1", 1).unwrap();
        st.exit();
        assert!(st.exit().is_none());
    }

    let conn = rusqlite::Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_store WHERE key = 'session'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn unknown_district_surfaces_to_caller() {
    let db = setup_db("unknown");
    let now = Rc::new(Cell::new(0));
    let mut st = ParkingState::with_clock(DbPool::open(&db).unwrap(), clock(&now));

    match st.enter("unknown-id", 2) {
        Err(AppError::UnknownDistrict(id)) => assert_eq!(id, "unknown-id"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(st.state(), SessionState::Idle);
}
