use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::reminder::{Countdown, next_reminder};
use crate::core::session::elapsed_at;
use crate::core::state::ParkingState;
use crate::core::ticker::Ticker;
use crate::db::kv::KeyValueStore;
use crate::db::persistence::{KEY_SESSION, Persistence};
use crate::errors::AppResult;
use crate::models::session::ParkingSession;
use crate::models::settings::Settings;
use crate::ui::messages::{detail, error, header, info};
use crate::utils::colors::{RESET, color_for_countdown};
use crate::utils::time::{format_hms, format_local};
use chrono::{DateTime, Utc};
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::warn;

use super::open_state;

pub fn handle_status(_cli: &Cli, cfg: &Config) -> AppResult<()> {
    let state = open_state(cfg)?;
    print_status(&state)
}

fn print_status<S: KeyValueStore>(state: &ParkingState<S>) -> AppResult<()> {
    let Some(session) = state.session() else {
        info("No active session.");
        return Ok(());
    };

    let district = match state.active_district() {
        Ok(d) => d,
        Err(e) => {
            error(&e);
            error("Run `parkwatch exit` to discard the session.");
            return Err(e);
        }
    };

    let name = district.map(|d| d.name.as_str()).unwrap_or_default();
    header(name);
    detail("state", state.state().label());
    detail("since", format_local(session.checkout_time.unwrap_or(session.start_time)));
    detail("elapsed", format_hms(state.elapsed()));

    if let Some(d) = district {
        detail("free duration", format!("{}h", d.free_duration));
        detail("exit duration", format!("{} min", d.exit_duration));
        detail("payment account", d.payment_label());
    }
    if session.delay_hours > 0 {
        detail("delay", format!("{}h", session.delay_hours));
    }

    if let Some(r) = state.next_reminder() {
        let color = color_for_countdown(r.due_in.num_seconds());
        let text = match r.countdown() {
            Countdown::Remaining(d) => format!("{} (at {})", format_hms(d), format_local(r.deadline)),
            Countdown::Overdue => "overdue".to_string(),
        };
        detail("next reminder", format!("{color}{text}{RESET}"));
    }

    Ok(())
}

/// `watch`: re-evaluate the countdown every tick until the session ends,
/// `--ticks` refreshes have been printed, or the process is interrupted.
///
/// The stored session is re-read on every tick so a `checkout` or `exit`
/// run from another shell shows up in the running watcher.
pub fn handle_watch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Watch { ticks } = &cli.command else {
        return Ok(());
    };

    let state = open_state(cfg)?;
    let Some(session) = state.session().cloned() else {
        info("No active session.");
        return Ok(());
    };
    let name = state
        .active_district()?
        .map(|d| d.name.clone())
        .unwrap_or_default();
    let settings = *state.settings();
    let limit = *ticks;
    let persistence = Persistence::new(state.into_store());

    header(format!("{} ({})", name, session.state().label()));

    let interval = Duration::from_secs(cfg.tick_seconds.max(1));
    let mut phase = session.state();
    let mut current = Some(session);
    let ticker = Ticker::start(interval, move |n| {
        match persistence.load::<ParkingSession>(KEY_SESSION) {
            Ok(fresh) => current = fresh,
            Err(e) => warn!(error = %e, "could not re-read the session, keeping the last one"),
        }

        let Some(line) = tick_line(current.as_ref(), &settings, Utc::now()) else {
            info("Session ended.");
            return ControlFlow::Break(());
        };
        if let Some(s) = &current
            && s.state() != phase
        {
            phase = s.state();
            header(format!("{} ({})", name, phase.label()));
        }
        println!("{line}");

        if limit.is_some_and(|max| n >= max) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    ticker.wait();
    Ok(())
}

/// One refresh line, or `None` once the session is gone.
fn tick_line(
    session: Option<&ParkingSession>,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Option<String> {
    let session = session?;
    let r = next_reminder(session, settings, now);
    let color = color_for_countdown(r.due_in.num_seconds());
    let countdown = match r.countdown() {
        Countdown::Remaining(d) => format_hms(d),
        Countdown::Overdue => "overdue".to_string(),
    };
    Some(format!(
        "elapsed {} | next reminder {color}{countdown}{RESET}",
        format_hms(elapsed_at(session, now))
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn tick_line_follows_the_current_phase() {
        let settings = Settings::default();
        let mut s = ParkingSession::new("1", t(0), 2);

        let line = tick_line(Some(&s), &settings, t(60_000)).unwrap();
        assert!(line.starts_with("elapsed 00:01:00"));
        assert!(line.contains("01:56:00"));

        s.checkout_time = Some(t(120_000));
        let line = tick_line(Some(&s), &settings, t(180_000)).unwrap();
        assert!(line.starts_with("elapsed 00:01:00"));
        assert!(line.contains("00:56:00"));
    }

    #[test]
    fn tick_line_stops_once_the_session_is_gone() {
        assert_eq!(tick_line(None, &Settings::default(), t(0)), None);
    }
}
