use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike};
use facelog_ledger::LedgerEntry;
use serde::Serialize;
use tracing::{debug, warn};

use crate::window::DateWindow;

/// Local hour at or after which a first event may open an overnight session.
pub const OVERNIGHT_START_HOUR: u32 = 22;

/// Local hour before which an event may close an overnight session.
pub const OVERNIGHT_END_HOUR: u32 = 6;

/// Presence interval of one identity on one work date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkSession {
    pub identity_id: String,
    /// Name recorded on the session's first event.
    pub name: String,
    /// Local work date the session is attributed to.
    pub date: NaiveDate,
    pub first_event_ts: i64,
    pub last_event_ts: i64,
    /// `(last - first) / 3600`, rounded to two decimals.
    pub duration_hours: f64,
    pub event_count: usize,
    pub crosses_midnight: bool,
}

impl WorkSession {
    /// Unrounded duration in seconds.
    pub fn duration_secs(&self) -> i64 {
        self.last_event_ts - self.first_event_ts
    }
}

/// Aggregate over all sessions of one identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityTotal {
    pub identity_id: String,
    pub name: String,
    pub total_hours: f64,
    pub sessions: usize,
    pub days: usize,
}

struct Event {
    ts: i64,
    local: DateTime<FixedOffset>,
    name: String,
}

/// Derive work sessions from ledger entries.
///
/// Only matched entries whose local date (at `tz`) lies inside `window` are
/// used. Entries are grouped per identity and local work date and sorted by
/// timestamp, so append order does not matter. Groups with fewer than two
/// events are dropped. An event before [`OVERNIGHT_END_HOUR`] stays with the
/// previous date's group when the identity's preceding event was on that date
/// at or after [`OVERNIGHT_START_HOUR`] (or already continued it).
///
/// The output is sorted by `(date, identity_id)` and depends only on the set
/// of entries passed in.
pub fn reconstruct<I>(entries: I, window: &DateWindow, tz: &FixedOffset) -> Vec<WorkSession>
where
    I: IntoIterator<Item = LedgerEntry>,
{
    let mut by_identity: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for entry in entries {
        if !entry.matched {
            continue;
        }
        let Some(id) = entry.identity_id else {
            warn!("session: matched entry at {} has no identity, skipped", entry.timestamp);
            continue;
        };
        let Some(local) = tz.timestamp_opt(entry.timestamp, 0).single() else {
            warn!("session: timestamp {} out of range, skipped", entry.timestamp);
            continue;
        };
        if !window.contains(local.date_naive()) {
            continue;
        }
        by_identity.entry(id).or_default().push(Event {
            ts: entry.timestamp,
            local,
            name: entry.name,
        });
    }

    let mut sessions = Vec::new();
    for (id, mut events) in by_identity {
        events.sort_by(|a, b| a.ts.cmp(&b.ts).then_with(|| a.name.cmp(&b.name)));
        for (date, group) in group_by_work_date(events) {
            if group.len() < 2 {
                debug!("session: {id} on {date}: single event, no session");
                continue;
            }
            sessions.push(build_session(&id, date, &group));
        }
    }

    sessions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.identity_id.cmp(&b.identity_id))
    });
    sessions
}

/// Split one identity's time-sorted events into work-date groups.
fn group_by_work_date(events: Vec<Event>) -> BTreeMap<NaiveDate, Vec<Event>> {
    let mut groups: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    let mut prev: Option<(NaiveDate, NaiveDate, u32)> = None; // (work date, local date, hour)

    for ev in events {
        let date = ev.local.date_naive();
        let hour = ev.local.hour();
        let work_date = match prev {
            Some((prev_work, prev_date, prev_hour))
                if hour < OVERNIGHT_END_HOUR
                    && date.pred_opt() == Some(prev_work)
                    && (prev_hour >= OVERNIGHT_START_HOUR || prev_date == date) =>
            {
                prev_work
            }
            _ => date,
        };
        prev = Some((work_date, date, hour));
        groups.entry(work_date).or_default().push(ev);
    }
    groups
}

fn build_session(id: &str, date: NaiveDate, group: &[Event]) -> WorkSession {
    let first = &group[0];
    let last = &group[group.len() - 1];
    let hours = (last.ts - first.ts) as f64 / 3600.0;

    let crosses_midnight = first.local.date_naive() != last.local.date_naive()
        || (last.local.hour() < OVERNIGHT_END_HOUR && first.local.hour() >= OVERNIGHT_START_HOUR);

    WorkSession {
        identity_id: id.to_string(),
        name: first.name.clone(),
        date,
        first_event_ts: first.ts,
        last_event_ts: last.ts,
        duration_hours: round2(hours),
        event_count: group.len(),
        crosses_midnight,
    }
}

/// Sum sessions per identity, sorted by identity id.
pub fn totals(sessions: &[WorkSession]) -> Vec<IdentityTotal> {
    struct Acc<'a> {
        name: &'a str,
        secs: i64,
        sessions: usize,
        days: BTreeSet<NaiveDate>,
    }

    let mut acc: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for s in sessions {
        let a = acc.entry(s.identity_id.as_str()).or_insert_with(|| Acc {
            name: &s.name,
            secs: 0,
            sessions: 0,
            days: BTreeSet::new(),
        });
        a.secs += s.duration_secs();
        a.sessions += 1;
        a.days.insert(s.date);
    }

    acc.into_iter()
        .map(|(id, a)| IdentityTotal {
            identity_id: id.to_string(),
            name: a.name.to_string(),
            total_hours: round2(a.secs as f64 / 3600.0),
            sessions: a.sessions,
            days: a.days.len(),
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
