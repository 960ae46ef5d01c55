use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use facelog_gallery::JsonGallery;
use facelog_ledger::{JsonlLedger, Ledger, ScanFilter};
use facelog_matcher::MatcherConfig;
use facelog_recognizer::{Recognizer, RecognizerConfig};
use facelog_session::{totals, DateWindow};
use tempfile::tempdir;

const DIM: usize = 4;

// 2025-01-15T00:00:00Z
const DAY0_UTC: i64 = 1_736_899_200;

static NOW: AtomicI64 = AtomicI64::new(0);

fn now() -> i64 {
    NOW.load(Ordering::SeqCst)
}

/// Unix time of a wall-clock instant at UTC+7 on 2025-01-15 plus `day` days.
fn local(day: i64, hour: i64, min: i64) -> i64 {
    DAY0_UTC + day * 86_400 + (hour - 7) * 3_600 + min * 60
}

fn config() -> RecognizerConfig {
    RecognizerConfig {
        matcher: MatcherConfig {
            dim: DIM,
            ..MatcherConfig::default()
        },
        tz_offset_hours: 7,
    }
}

fn open(dir: &std::path::Path) -> (Recognizer, Arc<JsonlLedger>) {
    let gallery = Arc::new(JsonGallery::open(dir.join("embeddings.json"), DIM).unwrap());
    let ledger = Arc::new(JsonlLedger::open(dir.join("attendance_logs.jsonl")).unwrap());
    let r = Recognizer::new(config(), gallery, ledger.clone())
        .unwrap()
        .with_clock(now);
    (r, ledger)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn test_decisions_flow_into_sessions() {
    let dir = tempdir().unwrap();
    let (r, ledger) = open(dir.path());

    let alice = r
        .enroll_vector("Alice", "Engineer", vec![1.0, 0.0, 0.0, 0.0])
        .unwrap();
    let bob = r
        .enroll_vector("Bob", "Night guard", vec![0.0, 1.0, 0.0, 0.0])
        .unwrap();

    let attempts: [(i64, [f32; 4]); 6] = [
        (local(0, 8, 0), [0.95, 0.05, 0.0, 0.0]),
        (local(0, 12, 0), [0.0, 0.0, 1.0, 0.0]),
        (local(0, 17, 30), [1.0, 0.02, 0.0, 0.0]),
        (local(0, 23, 10), [0.03, 1.0, 0.0, 0.0]),
        (local(1, 0, 40), [0.0, 0.9, 0.05, 0.0]),
        (local(1, 9, 0), [0.0, 0.0, 0.0, 1.0]),
    ];
    let mut matched = 0;
    for (ts, q) in attempts {
        NOW.store(ts, Ordering::SeqCst);
        if r.recognize_vector(&q).unwrap().matched {
            matched += 1;
        }
    }
    assert_eq!(matched, 4);
    assert_eq!(ledger.count().unwrap(), 6);

    let unknown: Vec<_> = ledger
        .scan(&ScanFilter::all())
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| !e.matched)
        .collect();
    assert_eq!(unknown.len(), 2);
    assert!(unknown.iter().all(|e| e.name == "Unknown" && e.identity_id.is_none()));
    assert!(unknown.iter().all(|e| e.reason.as_deref() == Some("above_threshold")));

    let window = DateWindow::new(date("2025-01-15"), date("2025-01-16")).unwrap();
    let sessions = r.work_sessions(&window).unwrap();
    assert_eq!(sessions.len(), 2);

    let day = sessions.iter().find(|s| s.identity_id == alice.id).unwrap();
    assert_eq!(day.date, date("2025-01-15"));
    assert_eq!(day.duration_hours, 9.5);
    assert_eq!(day.event_count, 2);
    assert!(!day.crosses_midnight);

    let night = sessions.iter().find(|s| s.identity_id == bob.id).unwrap();
    assert_eq!(night.date, date("2025-01-15"));
    assert_eq!(night.name, "Bob");
    assert_eq!(night.first_event_ts, local(0, 23, 10));
    assert_eq!(night.last_event_ts, local(1, 0, 40));
    assert_eq!(night.duration_hours, 1.5);
    assert!(night.crosses_midnight);

    let t = totals(&sessions);
    assert_eq!(t.len(), 2);
    assert_eq!(t.iter().map(|x| x.total_hours).sum::<f64>(), 11.0);

    // Same ledger, same answer.
    assert_eq!(r.work_sessions(&window).unwrap(), sessions);

    // A window that only covers the second day sees a lone 00:40 event.
    let second = DateWindow::day(date("2025-01-16"));
    assert!(r.work_sessions(&second).unwrap().is_empty());
}

#[test]
fn test_state_survives_reopen() {
    let dir = tempdir().unwrap();
    let alice_id = {
        let (r, _) = open(dir.path());
        let alice = r
            .enroll_vector("Alice", "", vec![0.0, 0.0, 1.0, 0.0])
            .unwrap();
        r.set_active(&alice.id, false).unwrap();
        alice.id
    };

    let (r, ledger) = open(dir.path());
    let stats = r.stats().unwrap();
    assert_eq!(stats.total_identities, 1);
    assert_eq!(stats.active_identities, 0);

    assert!(!r.recognize_vector(&[0.0, 0.0, 1.0, 0.0]).unwrap().matched);
    r.set_active(&alice_id, true).unwrap();
    assert!(r.recognize_vector(&[0.0, 0.0, 1.0, 0.0]).unwrap().matched);

    let recent = r.recent(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].reason.as_deref(), Some("empty_gallery"));
    assert_eq!(recent[1].identity_id.as_deref(), Some(alice_id.as_str()));
    assert_eq!(ledger.count().unwrap(), 2);
}
