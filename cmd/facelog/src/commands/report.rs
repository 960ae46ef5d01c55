use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use facelog_recognizer::Recognizer;
use facelog_session::{totals, DateWindow};

use super::{local_time, print_json, today};

/// Days before the end date covered by a default summary.
const SUMMARY_DAYS: u64 = 7;

#[derive(Args)]
pub struct LogsCommand {
    /// Number of entries to show
    #[arg(short = 'n', long, default_value_t = 50)]
    pub limit: usize,
}

impl LogsCommand {
    pub fn run(&self, r: &Recognizer, json: bool) -> Result<()> {
        let entries = r.recent(self.limit)?;
        if json {
            return print_json(&entries);
        }
        let tz = r.tz();
        for e in &entries {
            let distance = e.distance.map(|d| format!("{d:.4}")).unwrap_or_else(|| "-".into());
            let mark = if e.matched { "+" } else { "-" };
            let detail = match (&e.identity_id, &e.reason) {
                (Some(id), _) => id.as_str(),
                (None, Some(reason)) => reason.as_str(),
                (None, None) => "",
            };
            println!(
                "{} {mark} {:<20} {distance:>8} {detail}",
                local_time(e.timestamp, &tz),
                e.name
            );
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct WorkHoursCommand {
    /// Local date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl WorkHoursCommand {
    pub fn run(&self, r: &Recognizer, json: bool) -> Result<()> {
        let tz = r.tz();
        let date = self.date.unwrap_or_else(|| today(&tz));
        let sessions = r.work_sessions(&DateWindow::day(date))?;
        if json {
            return print_json(&sessions);
        }
        if sessions.is_empty() {
            println!("no sessions on {date}");
            return Ok(());
        }
        for s in &sessions {
            let overnight = if s.crosses_midnight { " (overnight)" } else { "" };
            println!(
                "{:<20} {} -> {} {:>6.2}h {} events{overnight}",
                s.name,
                local_time(s.first_event_ts, &tz),
                local_time(s.last_event_ts, &tz),
                s.duration_hours,
                s.event_count
            );
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct SummaryCommand {
    /// First local date, YYYY-MM-DD (default: seven days before --end)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last local date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl SummaryCommand {
    fn window(&self, today: NaiveDate) -> Result<DateWindow> {
        let end = self.end.unwrap_or(today);
        Ok(match self.start {
            Some(start) => DateWindow::new(start, end)?,
            None => DateWindow::last_days(end, SUMMARY_DAYS),
        })
    }

    pub fn run(&self, r: &Recognizer, json: bool) -> Result<()> {
        let window = self.window(today(&r.tz()))?;
        let sessions = r.work_sessions(&window)?;
        let summary = totals(&sessions);
        if json {
            return print_json(&serde_json::json!({
                "start": window.start(),
                "end": window.end(),
                "totals": summary,
            }));
        }
        println!("{} .. {}", window.start(), window.end());
        for t in &summary {
            println!(
                "{:<20} {:>8.2}h {:>3} sessions {:>3} days",
                t.name, t.total_hours, t.sessions, t.days
            );
        }
        Ok(())
    }
}

pub fn stats(r: &Recognizer, json: bool) -> Result<()> {
    let s = r.stats()?;
    if json {
        return print_json(&s);
    }
    println!("identities: {} ({} active)", s.total_identities, s.active_identities);
    println!("ledger entries: {}", s.ledger_entries);
    println!("threshold: {}", s.threshold);
    Ok(())
}
