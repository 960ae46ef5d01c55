//! Subcommand implementations.

mod identity;
mod report;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

pub use identity::{EnrollCommand, RecognizeCommand, SetActiveCommand};
pub use report::{stats, LogsCommand, SummaryCommand, WorkHoursCommand};

/// Read an embedding stored as a JSON array of numbers.
pub(crate) fn read_vector(path: &Path) -> Result<Vec<f32>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_vector(&data).with_context(|| format!("invalid vector in {}", path.display()))
}

fn parse_vector(data: &str) -> Result<Vec<f32>> {
    let values: Vec<f64> = serde_json::from_str(data)?;
    if values.is_empty() {
        anyhow::bail!("vector is empty");
    }
    Ok(values.into_iter().map(|v| v as f32).collect())
}

/// Print pretty JSON to stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format Unix seconds as local wall-clock time.
pub(crate) fn local_time(ts: i64, tz: &FixedOffset) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Today's date at the given offset.
pub(crate) fn today(tz: &FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}
