use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{info, warn};

use crate::cli::DatesArgs;
use crate::ledger::metrics::Metrics;
use crate::ledger::store::{LEDGER_FILE_EXTENSION, LEDGER_FILE_PREFIX, LedgerStore};

pub fn run(args: DatesArgs) -> Result<()> {
    let dates = discover_dates(&args.ledger_root)?;
    info!(
        ledger_root = %args.ledger_root.display(),
        count = dates.len(),
        "ledger dates discovered"
    );

    let store = LedgerStore::new(&args.ledger_root);
    let mut output = io::BufWriter::new(io::stdout().lock());
    for date in dates {
        let loaded = store.load(date);
        let metrics = Metrics::compute(&loaded.ledger);
        writeln!(
            output,
            "{date}\tshifts={}\tpeople={}\tactivities={}\talerts={}\tbalance={}\tprogress={}%{}",
            metrics.total_shifts,
            metrics.total_people,
            metrics.total_activities,
            metrics.total_alerts,
            metrics.total_balance,
            metrics.progress_percent,
            if loaded.notices.is_empty() { "" } else { "\trecovered" }
        )?;
    }

    output.flush()?;
    Ok(())
}

/// Dates with a ledger file under `root`, oldest first. A missing root has none.
pub fn discover_dates(root: &Path) -> Result<Vec<NaiveDate>> {
    let pattern = Regex::new(&format!(
        r"^{}(\d{{4}}-\d{{2}}-\d{{2}})\.{}$",
        regex::escape(LEDGER_FILE_PREFIX),
        regex::escape(LEDGER_FILE_EXTENSION)
    ))
    .context("failed to compile ledger filename regex")?;

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", root.display()));
        }
    };

    let mut dates = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", root.display()))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(captures) = pattern.captures(name) else {
            continue;
        };
        match NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d") {
            Ok(date) => dates.push(date),
            Err(err) => warn!(file = name, error = %err, "skipping ledger file with invalid date"),
        }
    }

    dates.sort();
    dates.dedup();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_only_well_formed_ledger_files_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        for name in [
            "POD_2026-10-16.sqlite",
            "POD_2026-01-02.sqlite",
            "POD_2026-10-16.sqlite.tmp",
            "POD_2026-13-40.sqlite",
            "roster.json",
            "pod_2026-10-15.sqlite",
        ] {
            fs::write(temp.path().join(name), b"").expect("write fixture");
        }

        let dates = discover_dates(temp.path()).expect("discover");
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2026, 1, 2).expect("date"),
                NaiveDate::from_ymd_opt(2026, 10, 16).expect("date"),
            ]
        );
    }

    #[test]
    fn missing_root_has_no_dates() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dates = discover_dates(&temp.path().join("absent")).expect("discover");
        assert!(dates.is_empty());
    }
}
