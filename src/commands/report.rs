use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::ReportArgs;
use crate::commands::open_session;
use crate::ledger::metrics::{Metrics, OverbookingWarning};
use crate::ledger::session::LedgerSession;
use crate::model::Ledger;

#[derive(Debug, Serialize)]
struct MetricsReport {
    ledger_date: NaiveDate,
    metrics: Metrics,
    overbooking: Vec<OverbookingWarning>,
}

pub fn metrics(args: ReportArgs) -> Result<()> {
    let session = open_session(&args.ledger);
    let mut output = io::BufWriter::new(io::stdout().lock());

    if args.json {
        let report = MetricsReport {
            ledger_date: session.date(),
            metrics: session.metrics(),
            overbooking: session.overbooking(),
        };
        serde_json::to_writer_pretty(&mut output, &report)
            .context("failed to serialize metrics json output")?;
        writeln!(output)?;
    } else {
        write_session_metrics(&mut output, &session)?;
    }

    output.flush()?;
    Ok(())
}

pub fn show(args: ReportArgs) -> Result<()> {
    let session = open_session(&args.ledger);
    let mut output = io::BufWriter::new(io::stdout().lock());

    if args.json {
        serde_json::to_writer_pretty(&mut output, &session.export_snapshot())
            .context("failed to serialize ledger json output")?;
        writeln!(output)?;
    } else {
        write_session_metrics(&mut output, &session)?;
        writeln!(output)?;
        write_tables_text(&mut output, session.snapshot())?;
    }

    output.flush()?;
    Ok(())
}

pub fn write_session_metrics<W: Write>(output: &mut W, session: &LedgerSession) -> Result<()> {
    for notice in session.notices() {
        writeln!(output, "Notice: {notice}")?;
    }
    write_metrics_text(
        output,
        session.date(),
        &session.metrics(),
        &session.overbooking(),
    )
}

pub fn write_metrics_text<W: Write>(
    output: &mut W,
    date: NaiveDate,
    metrics: &Metrics,
    overbooking: &[OverbookingWarning],
) -> Result<()> {
    writeln!(output, "Plan of Day {date}")?;
    writeln!(
        output,
        "Shifts: {}  People: {}  Activities: {}  Alerts: {}",
        metrics.total_shifts, metrics.total_people, metrics.total_activities, metrics.total_alerts
    )?;
    writeln!(
        output,
        "Progress: {}% (completed={} pending={})",
        metrics.progress_percent, metrics.completed_activities, metrics.pending_activities
    )?;
    writeln!(
        output,
        "Rectification: rectified={} balance={} open={} partial={} resolved={}",
        metrics.total_rectified,
        metrics.total_balance,
        metrics.open_alerts,
        metrics.partially_rectified_alerts,
        metrics.resolved_alerts
    )?;

    if !overbooking.is_empty() {
        writeln!(output, "Overbooking:")?;
        for warning in overbooking {
            writeln!(output, "  - {}", warning.describe())?;
        }
    }

    Ok(())
}

pub fn write_tables_text<W: Write>(output: &mut W, ledger: &Ledger) -> Result<()> {
    writeln!(output, "Manpower ({})", ledger.manpower.len())?;
    if ledger.manpower.is_empty() {
        writeln!(output, "  (none)")?;
    }
    for (idx, row) in ledger.manpower.iter().enumerate() {
        writeln!(
            output,
            "  [{idx}]\t{}\tpersons={}\t{}",
            row.shift.label(),
            row.person_count,
            row.employee_names.join(", ")
        )?;
    }

    writeln!(output, "Activities ({})", ledger.activities.len())?;
    if ledger.activities.is_empty() {
        writeln!(output, "  (none)")?;
    }
    for (idx, row) in ledger.activities.iter().enumerate() {
        writeln!(
            output,
            "  [{idx}]\t{}\t{}\t{}\tpersons={}\t{}\t{}\t{}",
            row.name,
            if row.location.is_empty() { "-" } else { row.location.as_str() },
            row.shift.label(),
            row.person_count,
            row.status.as_str(),
            row.priority.map(|p| p.as_str()).unwrap_or("-"),
            row.employee_names.join(", ")
        )?;
    }

    writeln!(output, "Alerts ({})", ledger.alerts.len())?;
    if ledger.alerts.is_empty() {
        writeln!(output, "  (none)")?;
    }
    for (idx, row) in ledger.alerts.iter().enumerate() {
        writeln!(
            output,
            "  [{idx}]\t{}\ttotal={}\trectified={}\tbalance={}\t{}",
            row.activity_name,
            row.total_count,
            row.rectified_count,
            row.balance,
            row.state().label()
        )?;
    }

    writeln!(output, "EOD ({})", ledger.eod.len())?;
    if ledger.eod.is_empty() {
        writeln!(output, "  (none)")?;
    }
    for (idx, row) in ledger.eod.iter().enumerate() {
        writeln!(
            output,
            "  [{idx}]\t{}\t{}\t{}\tresolved={}\tbalance_after={}\t{}",
            row.kind.as_str(),
            row.name,
            row.status,
            row.resolved_today,
            row.balance_after,
            row.remarks
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertRecord, ManpowerRecord, Shift};

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        write(&mut buf).expect("render should succeed");
        String::from_utf8(buf).expect("utf-8 output")
    }

    #[test]
    fn metrics_text_lists_kpis_and_overbooking() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        let metrics = Metrics {
            total_shifts: 1,
            total_people: 4,
            total_alerts: 33,
            total_balance: 23,
            total_rectified: 10,
            partially_rectified_alerts: 1,
            ..Metrics::default()
        };
        let warnings = vec![OverbookingWarning::ShiftCapacity {
            shift: Shift::ShiftA,
            available: 4,
            assigned: 6,
        }];

        let text = render(|out| write_metrics_text(out, date, &metrics, &warnings));

        assert!(text.starts_with("Plan of Day 2026-10-16\n"));
        assert!(text.contains("Shifts: 1  People: 4  Activities: 0  Alerts: 33"));
        assert!(text.contains("Progress: 0% (completed=0 pending=0)"));
        assert!(text.contains("rectified=10 balance=23 open=0 partial=1 resolved=0"));
        assert!(text.contains("Shift A (06:30-15:00): 6 persons assigned to activities, 4 available"));
    }

    #[test]
    fn tables_text_marks_empty_tables_and_numbers_rows() {
        let ledger = Ledger {
            manpower: vec![ManpowerRecord {
                shift: Shift::ShiftC,
                person_count: 2,
                employee_names: vec!["Dev".to_string(), "Esha".to_string()],
            }],
            alerts: vec![AlertRecord {
                activity_name: "Tracker Fault".to_string(),
                total_count: 33,
                rectified_count: 33,
                balance: 0,
            }],
            ..Ledger::default()
        };

        let text = render(|out| write_tables_text(out, &ledger));

        assert!(text.contains("Manpower (1)\n  [0]\tShift C (21:00-06:00)\tpersons=2\tDev, Esha\n"));
        assert!(text.contains("Activities (0)\n  (none)\n"));
        assert!(text.contains("[0]\tTracker Fault\ttotal=33\trectified=33\tbalance=0\tResolved"));
        assert!(text.contains("EOD (0)\n  (none)\n"));
    }
}
