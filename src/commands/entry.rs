use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{AddActivityArgs, AddAlertArgs, AddManpowerArgs, DeleteManpowerArgs, EodArgs};
use crate::commands::open_session;

pub fn add_manpower(args: AddManpowerArgs) -> Result<()> {
    let mut session = open_session(&args.ledger);
    let record = session
        .add_manpower(&args.fields.to_form())
        .context("failed to add manpower entry")?;

    info!(
        shift = record.shift.label(),
        persons = record.person_count,
        employees = %record.employee_names.join(", "),
        "manpower recorded"
    );
    Ok(())
}

pub fn add_activity(args: AddActivityArgs) -> Result<()> {
    let mut session = open_session(&args.ledger);
    let record = session
        .add_activity(&args.fields.to_form())
        .context("failed to add activity")?;

    info!(
        name = %record.name,
        location = %record.location,
        shift = record.shift.label(),
        persons = record.person_count,
        status = record.status.as_str(),
        priority = record.priority.map(|p| p.as_str()).unwrap_or("-"),
        "activity recorded"
    );
    Ok(())
}

pub fn add_alert(args: AddAlertArgs) -> Result<()> {
    let mut session = open_session(&args.ledger);
    let record = session
        .add_alert(&args.fields.to_form())
        .context("failed to add alert")?;

    info!(
        name = %record.activity_name,
        total = record.total_count,
        "alert recorded"
    );
    Ok(())
}

pub fn apply_eod(args: EodArgs) -> Result<()> {
    let mut session = open_session(&args.ledger);
    let entry = session
        .apply_eod_update(&args.fields.to_form())
        .context("failed to apply end-of-day update")?;

    info!(
        kind = entry.kind.as_str(),
        name = %entry.name,
        status = %entry.status,
        balance_after = entry.balance_after,
        "end-of-day entry recorded"
    );
    Ok(())
}

pub fn delete_manpower(args: DeleteManpowerArgs) -> Result<()> {
    let mut session = open_session(&args.ledger);
    let removed = session
        .delete_manpower_entry(args.index)
        .with_context(|| format!("failed to delete manpower row {}", args.index))?;

    info!(
        index = args.index,
        shift = removed.shift.label(),
        persons = removed.person_count,
        "manpower entry removed"
    );
    Ok(())
}
