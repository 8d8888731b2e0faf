use crate::ledger::error::ValidationError;
use crate::ledger::roster::Roster;
use crate::model::{
    ActivityRecord, ActivityStatus, AlertRecord, EodActivityStatus, EodKind, ManpowerRecord,
    Priority, Shift,
};

const SHIFT_OPTIONS: &str = "ShiftA, General, ShiftB, ShiftC";
const ACTIVITY_STATUS_OPTIONS: &str = "Planned, InProgress, Completed, OnHold";
const PRIORITY_OPTIONS: &str = "Low, Medium, High, Critical";
const EOD_KIND_OPTIONS: &str = "Activity, Alert";
const EOD_ACTIVITY_STATUS_OPTIONS: &str = "Completed, Pending, In Progress, On Hold";

#[derive(Debug, Clone, Default)]
pub struct ManpowerForm {
    pub shift: String,
    pub person_count: i64,
    pub names_text: String,
    pub selected_names: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityForm {
    pub name: String,
    pub location: String,
    pub shift: String,
    pub person_count: i64,
    pub names_text: String,
    pub selected_names: Vec<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertForm {
    pub activity_name: String,
    pub total_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct EodForm {
    pub kind: String,
    pub name: String,
    pub status: String,
    pub remarks: String,
    pub resolved_today: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EodUpdate {
    Activity {
        name: String,
        status: EodActivityStatus,
        remarks: String,
    },
    Alert {
        name: String,
        resolved_today: u32,
        remarks: String,
    },
}

impl EodUpdate {
    pub fn kind(&self) -> EodKind {
        match self {
            Self::Activity { .. } => EodKind::Activity,
            Self::Alert { .. } => EodKind::Alert,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Activity { name, .. } | Self::Alert { name, .. } => name,
        }
    }
}

pub fn build_manpower(
    form: &ManpowerForm,
    roster: &Roster,
) -> Result<ManpowerRecord, ValidationError> {
    Ok(ManpowerRecord {
        shift: parse_shift(&form.shift)?,
        person_count: count("person_count", form.person_count)?,
        employee_names: merge_names(&form.names_text, &form.selected_names, roster)?,
    })
}

pub fn build_activity(
    form: &ActivityForm,
    roster: &Roster,
) -> Result<ActivityRecord, ValidationError> {
    let status = match form.status.as_deref().map(str::trim) {
        None | Some("") => ActivityStatus::default(),
        Some(raw) => ActivityStatus::parse(raw).ok_or_else(|| ValidationError::UnknownOption {
            field: "status",
            value: raw.to_string(),
            allowed: ACTIVITY_STATUS_OPTIONS,
        })?,
    };

    let priority = match form.priority.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(Priority::parse(raw).ok_or_else(|| {
            ValidationError::UnknownOption {
                field: "priority",
                value: raw.to_string(),
                allowed: PRIORITY_OPTIONS,
            }
        })?),
    };

    Ok(ActivityRecord {
        name: required_text("name", &form.name)?,
        location: form.location.trim().to_string(),
        shift: parse_shift(&form.shift)?,
        person_count: count("person_count", form.person_count)?,
        employee_names: merge_names(&form.names_text, &form.selected_names, roster)?,
        status,
        priority,
    })
}

pub fn build_alert(form: &AlertForm) -> Result<AlertRecord, ValidationError> {
    let total_count = count("total_count", form.total_count)?;
    Ok(AlertRecord {
        activity_name: required_text("activity_name", &form.activity_name)?,
        total_count,
        rectified_count: 0,
        balance: total_count,
    })
}

pub fn build_eod_update(form: &EodForm) -> Result<EodUpdate, ValidationError> {
    let kind = EodKind::parse(&form.kind).ok_or_else(|| ValidationError::UnknownOption {
        field: "type",
        value: form.kind.clone(),
        allowed: EOD_KIND_OPTIONS,
    })?;
    let name = required_text("name", &form.name)?;
    let remarks = form.remarks.trim().to_string();

    match kind {
        EodKind::Activity => {
            let status = EodActivityStatus::parse(&form.status).ok_or_else(|| {
                ValidationError::UnknownOption {
                    field: "status",
                    value: form.status.clone(),
                    allowed: EOD_ACTIVITY_STATUS_OPTIONS,
                }
            })?;
            Ok(EodUpdate::Activity {
                name,
                status,
                remarks,
            })
        }
        EodKind::Alert => Ok(EodUpdate::Alert {
            name,
            resolved_today: count("resolved_today", form.resolved_today)?,
            remarks,
        }),
    }
}

/// Splits a comma separated list, trimming tokens and dropping empty and
/// repeated ones. Repeats are matched exactly, case included.
pub fn split_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    for token in text.split(',') {
        push_unique(&mut names, token.trim());
    }
    names
}

pub fn merge_names(
    text: &str,
    selected: &[String],
    roster: &Roster,
) -> Result<Vec<String>, ValidationError> {
    let mut names = Vec::with_capacity(selected.len());
    for name in selected {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if !roster.contains(name) {
            return Err(ValidationError::NotOnRoster {
                name: name.to_string(),
            });
        }
        push_unique(&mut names, name);
    }

    for name in split_names(text) {
        push_unique(&mut names, &name);
    }

    Ok(names)
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}

fn parse_shift(raw: &str) -> Result<Shift, ValidationError> {
    Shift::parse(raw).ok_or_else(|| ValidationError::UnknownOption {
        field: "shift",
        value: raw.to_string(),
        allowed: SHIFT_OPTIONS,
    })
}

fn count(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| ValidationError::OutOfRange { field, value })
}

fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}
