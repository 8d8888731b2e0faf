use std::collections::BTreeMap;

use rusqlite::types::Value;

use crate::ledger::builders::split_names;
use crate::model::{
    ActivityRecord, ActivityStatus, AlertRecord, EodKind, EodRecord, ManpowerRecord, Priority,
    Shift,
};

pub const SCHEMA_VERSION: &str = "3";

pub type RawRow = BTreeMap<String, Value>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnDefault {
    Integer,
    Text(&'static str),
}

#[derive(Copy, Clone, Debug)]
pub struct Column {
    pub name: &'static str,
    pub default: ColumnDefault,
}

impl Column {
    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            default: ColumnDefault::Integer,
        }
    }

    const fn text(name: &'static str) -> Self {
        Self::text_or(name, "")
    }

    const fn text_or(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: ColumnDefault::Text(default),
        }
    }

    fn sql_definition(&self) -> String {
        match self.default {
            ColumnDefault::Integer => format!("{} INTEGER NOT NULL DEFAULT 0", self.name),
            ColumnDefault::Text(text) => {
                format!("{} TEXT NOT NULL DEFAULT '{}'", self.name, text)
            }
        }
    }

    pub fn default_value(&self) -> Value {
        match self.default {
            ColumnDefault::Integer => Value::Integer(0),
            ColumnDefault::Text(text) => Value::Text(text.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(Column::sql_definition)
            .collect::<Vec<_>>()
            .join(",\n  ");
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n  row_id INTEGER PRIMARY KEY,\n  {}\n)",
            self.name, columns
        )
    }

    pub fn insert_sql(&self) -> String {
        let names = self
            .columns
            .iter()
            .map(|column| column.name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO \"{}\" ({names}) VALUES ({placeholders})",
            self.name
        )
    }

    pub fn backfill(&self, row: &mut RawRow) -> usize {
        let mut filled = 0;
        for column in self.columns {
            let slot = row
                .entry(column.name.to_string())
                .or_insert(Value::Null);
            if matches!(slot, Value::Null) {
                *slot = column.default_value();
                filled += 1;
            }
        }
        filled
    }
}

pub const MANPOWER: TableSchema = TableSchema {
    name: "Manpower",
    columns: &[
        Column::text("shift"),
        Column::integer("person_count"),
        Column::text("employee_names"),
    ],
};

pub const ACTIVITIES: TableSchema = TableSchema {
    name: "Activities",
    columns: &[
        Column::text("name"),
        Column::text("location"),
        Column::text("shift"),
        Column::integer("person_count"),
        Column::text("employee_names"),
        Column::text_or("status", "Planned"),
        Column::text("priority"),
    ],
};

pub const ALERTS: TableSchema = TableSchema {
    name: "Alerts",
    columns: &[
        Column::text("activity_name"),
        Column::integer("total_count"),
        Column::integer("rectified_count"),
        Column::integer("balance"),
    ],
};

pub const EOD: TableSchema = TableSchema {
    name: "EOD",
    columns: &[
        Column::text_or("kind", "Activity"),
        Column::text("name"),
        Column::text("status"),
        Column::text("remarks"),
        Column::integer("resolved_today"),
        Column::integer("balance_after"),
        Column::text("recorded_at"),
    ],
};

pub const ALL_TABLES: [&TableSchema; 4] = [&MANPOWER, &ACTIVITIES, &ALERTS, &EOD];

pub trait TableRow: Sized {
    const SCHEMA: &'static TableSchema;

    fn from_raw(row: &RawRow) -> Result<Self, String>;

    fn to_values(&self) -> Vec<Value>;
}

impl TableRow for ManpowerRecord {
    const SCHEMA: &'static TableSchema = &MANPOWER;

    fn from_raw(row: &RawRow) -> Result<Self, String> {
        Ok(Self {
            shift: shift_column(row, "shift")?,
            person_count: count_column(row, "person_count")?,
            employee_names: names_column(row, "employee_names")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.shift.as_str().to_string()),
            Value::Integer(i64::from(self.person_count)),
            names_value(&self.employee_names),
        ]
    }
}

impl TableRow for ActivityRecord {
    const SCHEMA: &'static TableSchema = &ACTIVITIES;

    fn from_raw(row: &RawRow) -> Result<Self, String> {
        let status_raw = text_column(row, "status")?;
        let status = if status_raw.trim().is_empty() {
            ActivityStatus::default()
        } else {
            ActivityStatus::parse(&status_raw)
                .ok_or_else(|| format!("unknown activity status {status_raw:?}"))?
        };

        let priority_raw = text_column(row, "priority")?;
        let priority = if priority_raw.trim().is_empty() {
            None
        } else {
            Some(
                Priority::parse(&priority_raw)
                    .ok_or_else(|| format!("unknown priority {priority_raw:?}"))?,
            )
        };

        Ok(Self {
            name: text_column(row, "name")?,
            location: text_column(row, "location")?,
            shift: shift_column(row, "shift")?,
            person_count: count_column(row, "person_count")?,
            employee_names: names_column(row, "employee_names")?,
            status,
            priority,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.location.clone()),
            Value::Text(self.shift.as_str().to_string()),
            Value::Integer(i64::from(self.person_count)),
            names_value(&self.employee_names),
            Value::Text(self.status.as_str().to_string()),
            Value::Text(
                self.priority
                    .map(|priority| priority.as_str().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}

impl TableRow for AlertRecord {
    const SCHEMA: &'static TableSchema = &ALERTS;

    fn from_raw(row: &RawRow) -> Result<Self, String> {
        // Stored balance is ignored; the store re-derives it after load.
        Ok(Self {
            activity_name: text_column(row, "activity_name")?,
            total_count: count_column(row, "total_count")?,
            rectified_count: count_column(row, "rectified_count")?,
            balance: 0,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.activity_name.clone()),
            Value::Integer(i64::from(self.total_count)),
            Value::Integer(i64::from(self.rectified_count)),
            Value::Integer(i64::from(self.balance)),
        ]
    }
}

impl TableRow for EodRecord {
    const SCHEMA: &'static TableSchema = &EOD;

    fn from_raw(row: &RawRow) -> Result<Self, String> {
        let kind_raw = text_column(row, "kind")?;
        let kind =
            EodKind::parse(&kind_raw).ok_or_else(|| format!("unknown EOD type {kind_raw:?}"))?;

        Ok(Self {
            kind,
            name: text_column(row, "name")?,
            status: text_column(row, "status")?,
            remarks: text_column(row, "remarks")?,
            resolved_today: count_column(row, "resolved_today")?,
            balance_after: count_column(row, "balance_after")?,
            recorded_at: text_column(row, "recorded_at")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.kind.as_str().to_string()),
            Value::Text(self.name.clone()),
            Value::Text(self.status.clone()),
            Value::Text(self.remarks.clone()),
            Value::Integer(i64::from(self.resolved_today)),
            Value::Integer(i64::from(self.balance_after)),
            Value::Text(self.recorded_at.clone()),
        ]
    }
}

fn column<'a>(row: &'a RawRow, name: &str) -> Result<&'a Value, String> {
    row.get(name).ok_or_else(|| format!("missing column {name}"))
}

fn text_column(row: &RawRow, name: &str) -> Result<String, String> {
    match column(row, name)? {
        Value::Null => Ok(String::new()),
        Value::Text(text) => Ok(text.clone()),
        Value::Integer(value) => Ok(value.to_string()),
        Value::Real(value) => Ok(value.to_string()),
        Value::Blob(_) => Err(format!("column {name} holds binary data")),
    }
}

fn count_column(row: &RawRow, name: &str) -> Result<u32, String> {
    match column(row, name)? {
        Value::Null => Ok(0),
        Value::Integer(value) => {
            u32::try_from(*value).map_err(|_| format!("column {name} out of range: {value}"))
        }
        Value::Real(value) if value.fract() == 0.0 && *value >= 0.0 && *value <= f64::from(u32::MAX) => {
            Ok(*value as u32)
        }
        Value::Real(value) => Err(format!("column {name} is not a count: {value}")),
        Value::Text(text) if text.trim().is_empty() => Ok(0),
        Value::Text(text) => text
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("column {name} is not a count: {text:?}")),
        Value::Blob(_) => Err(format!("column {name} holds binary data")),
    }
}

fn shift_column(row: &RawRow, name: &str) -> Result<Shift, String> {
    let raw = text_column(row, name)?;
    Shift::parse(&raw).ok_or_else(|| format!("unknown shift {raw:?}"))
}

fn names_value(names: &[String]) -> Value {
    Value::Text(serde_json::Value::from(names.to_vec()).to_string())
}

// Version 2 files stored names comma joined.
fn names_column(row: &RawRow, name: &str) -> Result<Vec<String>, String> {
    let raw = text_column(row, name)?;
    if raw.trim_start().starts_with('[') {
        if let Ok(names) = serde_json::from_str::<Vec<String>>(&raw) {
            return Ok(names);
        }
    }
    Ok(split_names(&raw))
}
