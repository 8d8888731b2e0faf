use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::metrics::{Metrics, OverbookingWarning};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Shift {
    ShiftA,
    General,
    ShiftB,
    ShiftC,
}

impl Shift {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShiftA => "ShiftA",
            Self::General => "General",
            Self::ShiftB => "ShiftB",
            Self::ShiftC => "ShiftC",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ShiftA => "Shift A (06:30-15:00)",
            Self::General => "General Shift (09:00-18:00)",
            Self::ShiftB => "Shift B (13:00-21:00)",
            Self::ShiftC => "Shift C (21:00-06:00)",
        }
    }

    /// Accepts the stored code, the display label, or a short form such as
    /// `a`, `shift-a` or `general`.
    pub fn parse(raw: &str) -> Option<Self> {
        match option_key(raw).as_str() {
            "shifta" | "a" => Some(Self::ShiftA),
            "general" | "generalshift" | "g" => Some(Self::General),
            "shiftb" | "b" => Some(Self::ShiftB),
            "shiftc" | "c" => Some(Self::ShiftC),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum ActivityStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    OnHold,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::OnHold => "OnHold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match option_key(raw).as_str() {
            "planned" => Some(Self::Planned),
            "inprogress" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            "onhold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match option_key(raw).as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EodKind {
    Activity,
    Alert,
}

impl EodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "Activity",
            Self::Alert => "Alert",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match option_key(raw).as_str() {
            "activity" => Some(Self::Activity),
            "alert" => Some(Self::Alert),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EodActivityStatus {
    Completed,
    Pending,
    InProgress,
    OnHold,
}

impl EodActivityStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match option_key(raw).as_str() {
            "completed" | "done" => Some(Self::Completed),
            "pending" => Some(Self::Pending),
            "inprogress" => Some(Self::InProgress),
            "onhold" => Some(Self::OnHold),
            _ => None,
        }
    }

    /// Status the referenced activity moves to, if any.
    pub fn projected_status(self) -> Option<ActivityStatus> {
        match self {
            Self::Completed => Some(ActivityStatus::Completed),
            Self::InProgress => Some(ActivityStatus::InProgress),
            Self::OnHold => Some(ActivityStatus::OnHold),
            Self::Pending => None,
        }
    }
}

fn option_key(raw: &str) -> String {
    let head = raw.split('(').next().unwrap_or_default();
    head.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManpowerRecord {
    pub shift: Shift,
    pub person_count: u32,
    pub employee_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub name: String,
    pub location: String,
    pub shift: Shift,
    pub person_count: u32,
    pub employee_names: Vec<String>,
    pub status: ActivityStatus,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub activity_name: String,
    pub total_count: u32,
    pub rectified_count: u32,
    pub balance: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EodRecord {
    pub kind: EodKind,
    pub name: String,
    pub status: String,
    pub remarks: String,
    pub resolved_today: u32,
    pub balance_after: u32,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub manpower: Vec<ManpowerRecord>,
    pub activities: Vec<ActivityRecord>,
    pub alerts: Vec<AlertRecord>,
    pub eod: Vec<EodRecord>,
}

impl Ledger {
    pub fn is_empty(&self) -> bool {
        self.manpower.is_empty()
            && self.activities.is_empty()
            && self.alerts.is_empty()
            && self.eod.is_empty()
    }

    pub fn alert(&self, activity_name: &str) -> Option<&AlertRecord> {
        self.alerts
            .iter()
            .find(|alert| alert.activity_name == activity_name)
    }

    pub fn alert_mut(&mut self, activity_name: &str) -> Option<&mut AlertRecord> {
        self.alerts
            .iter_mut()
            .find(|alert| alert.activity_name == activity_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub ledger_date: NaiveDate,
    pub tables: Ledger,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub ledger_date: NaiveDate,
    pub source_path: String,
    pub source_sha256: Option<String>,
    pub metrics: Metrics,
    pub overbooking: Vec<OverbookingWarning>,
    pub tables: Ledger,
}
