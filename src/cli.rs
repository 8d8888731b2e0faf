use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::ledger::builders::{ActivityForm, AlertForm, EodForm, ManpowerForm};
use crate::util::local_today;

#[derive(Parser, Debug)]
#[command(
    name = "solar-pod",
    version,
    about = "Daily Plan of Day ledger for solar plant operations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    AddManpower(AddManpowerArgs),
    AddActivity(AddActivityArgs),
    AddAlert(AddAlertArgs),
    Eod(EodArgs),
    DeleteManpower(DeleteManpowerArgs),
    Metrics(ReportArgs),
    Show(ReportArgs),
    Export(ExportArgs),
    Dates(DatesArgs),
    Shell(ShellArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    #[arg(long, default_value = ".cache/pod")]
    pub ledger_root: PathBuf,

    /// Ledger date as YYYY-MM-DD; defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub roster_path: Option<PathBuf>,
}

impl LedgerArgs {
    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(local_today)
    }

    pub fn roster_path(&self) -> PathBuf {
        self.roster_path
            .clone()
            .unwrap_or_else(|| self.ledger_root.join("roster.json"))
    }
}

#[derive(Args, Debug, Clone)]
pub struct ManpowerFields {
    #[arg(long)]
    pub shift: String,

    #[arg(long, allow_negative_numbers = true)]
    pub persons: i64,

    /// Comma separated employee names.
    #[arg(long, default_value = "")]
    pub employees: String,

    /// Employee picked from the roster; repeatable.
    #[arg(long = "select")]
    pub selected: Vec<String>,
}

impl ManpowerFields {
    pub fn to_form(&self) -> ManpowerForm {
        ManpowerForm {
            shift: self.shift.clone(),
            person_count: self.persons,
            names_text: self.employees.clone(),
            selected_names: self.selected.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ActivityFields {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub location: String,

    #[arg(long)]
    pub shift: String,

    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    pub persons: i64,

    #[arg(long, default_value = "")]
    pub employees: String,

    #[arg(long = "select")]
    pub selected: Vec<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub priority: Option<String>,
}

impl ActivityFields {
    pub fn to_form(&self) -> ActivityForm {
        ActivityForm {
            name: self.name.clone(),
            location: self.location.clone(),
            shift: self.shift.clone(),
            person_count: self.persons,
            names_text: self.employees.clone(),
            selected_names: self.selected.clone(),
            status: self.status.clone(),
            priority: self.priority.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AlertFields {
    #[arg(long)]
    pub name: String,

    #[arg(long, allow_negative_numbers = true)]
    pub count: i64,
}

impl AlertFields {
    pub fn to_form(&self) -> AlertForm {
        AlertForm {
            activity_name: self.name.clone(),
            total_count: self.count,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EodFields {
    /// Activity or Alert.
    #[arg(long = "type")]
    pub kind: String,

    #[arg(long)]
    pub name: String,

    /// Closing status for activities: Completed, Pending, In Progress, On Hold.
    #[arg(long, default_value = "")]
    pub status: String,

    #[arg(long, default_value = "")]
    pub remarks: String,

    /// Alerts rectified today.
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    pub resolved: i64,
}

impl EodFields {
    pub fn to_form(&self) -> EodForm {
        EodForm {
            kind: self.kind.clone(),
            name: self.name.clone(),
            status: self.status.clone(),
            remarks: self.remarks.clone(),
            resolved_today: self.resolved,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AddManpowerArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(flatten)]
    pub fields: ManpowerFields,
}

#[derive(Args, Debug, Clone)]
pub struct AddActivityArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(flatten)]
    pub fields: ActivityFields,
}

#[derive(Args, Debug, Clone)]
pub struct AddAlertArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(flatten)]
    pub fields: AlertFields,
}

#[derive(Args, Debug, Clone)]
pub struct EodArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[command(flatten)]
    pub fields: EodFields,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteManpowerArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Zero-based row index as printed by `show`.
    #[arg(long)]
    pub index: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DatesArgs {
    #[arg(long, default_value = ".cache/pod")]
    pub ledger_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ShellArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,
}

/// One line typed into `solar-pod shell`.
#[derive(Parser, Debug)]
#[command(name = "pod", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShellCommand {
    AddManpower(ManpowerFields),
    AddActivity(ActivityFields),
    AddAlert(AlertFields),
    Eod(EodFields),
    DeleteManpower {
        #[arg(long)]
        index: usize,
    },
    UndoManpower,
    UndoActivity,
    Metrics,
    Show,
    Save,
    /// Switch to another ledger date.
    Date {
        date: NaiveDate,
    },
    #[command(alias = "quit")]
    Exit,
}
