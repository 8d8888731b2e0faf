use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};

use crate::cli::{LedgerArgs, ShellArgs, ShellCommand, ShellLine};
use crate::commands::open_session;
use crate::commands::report::{write_session_metrics, write_tables_text};
use crate::ledger::error::LedgerError;
use crate::ledger::session::LedgerSession;

const PROMPT: &str = "pod> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Exit,
}

struct ShellState {
    args: LedgerArgs,
    session: LedgerSession,
}

impl ShellState {
    fn open(args: LedgerArgs) -> Self {
        let session = open_session(&args);
        Self { args, session }
    }

    fn switch_date(&mut self, date: NaiveDate) {
        let mut args = self.args.clone();
        args.date = Some(date);
        *self = Self::open(args);
    }
}

pub fn run(args: ShellArgs) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    run_script(args.ledger, stdin.lock(), &mut stdout, true)
}

pub fn run_script<R: BufRead, W: Write>(
    args: LedgerArgs,
    input: R,
    output: &mut W,
    prompt: bool,
) -> Result<()> {
    let mut state = ShellState::open(args);
    writeln!(output, "Plan of Day {} (type `help` for commands)", state.session.date())?;

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(output, "{PROMPT}")?;
            output.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let tokens = match split_command_line(&line) {
            Ok(tokens) if tokens.is_empty() => continue,
            Ok(tokens) => tokens,
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };

        let parsed = match ShellLine::try_parse_from(&tokens) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(output, "{}", err.render())?;
                continue;
            }
        };

        if execute(&mut state, parsed.command, output)? == Step::Exit {
            break;
        }
    }

    info!(date = %state.session.date(), "shell closed");
    output.flush()?;
    Ok(())
}

fn execute<W: Write>(state: &mut ShellState, command: ShellCommand, output: &mut W) -> Result<Step> {
    let outcome: Result<String, LedgerError> = match command {
        ShellCommand::AddManpower(fields) => state
            .session
            .add_manpower(&fields.to_form())
            .map(|row| format!("added manpower: {} x{}", row.shift.label(), row.person_count)),
        ShellCommand::AddActivity(fields) => state
            .session
            .add_activity(&fields.to_form())
            .map(|row| format!("added activity: {} ({})", row.name, row.shift.label())),
        ShellCommand::AddAlert(fields) => state
            .session
            .add_alert(&fields.to_form())
            .map(|row| format!("added alert: {} total={}", row.activity_name, row.total_count)),
        ShellCommand::Eod(fields) => state
            .session
            .apply_eod_update(&fields.to_form())
            .map(|entry| {
                format!(
                    "recorded {}: {} -> {} (balance {})",
                    entry.kind.as_str(),
                    entry.name,
                    entry.status,
                    entry.balance_after
                )
            }),
        ShellCommand::DeleteManpower { index } => state
            .session
            .delete_manpower_entry(index)
            .map(|row| format!("deleted manpower [{index}]: {}", row.shift.label())),
        ShellCommand::UndoManpower => state.session.undo_last_manpower_change().map(|undone| {
            if undone {
                "manpower change undone".to_string()
            } else {
                "nothing to undo".to_string()
            }
        }),
        ShellCommand::UndoActivity => state.session.undo_last_activity_change().map(|undone| {
            if undone {
                "activity change undone".to_string()
            } else {
                "nothing to undo".to_string()
            }
        }),
        ShellCommand::Save => state
            .session
            .save()
            .map(|()| format!("saved {}", state.session.store().ledger_path(state.session.date()).display())),
        ShellCommand::Metrics => {
            write_session_metrics(output, &state.session)?;
            return Ok(Step::Continue);
        }
        ShellCommand::Show => {
            write_session_metrics(output, &state.session)?;
            write_tables_text(output, state.session.snapshot())?;
            return Ok(Step::Continue);
        }
        ShellCommand::Date { date } => {
            state.switch_date(date);
            writeln!(output, "switched to {date}")?;
            return Ok(Step::Continue);
        }
        ShellCommand::Exit => return Ok(Step::Exit),
    };

    match outcome {
        Ok(message) => writeln!(output, "{message}")?,
        Err(err) => match err.as_validation() {
            Some(rejected) => writeln!(output, "rejected: {rejected}")?,
            None => {
                warn!(date = %state.session.date(), error = %err, "ledger not saved");
                writeln!(output, "error: {err}")?;
            }
        },
    }
    Ok(Step::Continue)
}

pub fn split_command_line(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_token = true;
            }
            None if ch.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(ch);
                in_token = true;
            }
        }
    }

    if let Some(open) = quote {
        bail!("unterminated {open} quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
