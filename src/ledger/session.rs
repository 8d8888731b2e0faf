use std::collections::VecDeque;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::ledger::builders::{
    ActivityForm, AlertForm, EodForm, ManpowerForm, build_activity, build_alert,
    build_eod_update, build_manpower,
};
use crate::ledger::error::{LedgerError, StorageError, ValidationError};
use crate::ledger::metrics::{Metrics, OverbookingWarning, overbooking};
use crate::ledger::reconcile::apply_eod_update;
use crate::ledger::roster::Roster;
use crate::ledger::store::LedgerStore;
use crate::model::{
    ActivityRecord, AlertRecord, EodRecord, Ledger, LedgerSnapshot, ManpowerRecord,
};
use crate::util::now_utc_string;

pub const UNDO_DEPTH: usize = 20;

#[derive(Debug, Clone)]
struct UndoStack<T> {
    snapshots: VecDeque<Vec<T>>,
    depth: usize,
}

impl<T> UndoStack<T> {
    fn new(depth: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(depth),
            depth,
        }
    }

    fn push(&mut self, snapshot: Vec<T>) {
        if self.depth == 0 {
            return;
        }
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    fn pop(&mut self) -> Option<Vec<T>> {
        self.snapshots.pop_back()
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }
}

#[derive(Debug)]
pub struct LedgerSession {
    store: LedgerStore,
    date: NaiveDate,
    roster: Roster,
    ledger: Ledger,
    notices: Vec<StorageError>,
    manpower_undo: UndoStack<ManpowerRecord>,
    activity_undo: UndoStack<ActivityRecord>,
}

impl LedgerSession {
    pub fn open(store: LedgerStore, date: NaiveDate, roster: Roster) -> Self {
        let loaded = store.load(date);
        for notice in &loaded.notices {
            warn!(date = %date, notice = %notice, "ledger loaded with recovery");
        }

        Self {
            store,
            date,
            roster,
            ledger: loaded.ledger,
            notices: loaded.notices,
            manpower_undo: UndoStack::new(UNDO_DEPTH),
            activity_undo: UndoStack::new(UNDO_DEPTH),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn notices(&self) -> &[StorageError] {
        &self.notices
    }

    pub fn add_manpower(&mut self, form: &ManpowerForm) -> Result<&ManpowerRecord, LedgerError> {
        let record = build_manpower(form, &self.roster)?;
        let previous = self.ledger.manpower.clone();

        let mut next = self.ledger.clone();
        next.manpower.push(record);
        self.commit(next)?;
        self.manpower_undo.push(previous);

        info!(
            date = %self.date,
            table = "Manpower",
            rows = self.ledger.manpower.len(),
            "manpower entry added"
        );
        Ok(&self.ledger.manpower[self.ledger.manpower.len() - 1])
    }

    pub fn add_activity(&mut self, form: &ActivityForm) -> Result<&ActivityRecord, LedgerError> {
        let record = build_activity(form, &self.roster)?;
        let previous = self.ledger.activities.clone();

        let mut next = self.ledger.clone();
        next.activities.push(record);
        self.commit(next)?;
        self.activity_undo.push(previous);

        info!(
            date = %self.date,
            table = "Activities",
            rows = self.ledger.activities.len(),
            "activity added"
        );
        for warning in self.overbooking() {
            warn!(date = %self.date, warning = %warning.describe(), "overbooked");
        }
        Ok(&self.ledger.activities[self.ledger.activities.len() - 1])
    }

    pub fn add_alert(&mut self, form: &AlertForm) -> Result<&AlertRecord, LedgerError> {
        let record = build_alert(form)?;
        if self.ledger.alert(&record.activity_name).is_some() {
            return Err(ValidationError::DuplicateAlert {
                name: record.activity_name,
            }
            .into());
        }

        let mut next = self.ledger.clone();
        next.alerts.push(record);
        self.commit(next)?;

        info!(
            date = %self.date,
            table = "Alerts",
            rows = self.ledger.alerts.len(),
            "alert added"
        );
        Ok(&self.ledger.alerts[self.ledger.alerts.len() - 1])
    }

    pub fn apply_eod_update(&mut self, form: &EodForm) -> Result<EodRecord, LedgerError> {
        let update = build_eod_update(form)?;
        debug!(
            date = %self.date,
            kind = update.kind().as_str(),
            name = update.name(),
            "reconciling end-of-day update"
        );

        let mut next = self.ledger.clone();
        let entry = apply_eod_update(&mut next, update, now_utc_string())?;
        self.commit(next)?;

        info!(
            date = %self.date,
            kind = entry.kind.as_str(),
            name = %entry.name,
            status = %entry.status,
            resolved_today = entry.resolved_today,
            balance_after = entry.balance_after,
            "end-of-day update applied"
        );
        Ok(entry)
    }

    pub fn delete_manpower_entry(&mut self, index: usize) -> Result<ManpowerRecord, LedgerError> {
        let len = self.ledger.manpower.len();
        if index >= len {
            return Err(ValidationError::NoSuchEntry {
                table: "Manpower",
                index,
                len,
            }
            .into());
        }
        let previous = self.ledger.manpower.clone();

        let mut next = self.ledger.clone();
        let removed = next.manpower.remove(index);
        self.commit(next)?;
        self.manpower_undo.push(previous);

        info!(date = %self.date, table = "Manpower", index, "manpower entry deleted");
        Ok(removed)
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo_last_manpower_change(&mut self) -> Result<bool, LedgerError> {
        let Some(previous) = self.manpower_undo.pop() else {
            return Ok(false);
        };

        let mut next = self.ledger.clone();
        next.manpower = previous.clone();
        if let Err(err) = self.commit(next) {
            self.manpower_undo.push(previous);
            return Err(err);
        }

        info!(
            date = %self.date,
            table = "Manpower",
            remaining_undo = self.manpower_undo.len(),
            "manpower change undone"
        );
        Ok(true)
    }

    pub fn undo_last_activity_change(&mut self) -> Result<bool, LedgerError> {
        let Some(previous) = self.activity_undo.pop() else {
            return Ok(false);
        };

        let mut next = self.ledger.clone();
        next.activities = previous.clone();
        if let Err(err) = self.commit(next) {
            self.activity_undo.push(previous);
            return Err(err);
        }

        info!(
            date = %self.date,
            table = "Activities",
            remaining_undo = self.activity_undo.len(),
            "activity change undone"
        );
        Ok(true)
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        self.store.save(self.date, &self.ledger)?;
        Ok(())
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(&self.ledger)
    }

    pub fn overbooking(&self) -> Vec<OverbookingWarning> {
        overbooking(&self.ledger)
    }

    pub fn snapshot(&self) -> &Ledger {
        &self.ledger
    }

    pub fn export_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            ledger_date: self.date,
            tables: self.ledger.clone(),
        }
    }

    fn commit(&mut self, next: Ledger) -> Result<(), LedgerError> {
        self.store.save(self.date, &next)?;
        self.ledger = next;
        Ok(())
    }
}
