use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ledger::reconcile::AlertState;
use crate::model::{EodActivityStatus, EodKind, Ledger, Shift};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total_shifts: usize,
    pub total_people: u64,
    pub total_activities: usize,
    pub total_alerts: u64,
    pub completed_activities: usize,
    pub pending_activities: usize,
    pub progress_percent: u32,
    pub total_rectified: u64,
    pub total_balance: u64,
    pub open_alerts: usize,
    pub partially_rectified_alerts: usize,
    pub resolved_alerts: usize,
}

impl Metrics {
    pub fn compute(ledger: &Ledger) -> Self {
        let completed_activities = count_activity_eod(ledger, EodActivityStatus::Completed);
        let total_activities = ledger.activities.len();

        let mut metrics = Self {
            total_shifts: ledger.manpower.len(),
            total_people: ledger
                .manpower
                .iter()
                .map(|row| u64::from(row.person_count))
                .sum(),
            total_activities,
            total_alerts: ledger
                .alerts
                .iter()
                .map(|alert| u64::from(alert.total_count))
                .sum(),
            completed_activities,
            pending_activities: count_activity_eod(ledger, EodActivityStatus::Pending),
            progress_percent: progress_percent(completed_activities, total_activities),
            ..Self::default()
        };

        for alert in &ledger.alerts {
            let rectified = alert.rectified_count.min(alert.total_count);
            metrics.total_rectified += u64::from(rectified);
            metrics.total_balance += u64::from(alert.total_count - rectified);
            match alert.state() {
                AlertState::Open => metrics.open_alerts += 1,
                AlertState::PartiallyRectified => metrics.partially_rectified_alerts += 1,
                AlertState::Resolved => metrics.resolved_alerts += 1,
            }
        }

        metrics
    }
}

fn count_activity_eod(ledger: &Ledger, status: EodActivityStatus) -> usize {
    ledger
        .eod
        .iter()
        .filter(|row| row.kind == EodKind::Activity)
        .filter(|row| EodActivityStatus::parse(&row.status) == Some(status))
        .count()
}

// Repeated EOD entries for one activity can outnumber the activities.
fn progress_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverbookingWarning {
    ShiftCapacity {
        shift: Shift,
        available: u64,
        assigned: u64,
    },
    DoubleBooked {
        shift: Shift,
        employee: String,
        activities: Vec<String>,
    },
}

impl OverbookingWarning {
    pub fn describe(&self) -> String {
        match self {
            Self::ShiftCapacity {
                shift,
                available,
                assigned,
            } => format!(
                "{}: {assigned} persons assigned to activities, {available} available",
                shift.label()
            ),
            Self::DoubleBooked {
                shift,
                employee,
                activities,
            } => format!(
                "{}: {employee} is assigned to {}",
                shift.label(),
                activities.join(", ")
            ),
        }
    }
}

pub fn overbooking(ledger: &Ledger) -> Vec<OverbookingWarning> {
    let mut available = BTreeMap::<Shift, u64>::new();
    for row in &ledger.manpower {
        *available.entry(row.shift).or_default() += u64::from(row.person_count);
    }

    let mut assigned = BTreeMap::<Shift, u64>::new();
    let mut bookings = BTreeMap::<(Shift, &str), BTreeSet<&str>>::new();
    for activity in &ledger.activities {
        *assigned.entry(activity.shift).or_default() += u64::from(activity.person_count);
        for employee in &activity.employee_names {
            bookings
                .entry((activity.shift, employee.as_str()))
                .or_default()
                .insert(activity.name.as_str());
        }
    }

    let mut warnings = Vec::new();
    for (shift, assigned) in assigned {
        let available = available.get(&shift).copied().unwrap_or(0);
        if assigned > available {
            warnings.push(OverbookingWarning::ShiftCapacity {
                shift,
                available,
                assigned,
            });
        }
    }

    for ((shift, employee), activities) in bookings {
        if activities.len() > 1 {
            warnings.push(OverbookingWarning::DoubleBooked {
                shift,
                employee: employee.to_string(),
                activities: activities.into_iter().map(ToOwned::to_owned).collect(),
            });
        }
    }

    warnings
}
