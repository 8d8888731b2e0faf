use serde::Serialize;

use crate::ledger::builders::EodUpdate;
use crate::ledger::error::ValidationError;
use crate::model::{AlertRecord, EodKind, EodRecord, Ledger};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum AlertState {
    Open,
    PartiallyRectified,
    Resolved,
}

impl AlertState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::PartiallyRectified => "Partially Rectified",
            Self::Resolved => "Resolved",
        }
    }
}

impl AlertRecord {
    pub fn rederive(&mut self) {
        self.rectified_count = self.rectified_count.min(self.total_count);
        self.balance = self.total_count - self.rectified_count;
    }

    pub fn remaining(&self) -> u32 {
        self.total_count.saturating_sub(self.rectified_count)
    }

    pub fn state(&self) -> AlertState {
        if self.remaining() == 0 {
            AlertState::Resolved
        } else if self.rectified_count == 0 {
            AlertState::Open
        } else {
            AlertState::PartiallyRectified
        }
    }

    pub fn rectify(&mut self, resolved_today: u32) -> Result<AlertState, ValidationError> {
        self.rederive();
        let remaining = self.remaining();
        if resolved_today > remaining {
            return Err(ValidationError::OverResolution {
                name: self.activity_name.clone(),
                requested: resolved_today,
                remaining,
            });
        }

        self.rectified_count = (self.rectified_count + resolved_today).min(self.total_count);
        self.rederive();
        Ok(self.state())
    }
}

pub fn rederive_alerts(alerts: &mut [AlertRecord]) {
    for alert in alerts {
        alert.rederive();
    }
}

/// On error the ledger is left unchanged.
pub fn apply_eod_update(
    ledger: &mut Ledger,
    update: EodUpdate,
    recorded_at: String,
) -> Result<EodRecord, ValidationError> {
    let record = match update {
        EodUpdate::Alert {
            name,
            resolved_today,
            remarks,
        } => {
            let alert = ledger
                .alert_mut(&name)
                .ok_or_else(|| ValidationError::UnknownReference {
                    kind: EodKind::Alert,
                    name: name.clone(),
                })?;
            let state = alert.rectify(resolved_today)?;

            EodRecord {
                kind: EodKind::Alert,
                name,
                status: state.label().to_string(),
                remarks,
                resolved_today,
                balance_after: alert.balance,
                recorded_at,
            }
        }
        EodUpdate::Activity {
            name,
            status,
            remarks,
        } => {
            let mut matched = false;
            for activity in ledger.activities.iter_mut().filter(|a| a.name == name) {
                matched = true;
                if let Some(projected) = status.projected_status() {
                    activity.status = projected;
                }
            }
            if !matched {
                return Err(ValidationError::UnknownReference {
                    kind: EodKind::Activity,
                    name,
                });
            }

            EodRecord {
                kind: EodKind::Activity,
                name,
                status: status.label().to_string(),
                remarks,
                resolved_today: 0,
                balance_after: 0,
                recorded_at,
            }
        }
    };

    ledger.eod.push(record.clone());
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityRecord, ActivityStatus, EodActivityStatus, Shift};

    fn alert(name: &str, total: u32, rectified: u32) -> AlertRecord {
        AlertRecord {
            activity_name: name.to_string(),
            total_count: total,
            rectified_count: rectified,
            balance: total - rectified,
        }
    }

    fn alert_update(name: &str, resolved_today: u32) -> EodUpdate {
        EodUpdate::Alert {
            name: name.to_string(),
            resolved_today,
            remarks: String::new(),
        }
    }

    #[test]
    fn rederive_repairs_drifted_rows() {
        let mut drifted = AlertRecord {
            activity_name: "SCB offline".to_string(),
            total_count: 5,
            rectified_count: 9,
            balance: 40,
        };
        drifted.rederive();
        assert_eq!(drifted.rectified_count, 5);
        assert_eq!(drifted.balance, 0);
        assert_eq!(drifted.state(), AlertState::Resolved);
    }

    #[test]
    fn rectify_walks_open_partial_resolved() {
        let mut record = alert("Tracker Fault", 33, 0);
        assert_eq!(record.state(), AlertState::Open);

        assert_eq!(record.rectify(10), Ok(AlertState::PartiallyRectified));
        assert_eq!((record.rectified_count, record.balance), (10, 23));

        assert_eq!(record.rectify(23), Ok(AlertState::Resolved));
        assert_eq!((record.rectified_count, record.balance), (33, 0));
    }

    #[test]
    fn rectify_rejects_more_than_remaining() {
        let mut record = alert("Inverter trip", 10, 7);
        let err = record.rectify(5).expect_err("3 remaining, 5 requested");
        assert_eq!(
            err,
            ValidationError::OverResolution {
                name: "Inverter trip".to_string(),
                requested: 5,
                remaining: 3,
            }
        );
        assert_eq!((record.rectified_count, record.balance), (7, 3));
    }

    #[test]
    fn zero_total_alert_is_resolved_and_accepts_zero_update() {
        let mut record = alert("Comms loss", 0, 0);
        assert_eq!(record.state(), AlertState::Resolved);
        assert_eq!(record.rectify(0), Ok(AlertState::Resolved));
        assert!(record.rectify(1).is_err());
    }

    #[test]
    fn apply_alert_update_appends_snapshot() {
        let mut ledger = Ledger {
            alerts: vec![alert("Tracker Fault", 33, 0)],
            ..Ledger::default()
        };

        let entry = apply_eod_update(
            &mut ledger,
            alert_update("Tracker Fault", 10),
            "2026-10-16T12:00:00Z".to_string(),
        )
        .expect("update should apply");

        assert_eq!(entry.kind, EodKind::Alert);
        assert_eq!(entry.resolved_today, 10);
        assert_eq!(entry.balance_after, 23);
        assert_eq!(entry.status, "Partially Rectified");
        assert_eq!(ledger.eod, vec![entry]);
        assert_eq!(ledger.alerts[0].balance, 23);
    }

    #[test]
    fn apply_update_rejects_unknown_alert_without_side_effects() {
        let mut ledger = Ledger {
            alerts: vec![alert("Tracker Fault", 33, 0)],
            ..Ledger::default()
        };
        let before = ledger.clone();

        let err = apply_eod_update(&mut ledger, alert_update("Nonexistent", 1), String::new())
            .expect_err("unknown alert");

        assert_eq!(
            err,
            ValidationError::UnknownReference {
                kind: EodKind::Alert,
                name: "Nonexistent".to_string(),
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn apply_activity_update_projects_status_onto_activity() {
        let mut ledger = Ledger {
            activities: vec![ActivityRecord {
                name: "Module cleaning".to_string(),
                location: "Block 4".to_string(),
                shift: Shift::ShiftA,
                person_count: 6,
                employee_names: Vec::new(),
                status: ActivityStatus::Planned,
                priority: None,
            }],
            ..Ledger::default()
        };

        let pending = EodUpdate::Activity {
            name: "Module cleaning".to_string(),
            status: EodActivityStatus::Pending,
            remarks: "rain delay".to_string(),
        };
        let entry = apply_eod_update(&mut ledger, pending, String::new()).expect("pending");
        assert_eq!(entry.status, "Pending");
        assert_eq!(ledger.activities[0].status, ActivityStatus::Planned);

        let completed = EodUpdate::Activity {
            name: "Module cleaning".to_string(),
            status: EodActivityStatus::Completed,
            remarks: String::new(),
        };
        apply_eod_update(&mut ledger, completed, String::new()).expect("completed");
        assert_eq!(ledger.activities[0].status, ActivityStatus::Completed);
        assert_eq!(ledger.eod.len(), 2);

        let unknown = EodUpdate::Activity {
            name: "Vegetation cutting".to_string(),
            status: EodActivityStatus::Completed,
            remarks: String::new(),
        };
        assert!(matches!(
            apply_eod_update(&mut ledger, unknown, String::new()),
            Err(ValidationError::UnknownReference {
                kind: EodKind::Activity,
                ..
            })
        ));
    }
}
