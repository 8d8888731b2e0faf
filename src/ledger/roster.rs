use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ledger::error::StorageError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    employees: Vec<String>,
}

impl Roster {
    #[cfg(test)]
    pub fn new(employees: Vec<String>) -> Self {
        Self { employees }
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.employees.iter().any(|employee| employee.trim() == name)
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }
}
