use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use tracing::{debug, info, warn};

use crate::ledger::error::StorageError;
use crate::ledger::reconcile::rederive_alerts;
use crate::ledger::schema::{ALL_TABLES, RawRow, SCHEMA_VERSION, TableRow};
use crate::model::Ledger;
use crate::util::now_utc_string;

pub const LEDGER_FILE_PREFIX: &str = "POD_";
pub const LEDGER_FILE_EXTENSION: &str = "sqlite";

#[derive(Debug, Clone)]
pub struct LedgerStore {
    root: PathBuf,
}

#[derive(Debug, Default)]
pub struct LoadedLedger {
    pub ledger: Ledger,
    pub notices: Vec<StorageError>,
}

impl LoadedLedger {
    fn recover<T>(&mut self, result: Result<Vec<T>, StorageError>) -> Vec<T> {
        result.unwrap_or_else(|err| {
            warn!(error = %err, "falling back to an empty table");
            self.notices.push(err);
            Vec::new()
        })
    }
}

impl LedgerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_name(date: NaiveDate) -> String {
        format!("{LEDGER_FILE_PREFIX}{date}.{LEDGER_FILE_EXTENSION}")
    }

    pub fn ledger_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(Self::file_name(date))
    }

    fn temp_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("{}.tmp", Self::file_name(date)))
    }

    pub fn load(&self, date: NaiveDate) -> LoadedLedger {
        let path = self.ledger_path(date);
        let mut loaded = LoadedLedger::default();

        if !path.exists() {
            debug!(path = %path.display(), "no ledger file yet, starting empty");
            return loaded;
        }

        let connection =
            match Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY) {
                Ok(connection) => connection,
                Err(source) => {
                    let err = StorageError::Open { path, source };
                    warn!(error = %err, "ledger unreadable, starting empty");
                    loaded.notices.push(err);
                    return loaded;
                }
            };

        if let Err(err) = check_ledger_date(&connection, &path, date) {
            warn!(error = %err, "ledger rejected, starting empty");
            loaded.notices.push(err);
            return loaded;
        }

        let manpower = read_table(&connection, &path);
        loaded.ledger.manpower = loaded.recover(manpower);
        let activities = read_table(&connection, &path);
        loaded.ledger.activities = loaded.recover(activities);
        let alerts = read_table(&connection, &path);
        loaded.ledger.alerts = loaded.recover(alerts);
        let eod = read_table(&connection, &path);
        loaded.ledger.eod = loaded.recover(eod);

        rederive_alerts(&mut loaded.ledger.alerts);

        debug!(
            path = %path.display(),
            empty = loaded.ledger.is_empty(),
            manpower = loaded.ledger.manpower.len(),
            activities = loaded.ledger.activities.len(),
            alerts = loaded.ledger.alerts.len(),
            eod = loaded.ledger.eod.len(),
            "loaded ledger"
        );
        loaded
    }

    pub fn save(&self, date: NaiveDate, ledger: &Ledger) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })?;

        let path = self.ledger_path(date);
        let temp_path = self.temp_path(date);
        remove_if_present(&temp_path)?;

        let result = write_ledger_file(&temp_path, date, ledger).and_then(|()| {
            fs::rename(&temp_path, &path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result?;

        info!(
            path = %path.display(),
            manpower = ledger.manpower.len(),
            activities = ledger.activities.len(),
            alerts = ledger.alerts.len(),
            eod = ledger.eod.len(),
            "saved ledger"
        );
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn table_exists(connection: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Files written before metadata existed carry no date and are accepted.
fn check_ledger_date(
    connection: &Connection,
    path: &Path,
    expected: NaiveDate,
) -> Result<(), StorageError> {
    let read_err = |source| StorageError::ReadTable {
        path: path.to_path_buf(),
        table: "metadata",
        source,
    };

    if !table_exists(connection, "metadata").map_err(read_err)? {
        return Ok(());
    }

    let found: Option<NaiveDate> = connection
        .query_row(
            "SELECT value FROM metadata WHERE key = 'ledger_date'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(read_err)?;

    match found {
        Some(found) if found != expected => Err(StorageError::ForeignLedger {
            path: path.to_path_buf(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

fn read_table<T: TableRow>(connection: &Connection, path: &Path) -> Result<Vec<T>, StorageError> {
    let schema = T::SCHEMA;
    let read_err = |source| StorageError::ReadTable {
        path: path.to_path_buf(),
        table: schema.name,
        source,
    };

    if !table_exists(connection, schema.name).map_err(read_err)? {
        debug!(table = schema.name, "table missing from ledger, using empty table");
        return Ok(Vec::new());
    }

    let mut statement = connection
        .prepare(&format!("SELECT * FROM \"{}\" ORDER BY rowid", schema.name))
        .map_err(read_err)?;
    let columns = statement
        .column_names()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();

    let mut rows = statement.query([]).map_err(read_err)?;
    let mut records = Vec::new();
    let mut backfilled = 0;

    while let Some(row) = rows.next().map_err(read_err)? {
        let mut raw = RawRow::new();
        for (idx, name) in columns.iter().enumerate() {
            let value: Value = row.get(idx).map_err(read_err)?;
            raw.insert(name.clone(), value);
        }
        backfilled += schema.backfill(&mut raw);

        let record = T::from_raw(&raw).map_err(|reason| StorageError::CorruptRow {
            path: path.to_path_buf(),
            table: schema.name,
            reason,
        })?;
        records.push(record);
    }

    if backfilled > 0 {
        debug!(
            table = schema.name,
            backfilled, "filled columns missing from an older ledger"
        );
    }

    Ok(records)
}

fn write_ledger_file(path: &Path, date: NaiveDate, ledger: &Ledger) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut connection = Connection::open(path).map_err(write_err)?;
    configure_connection(&connection).map_err(write_err)?;
    ensure_schema(&connection).map_err(write_err)?;

    let tx = connection.transaction().map_err(write_err)?;
    insert_rows(&tx, &ledger.manpower).map_err(write_err)?;
    insert_rows(&tx, &ledger.activities).map_err(write_err)?;
    insert_rows(&tx, &ledger.alerts).map_err(write_err)?;
    insert_rows(&tx, &ledger.eod).map_err(write_err)?;
    write_metadata(&tx, date).map_err(write_err)?;
    tx.commit().map_err(write_err)?;

    connection.close().map_err(|(_, source)| write_err(source))
}

fn configure_connection(connection: &Connection) -> rusqlite::Result<()> {
    connection.pragma_update(None, "synchronous", "FULL")
}

fn ensure_schema(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );
        ",
    )?;

    for schema in ALL_TABLES {
        connection.execute_batch(&schema.create_sql())?;
    }

    Ok(())
}

fn insert_rows<T: TableRow>(connection: &Connection, rows: &[T]) -> rusqlite::Result<()> {
    let mut statement = connection.prepare(&T::SCHEMA.insert_sql())?;
    for row in rows {
        statement.execute(params_from_iter(row.to_values()))?;
    }
    Ok(())
}

fn write_metadata(connection: &Connection, date: NaiveDate) -> rusqlite::Result<()> {
    let upsert = "INSERT INTO metadata(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value";
    connection.execute(upsert, params!["schema_version", SCHEMA_VERSION])?;
    connection.execute(upsert, params!["ledger_date", date])?;
    connection.execute(upsert, params!["saved_at", now_utc_string()])?;
    Ok(())
}

#[cfg(test)]
mod tests;
