use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::cli::ExportArgs;
use crate::commands::open_session;
use crate::ledger::session::LedgerSession;
use crate::model::ExportManifest;
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: ExportArgs) -> Result<()> {
    let session = open_session(&args.ledger);
    let manifest = build_manifest(&session)?;

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&session));
    write_json_pretty(&output, &manifest)?;

    info!(
        path = %output.display(),
        date = %manifest.ledger_date,
        sha256 = manifest.source_sha256.as_deref().unwrap_or("-"),
        "ledger exported"
    );
    Ok(())
}

pub fn build_manifest(session: &LedgerSession) -> Result<ExportManifest> {
    let source_path = session.store().ledger_path(session.date());
    let source_sha256 = if source_path.is_file() {
        Some(sha256_file(&source_path)?)
    } else {
        None
    };

    Ok(ExportManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        ledger_date: session.date(),
        source_path: source_path.display().to_string(),
        source_sha256,
        metrics: session.metrics(),
        overbooking: session.overbooking(),
        tables: session.snapshot().clone(),
    })
}

fn default_output_path(session: &LedgerSession) -> PathBuf {
    session.store().root().join("exports").join(format!(
        "POD_{}_{}.json",
        session.date(),
        utc_compact_string(Utc::now())
    ))
}
