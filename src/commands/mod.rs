pub mod dates;
pub mod entry;
pub mod export;
pub mod report;
pub mod shell;

use tracing::{info, warn};

use crate::cli::LedgerArgs;
use crate::ledger::roster::Roster;
use crate::ledger::session::LedgerSession;
use crate::ledger::store::LedgerStore;

pub fn open_session(args: &LedgerArgs) -> LedgerSession {
    let roster_path = args.roster_path();
    let roster = Roster::load(&roster_path).unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable roster");
        Roster::default()
    });

    let date = args.date();
    info!(
        ledger_root = %args.ledger_root.display(),
        date = %date,
        roster = roster.len(),
        "opening ledger"
    );

    LedgerSession::open(LedgerStore::new(&args.ledger_root), date, roster)
}
