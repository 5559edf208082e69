// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQLite persistence for income-offset ledgers.
//!
//! Each case's ledger is stored as one JSON document so that year
//! boundaries, declaration identities and arrears records survive a round
//! trip unchanged. Audit events are stored alongside, keyed by case.
//!
//! Migrations are embedded and applied when a connection is opened.
//! In-memory databases are used by tests and by the replay tool when no
//! database file is given.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use avkorting::{Avkorting, LedgerLookup, TransitionResult};
use avkorting_domain::CaseRef;
use diesel::{Connection, SqliteConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::StoredAuditEvent;
pub use error::PersistenceError;

/// Counter giving every in-memory database a unique name.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opaque storage of ledgers by case.
pub trait AvkortingRepository {
    /// Loads the ledger stored for `case_ref`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    fn load(&self, case_ref: CaseRef) -> Result<Option<Avkorting>, PersistenceError>;

    /// Stores `avkorting` as the ledger of `case_ref`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be written.
    fn save(&self, case_ref: CaseRef, avkorting: &Avkorting) -> Result<(), PersistenceError>;
}

/// Persistence adapter for ledgers and their audit events.
pub struct Persistence {
    conn: Mutex<SqliteConnection>,
}

impl Persistence {
    /// Creates a persistence adapter over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:avkorting_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a persistence adapter over a database file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::ConnectionPoisoned)
    }

    /// Stores the new ledger of a transition together with its audit event.
    ///
    /// Both writes happen in one transaction.
    ///
    /// # Returns
    ///
    /// The event ID assigned to the audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails; nothing is stored then.
    pub fn persist_transition(&self, result: &TransitionResult) -> Result<i64, PersistenceError> {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        let event_id: i64 = conn.transaction::<_, PersistenceError, _>(|conn| {
            mutations::save_ledger(conn, result.new_state.case_ref, &result.new_state.avkorting)?;
            mutations::persist_audit_event(conn, &result.audit_event)
        })?;

        info!(
            case_ref = %result.new_state.case_ref,
            event_id,
            action = %result.audit_event.action.name,
            "Persisted transition"
        );
        Ok(event_id)
    }

    /// Retrieves the audit timeline of a case, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the events cannot be read.
    pub fn audit_timeline(
        &self,
        case_ref: CaseRef,
    ) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        queries::audit_events_for_case(&mut conn, case_ref)
    }

    /// Loads the ledger of a case, failing if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::LedgerNotFound` if the case has no ledger.
    pub fn require(&self, case_ref: CaseRef) -> Result<Avkorting, PersistenceError> {
        self.load(case_ref)?
            .ok_or_else(|| PersistenceError::LedgerNotFound(case_ref.to_string()))
    }
}

impl AvkortingRepository for Persistence {
    fn load(&self, case_ref: CaseRef) -> Result<Option<Avkorting>, PersistenceError> {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        queries::load_ledger(&mut conn, case_ref)
    }

    fn save(&self, case_ref: CaseRef, avkorting: &Avkorting) -> Result<(), PersistenceError> {
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        mutations::save_ledger(&mut conn, case_ref, avkorting)
    }
}

impl LedgerLookup for Persistence {
    type Error = PersistenceError;

    fn ledger_for_case(&self, case_ref: CaseRef) -> Result<Option<Avkorting>, Self::Error> {
        self.load(case_ref)
    }
}
