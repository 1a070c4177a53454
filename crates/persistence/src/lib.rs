// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the lottery drawing service.
//!
//! This crate stores users, lotteries, ballots, and the named counters that
//! back the identifier generator. It is built on Diesel over `SQLite`.
//!
//! ## Storage Layout
//!
//! - `counters` — One row per named counter; rows are created lazily by the
//!   first increment
//! - `users` — Registered users, with a unique username constraint
//! - `lotteries` — Drawings with status, winner, and closing timestamp
//! - `ballots` — Append-only entries referencing a user and a lottery
//!
//! Identifiers for users, lotteries, and ballots are issued by the counter
//! increment, never by the database, so inserts always carry explicit
//! primary keys.
//!
//! ## Concurrency
//!
//! Two operations are deliberately single-statement so concurrent callers
//! serialize in the database rather than in application code:
//!
//! - The counter increment (`INSERT .. ON CONFLICT .. RETURNING`) issues
//!   each value exactly once
//! - The lottery close (`UPDATE .. WHERE status = 'OPEN'`) lets exactly one
//!   closer move a lottery out of `OPEN`
//!
//! ## Testing
//!
//! Tests run against shared-cache in-memory databases. Each instance gets a
//! unique name from an atomic counter, so tests are isolated without
//! time-based naming collisions.

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

use diesel::SqliteConnection;
use lottery_domain::{Ballot, Lottery, LotteryStatus, User, Winner};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::PrimitiveDateTime;

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based collisions.
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;

/// Persistence adapter for the lottery drawing service.
///
/// Owns a single `SQLite` connection. Callers that need shared access wrap
/// the adapter in their own synchronization; the adapter itself takes
/// `&mut self` on every operation.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // Create a unique shared in-memory database name per call so tests are isolated.
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;

        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;

        // WAL mode for better read concurrency on file-based databases
        backend::enable_wal_mode(&mut conn)?;

        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// This is a startup-time check required to ensure referential
    /// integrity constraints are enforced.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Identifier Generation
    // ========================================================================

    /// Issues the next identifier from a named counter.
    ///
    /// The increment and the read happen in one database statement, so
    /// every issued identifier is unique even under concurrent callers. A
    /// counter that has never been used starts at 1.
    ///
    /// # Arguments
    ///
    /// * `counter_name` - The counter to advance
    ///
    /// # Errors
    ///
    /// Returns an error if the counter cannot be advanced.
    pub fn next_identifier(&mut self, counter_name: &str) -> Result<i64, PersistenceError> {
        mutations::counters::next_value(&mut self.conn, counter_name)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Inserts a registered user.
    ///
    /// # Arguments
    ///
    /// * `user` - The user to insert, with a generator-issued identifier
    ///
    /// # Errors
    ///
    /// Returns `DuplicateUsername` if the username is already taken, or
    /// another error if the insert fails.
    pub fn insert_user(&mut self, user: &User) -> Result<(), PersistenceError> {
        mutations::users::insert_user(&mut self.conn, user)
    }

    /// Retrieves a user by identifier.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    /// Returns `Ok(None)` if the user is not found.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    /// Retrieves a user by username.
    ///
    /// # Arguments
    ///
    /// * `username` - The username to search for
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    /// Returns `Ok(None)` if no user has this username.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_username(&mut self.conn, username)
    }

    // ========================================================================
    // Lotteries
    // ========================================================================

    /// Inserts a lottery.
    ///
    /// # Arguments
    ///
    /// * `lottery` - The lottery to insert, with a generator-issued identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_lottery(&mut self, lottery: &Lottery) -> Result<(), PersistenceError> {
        mutations::lotteries::insert_lottery(&mut self.conn, lottery)
    }

    /// Retrieves a lottery by identifier.
    ///
    /// # Arguments
    ///
    /// * `lottery_id` - The lottery identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the stored row is
    /// corrupt.
    /// Returns `Ok(None)` if the lottery is not found.
    pub fn get_lottery(&mut self, lottery_id: i64) -> Result<Option<Lottery>, PersistenceError> {
        queries::lotteries::get_lottery(&mut self.conn, lottery_id)
    }

    /// Lists lotteries, optionally restricted to one status.
    ///
    /// # Arguments
    ///
    /// * `status` - Restrict the listing to this status, or `None` for all
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a stored row is
    /// corrupt.
    pub fn list_lotteries(
        &mut self,
        status: Option<LotteryStatus>,
    ) -> Result<Vec<Lottery>, PersistenceError> {
        queries::lotteries::list_lotteries(&mut self.conn, status)
    }

    /// Closes a lottery if it is still open.
    ///
    /// The status check and the update are one conditional statement, so
    /// exactly one of any number of racing closers wins.
    ///
    /// # Arguments
    ///
    /// * `lottery_id` - The lottery to close
    /// * `winner` - The drawing outcome to record
    /// * `end_date` - When the lottery closed
    ///
    /// # Returns
    ///
    /// `true` if this call closed the lottery, `false` if it was not open.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn close_lottery(
        &mut self,
        lottery_id: i64,
        winner: Winner,
        end_date: PrimitiveDateTime,
    ) -> Result<bool, PersistenceError> {
        mutations::lotteries::close_lottery(&mut self.conn, lottery_id, winner, end_date)
    }

    // ========================================================================
    // Ballots
    // ========================================================================

    /// Inserts a ballot.
    ///
    /// # Arguments
    ///
    /// * `ballot` - The ballot to insert, with a generator-issued identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails or a referenced user or lottery
    /// does not exist.
    pub fn insert_ballot(&mut self, ballot: &Ballot) -> Result<(), PersistenceError> {
        mutations::ballots::insert_ballot(&mut self.conn, ballot)
    }

    /// Counts the ballots submitted to a lottery.
    ///
    /// # Arguments
    ///
    /// * `lottery_id` - The lottery identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_ballots(&mut self, lottery_id: i64) -> Result<i64, PersistenceError> {
        queries::ballots::count_ballots(&mut self.conn, lottery_id)
    }

    /// Draws one ballot from a lottery uniformly at random.
    ///
    /// # Arguments
    ///
    /// * `lottery_id` - The lottery identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    /// Returns `Ok(None)` if the lottery has no ballots.
    pub fn random_ballot(&mut self, lottery_id: i64) -> Result<Option<Ballot>, PersistenceError> {
        queries::ballots::random_ballot(&mut self.conn, lottery_id)
    }

    /// Lists ballots, optionally restricted by submitting user and lottery.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Restrict to ballots submitted by this user
    /// * `lottery_id` - Restrict to ballots submitted to this lottery
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_ballots(
        &mut self,
        user_id: Option<i64>,
        lottery_id: Option<i64>,
    ) -> Result<Vec<Ballot>, PersistenceError> {
        queries::ballots::list_ballots(&mut self.conn, user_id, lottery_id)
    }
}
