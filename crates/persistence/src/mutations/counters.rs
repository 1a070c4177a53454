// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Named counter mutations backing the identifier generator.

use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use tracing::debug;

use crate::diesel_schema::counters;
use crate::error::PersistenceError;

/// Increments a named counter and returns the incremented value.
///
/// The increment and the read are a single statement, so two callers can
/// never observe the same value for the same counter. A counter that does
/// not exist yet is created by the same statement, and its first returned
/// value is 1.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `name` - The counter name
///
/// # Errors
///
/// Returns an error if the database statement fails.
pub fn next_value(conn: &mut SqliteConnection, name: &str) -> Result<i64, PersistenceError> {
    let value: i64 = diesel::insert_into(counters::table)
        .values((counters::name.eq(name), counters::value.eq(1_i64)))
        .on_conflict(counters::name)
        .do_update()
        .set(counters::value.eq(counters::value + excluded(counters::value)))
        .returning(counters::value)
        .get_result(conn)?;

    debug!("Counter {} advanced to {}", name, value);

    Ok(value)
}
