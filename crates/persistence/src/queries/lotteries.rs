// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lottery queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lottery_domain::{Lottery, LotteryStatus};
use tracing::debug;

use crate::data_models::LotteryRow;
use crate::diesel_schema::lotteries;
use crate::error::PersistenceError;

/// Retrieves a lottery by identifier.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lottery_id` - The lottery identifier
///
/// # Errors
///
/// Returns an error if the database query fails or the stored row cannot be
/// converted to its domain representation.
/// Returns `Ok(None)` if the lottery is not found.
pub fn get_lottery(
    conn: &mut SqliteConnection,
    lottery_id: i64,
) -> Result<Option<Lottery>, PersistenceError> {
    debug!("Looking up lottery by ID: {}", lottery_id);

    let result: Result<LotteryRow, diesel::result::Error> = lotteries::table
        .filter(lotteries::lottery_id.eq(lottery_id))
        .select(LotteryRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_domain()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists lotteries, optionally restricted to one status.
///
/// Results are ordered by lottery identifier so listings are stable across
/// calls.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `status` - Restrict the listing to this status, or `None` for all
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row cannot be
/// converted to its domain representation.
pub fn list_lotteries(
    conn: &mut SqliteConnection,
    status: Option<LotteryStatus>,
) -> Result<Vec<Lottery>, PersistenceError> {
    debug!("Listing lotteries with status filter: {:?}", status);

    let mut query = lotteries::table
        .select(LotteryRow::as_select())
        .order(lotteries::lottery_id.asc())
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(lotteries::status.eq(status.as_str()));
    }

    let rows: Vec<LotteryRow> = query.load(conn)?;
    rows.into_iter().map(LotteryRow::into_domain).collect()
}
