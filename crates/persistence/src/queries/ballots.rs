// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ballot queries.
//!
//! Includes the uniform random draw used by the winner selection step. The
//! draw delegates to the database's own random ordering so every ballot in a
//! lottery has equal probability of being chosen, without loading the full
//! ballot set into memory.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lottery_domain::Ballot;
use tracing::debug;

use crate::data_models::BallotRow;
use crate::diesel_schema::ballots;
use crate::error::PersistenceError;

/// Counts the ballots submitted to a lottery.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lottery_id` - The lottery identifier
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_ballots(
    conn: &mut SqliteConnection,
    lottery_id: i64,
) -> Result<i64, PersistenceError> {
    debug!("Counting ballots for lottery ID: {}", lottery_id);

    ballots::table
        .filter(ballots::lottery_id.eq(lottery_id))
        .count()
        .get_result(conn)
        .map_err(PersistenceError::from)
}

/// Draws one ballot from a lottery uniformly at random.
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
/// Returns `Ok(None)` if the lottery has no ballots.
pub fn random_ballot(
    conn: &mut SqliteConnection,
    lottery_id: i64,
) -> Result<Option<Ballot>, PersistenceError> {
    debug!("Drawing a random ballot for lottery ID: {}", lottery_id);

    // NOTE: RANDOM() is raw SQL (justified - Diesel has no random-order DSL)
    let result: Result<BallotRow, diesel::result::Error> = ballots::table
        .filter(ballots::lottery_id.eq(lottery_id))
        .order(diesel::dsl::sql::<diesel::sql_types::BigInt>("RANDOM()"))
        .select(BallotRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_domain()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists ballots, optionally restricted by submitting user and lottery.
///
/// Both filters are independent: either, both, or neither may be present.
/// Results are ordered by ballot identifier.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - Restrict to ballots submitted by this user
/// * `lottery_id` - Restrict to ballots submitted to this lottery
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row cannot be
/// converted to its domain representation.
pub fn list_ballots(
    conn: &mut SqliteConnection,
    user_id: Option<i64>,
    lottery_id: Option<i64>,
) -> Result<Vec<Ballot>, PersistenceError> {
    debug!(
        "Listing ballots with user filter: {:?}, lottery filter: {:?}",
        user_id, lottery_id
    );

    let mut query = ballots::table
        .select(BallotRow::as_select())
        .order(ballots::ballot_id.asc())
        .into_boxed();

    if let Some(user_id) = user_id {
        query = query.filter(ballots::user_id.eq(user_id));
    }
    if let Some(lottery_id) = lottery_id {
        query = query.filter(ballots::lottery_id.eq(lottery_id));
    }

    let rows: Vec<BallotRow> = query.load(conn)?;
    rows.into_iter().map(BallotRow::into_domain).collect()
}
