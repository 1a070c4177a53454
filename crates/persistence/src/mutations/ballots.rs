// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ballot mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lottery_domain::Ballot;
use tracing::info;

use crate::data_models::encode_timestamp;
use crate::diesel_schema::ballots;
use crate::error::PersistenceError;

/// Inserts a ballot.
///
/// Ballots are append-only: there is no update or delete counterpart. The
/// foreign keys on `lottery_id` and `user_id` reject a ballot that refers
/// to a lottery or user that was never stored.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `ballot` - The ballot to insert, with a generator-issued identifier
///
/// # Errors
///
/// Returns an error if the insert fails or the creation timestamp cannot be
/// rendered for storage.
pub fn insert_ballot(conn: &mut SqliteConnection, ballot: &Ballot) -> Result<(), PersistenceError> {
    info!(
        "Inserting ballot ID: {} for lottery ID: {} from user ID: {}",
        ballot.ballot_id, ballot.lottery_id, ballot.user_id
    );

    let created_date: String = encode_timestamp(ballot.created_date)?;

    diesel::insert_into(ballots::table)
        .values((
            ballots::ballot_id.eq(ballot.ballot_id),
            ballots::lottery_id.eq(ballot.lottery_id),
            ballots::user_id.eq(ballot.user_id),
            ballots::created_date.eq(created_date),
        ))
        .execute(conn)?;

    Ok(())
}
