// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lottery mutations.
//!
//! Closing is expressed as a single conditional update on the stored status.
//! That update is the serialization point for the whole close path: however
//! many closers race, the database lets exactly one of them move the row
//! from `OPEN` to `CLOSED`.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lottery_domain::{Lottery, LotteryStatus, Winner};
use time::PrimitiveDateTime;
use tracing::info;

use crate::data_models::encode_timestamp;
use crate::diesel_schema::lotteries;
use crate::error::PersistenceError;

/// Inserts a lottery.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lottery` - The lottery to insert, with a generator-issued identifier
///
/// # Errors
///
/// Returns an error if the insert fails or a timestamp cannot be rendered
/// for storage.
pub fn insert_lottery(
    conn: &mut SqliteConnection,
    lottery: &Lottery,
) -> Result<(), PersistenceError> {
    info!(
        "Inserting lottery ID: {} with name: {}",
        lottery.lottery_id, lottery.name
    );

    let start_date: String = encode_timestamp(lottery.start_date)?;
    let end_date: Option<String> = lottery.end_date.map(encode_timestamp).transpose()?;

    diesel::insert_into(lotteries::table)
        .values((
            lotteries::lottery_id.eq(lottery.lottery_id),
            lotteries::name.eq(&lottery.name),
            lotteries::prize_money.eq(lottery.prize_money),
            lotteries::status.eq(lottery.status.as_str()),
            lotteries::winner_ballot_id.eq(lottery.winner.map(Winner::to_stored)),
            lotteries::start_date.eq(start_date),
            lotteries::end_date.eq(end_date),
        ))
        .execute(conn)?;

    Ok(())
}

/// Closes a lottery if it is still open.
///
/// Records the winner and end date and moves the status to `CLOSED` in one
/// conditional update. A lottery that has already closed is left untouched,
/// which makes repeated close attempts harmless.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lottery_id` - The lottery to close
/// * `winner` - The drawing outcome to record
/// * `end_date` - When the lottery closed
///
/// # Returns
///
/// `true` if this call closed the lottery, `false` if it was not open (it
/// does not exist or another closer got there first).
///
/// # Errors
///
/// Returns an error if the update fails or the end date cannot be rendered
/// for storage.
pub fn close_lottery(
    conn: &mut SqliteConnection,
    lottery_id: i64,
    winner: Winner,
    end_date: PrimitiveDateTime,
) -> Result<bool, PersistenceError> {
    let end_date: String = encode_timestamp(end_date)?;

    let updated: usize = diesel::update(
        lotteries::table
            .filter(lotteries::lottery_id.eq(lottery_id))
            .filter(lotteries::status.eq(LotteryStatus::Open.as_str())),
    )
    .set((
        lotteries::status.eq(LotteryStatus::Closed.as_str()),
        lotteries::winner_ballot_id.eq(Some(winner.to_stored())),
        lotteries::end_date.eq(Some(end_date)),
    ))
    .execute(conn)?;

    if updated == 1 {
        info!(
            "Closed lottery ID: {} with winner: {:?}",
            lottery_id, winner
        );
        Ok(true)
    } else {
        info!("Lottery ID: {} was not open, nothing to close", lottery_id);
        Ok(false)
    }
}
