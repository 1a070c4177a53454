// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs bridging database rows and domain types.
//!
//! Timestamps are stored as `TEXT` in the service-wide layout, statuses as
//! their string form, and winners in their sentinel-encoded form. Decoding
//! surfaces any stored value that no longer satisfies the domain rules as a
//! `CorruptRecord` error instead of letting it flow through the service.

use diesel::prelude::*;
use lottery_domain::{
    Ballot, Lottery, LotteryStatus, User, Winner, format_timestamp, parse_timestamp,
};
use std::str::FromStr;
use time::PrimitiveDateTime;

use crate::diesel_schema::{ballots, lotteries, users};
use crate::error::PersistenceError;

/// Renders a timestamp for storage.
pub(crate) fn encode_timestamp(value: PrimitiveDateTime) -> Result<String, PersistenceError> {
    format_timestamp(value).map_err(|e| PersistenceError::CorruptRecord(e.to_string()))
}

/// Parses a stored timestamp.
pub(crate) fn decode_timestamp(value: &str) -> Result<PrimitiveDateTime, PersistenceError> {
    parse_timestamp(value).map_err(|e| PersistenceError::CorruptRecord(e.to_string()))
}

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

/// Diesel Queryable struct for lottery rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = lotteries)]
pub(crate) struct LotteryRow {
    pub(crate) lottery_id: i64,
    pub(crate) name: String,
    pub(crate) prize_money: i64,
    pub(crate) status: String,
    pub(crate) winner_ballot_id: Option<i64>,
    pub(crate) start_date: String,
    pub(crate) end_date: Option<String>,
}

impl LotteryRow {
    /// Converts this row into its domain representation.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` if the stored status is unknown, a timestamp
    /// does not parse, or the winner and end date disagree with the status.
    pub(crate) fn into_domain(self) -> Result<Lottery, PersistenceError> {
        let status: LotteryStatus = LotteryStatus::from_str(&self.status)
            .map_err(|e| PersistenceError::CorruptRecord(e.to_string()))?;
        let start_date: PrimitiveDateTime = decode_timestamp(&self.start_date)?;
        let end_date: Option<PrimitiveDateTime> =
            self.end_date.as_deref().map(decode_timestamp).transpose()?;
        let winner: Option<Winner> = self.winner_ballot_id.map(Winner::from_stored);

        let lottery = Lottery {
            lottery_id: self.lottery_id,
            name: self.name,
            prize_money: self.prize_money,
            status,
            winner,
            start_date,
            end_date,
        };
        lottery
            .validate_closure_fields()
            .map_err(|e| PersistenceError::CorruptRecord(e.to_string()))?;
        Ok(lottery)
    }
}

/// Diesel Queryable struct for ballot rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = ballots)]
pub(crate) struct BallotRow {
    pub(crate) ballot_id: i64,
    pub(crate) lottery_id: i64,
    pub(crate) user_id: i64,
    pub(crate) created_date: String,
}

impl BallotRow {
    /// Converts this row into its domain representation.
    ///
    /// # Errors
    ///
    /// Returns `CorruptRecord` if the stored creation timestamp does not
    /// parse.
    pub(crate) fn into_domain(self) -> Result<Ballot, PersistenceError> {
        let created_date: PrimitiveDateTime = decode_timestamp(&self.created_date)?;
        Ok(Ballot {
            ballot_id: self.ballot_id,
            lottery_id: self.lottery_id,
            user_id: self.user_id,
            created_date,
        })
    }
}
