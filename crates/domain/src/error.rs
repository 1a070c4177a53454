// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::LotteryStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Lottery status string is not a recognized status.
    InvalidStatus(String),
    /// Username is empty or invalid.
    InvalidUsername(String),
    /// User name field is empty or invalid.
    InvalidName(String),
    /// Lottery name is empty or invalid.
    InvalidLotteryName(String),
    /// Prize money is outside the acceptable range.
    InvalidPrizeMoney {
        /// The rejected amount.
        amount: i64,
    },
    /// The lottery has closed and admits no further submissions.
    LotteryClosed {
        /// The closed lottery.
        lottery_id: i64,
    },
    /// The lottery is still open, so no result is available.
    LotteryNotClosed {
        /// The open lottery.
        lottery_id: i64,
    },
    /// Winner and end date fields disagree with the lottery status.
    ClosureFieldsMismatch {
        /// The inconsistent lottery.
        lottery_id: i64,
        /// The status the fields disagree with.
        status: LotteryStatus,
    },
    /// Failed to parse a timestamp from a string.
    DateParseError {
        /// The invalid timestamp string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to render a timestamp as a string.
    DateFormatError {
        /// The formatting error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(msg) => write!(f, "Invalid lottery status: {msg}"),
            Self::InvalidUsername(msg) => write!(f, "Invalid username: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidLotteryName(msg) => write!(f, "Invalid lottery name: {msg}"),
            Self::InvalidPrizeMoney { amount } => {
                write!(f, "Invalid prize money: {amount}. Must not be negative")
            }
            Self::LotteryClosed { lottery_id } => {
                write!(f, "Lottery {lottery_id} is closed")
            }
            Self::LotteryNotClosed { lottery_id } => {
                write!(f, "Lottery {lottery_id} has not closed yet")
            }
            Self::ClosureFieldsMismatch { lottery_id, status } => {
                write!(
                    f,
                    "Lottery {lottery_id} has winner and end date fields inconsistent with status {status}"
                )
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse timestamp '{date_string}': {error}")
            }
            Self::DateFormatError { error } => {
                write!(f, "Failed to render timestamp: {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
