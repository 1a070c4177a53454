// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::PrimitiveDateTime;

/// Represents the lifecycle state of a lottery.
///
/// A lottery is created `Open` and moves to `Closed` exactly once, when its
/// winner is drawn. The transition never reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LotteryStatus {
    /// Accepting ballot submissions.
    #[default]
    Open,
    /// Drawn and finalized. No further submissions are admitted.
    Closed,
}

impl FromStr for LotteryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for LotteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl LotteryStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// The only valid transition is `Open` → `Closed`.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Open, Self::Closed))
    }

    /// Returns whether ballot submissions are admitted in this status.
    #[must_use]
    pub const fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Outcome of a lottery drawing.
///
/// A closed lottery always carries a winner value: either the ballot that
/// won the draw, or the explicit marker that nobody participated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    /// The lottery closed with zero ballots submitted.
    NoParticipants,
    /// The ballot that won the draw.
    Ballot(i64),
}

impl Winner {
    /// Stored marker for a drawing with no participants.
    ///
    /// Generator-issued ballot identifiers start at 1, so this value can
    /// never collide with a real ballot.
    pub const NO_PARTICIPANTS_SENTINEL: i64 = -1;

    /// Encodes this winner for storage.
    #[must_use]
    pub const fn to_stored(self) -> i64 {
        match self {
            Self::NoParticipants => Self::NO_PARTICIPANTS_SENTINEL,
            Self::Ballot(ballot_id) => ballot_id,
        }
    }

    /// Decodes a winner from its stored representation.
    #[must_use]
    pub const fn from_stored(value: i64) -> Self {
        if value == Self::NO_PARTICIPANTS_SENTINEL {
            Self::NoParticipants
        } else {
            Self::Ballot(value)
        }
    }

    /// Returns the winning ballot identifier, if any ballot won.
    #[must_use]
    pub const fn ballot_id(self) -> Option<i64> {
        match self {
            Self::NoParticipants => None,
            Self::Ballot(ballot_id) => Some(ballot_id),
        }
    }
}

/// Represents a registered user.
///
/// `user_id` is issued by the identifier generator before first save and is
/// the canonical identifier. Usernames are unique across the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Generator-issued identifier.
    pub user_id: i64,
    /// Unique login name.
    pub username: String,
    /// The user's first name (informational).
    pub first_name: String,
    /// The user's last name (informational).
    pub last_name: String,
}

impl User {
    /// Counter name for user identifiers.
    pub const ID_SEQUENCE: &'static str = "USER_ID_SEQUENCE";

    /// Creates a new `User`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The generator-issued identifier
    /// * `username` - The unique login name
    /// * `first_name` - The user's first name
    /// * `last_name` - The user's last name
    #[must_use]
    pub const fn new(
        user_id: i64,
        username: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        Self {
            user_id,
            username,
            first_name,
            last_name,
        }
    }
}

/// Represents a single lottery entry.
///
/// A ballot ties a user to a lottery that was open at submission time.
/// Ballots are never updated or deleted once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Generator-issued identifier.
    pub ballot_id: i64,
    /// The lottery this ballot was submitted to.
    pub lottery_id: i64,
    /// The user who submitted this ballot.
    pub user_id: i64,
    /// When the ballot was recorded.
    pub created_date: PrimitiveDateTime,
}

impl Ballot {
    /// Counter name for ballot identifiers.
    pub const ID_SEQUENCE: &'static str = "BALLOT_ID_SEQUENCE";

    /// Creates a new `Ballot`.
    ///
    /// # Arguments
    ///
    /// * `ballot_id` - The generator-issued identifier
    /// * `lottery_id` - The lottery this ballot enters
    /// * `user_id` - The submitting user
    /// * `created_date` - When the ballot was recorded
    #[must_use]
    pub const fn new(
        ballot_id: i64,
        lottery_id: i64,
        user_id: i64,
        created_date: PrimitiveDateTime,
    ) -> Self {
        Self {
            ballot_id,
            lottery_id,
            user_id,
            created_date,
        }
    }
}

/// Represents a lottery drawing.
///
/// `winner` and `end_date` are set together when the lottery closes and are
/// absent exactly while the lottery is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lottery {
    /// Generator-issued identifier.
    pub lottery_id: i64,
    /// Human-readable lottery name.
    pub name: String,
    /// Prize pool for this drawing.
    pub prize_money: i64,
    /// Current lifecycle status.
    pub status: LotteryStatus,
    /// Drawing outcome. Present exactly when the lottery has closed.
    pub winner: Option<Winner>,
    /// When the lottery opened.
    pub start_date: PrimitiveDateTime,
    /// When the lottery closed. Present exactly when the lottery has closed.
    pub end_date: Option<PrimitiveDateTime>,
}

impl Lottery {
    /// Counter name for lottery identifiers.
    pub const ID_SEQUENCE: &'static str = "LOTTERY_ID_SEQUENCE";

    /// Creates a new open lottery with no winner and no end date.
    ///
    /// # Arguments
    ///
    /// * `lottery_id` - The generator-issued identifier
    /// * `name` - The lottery name
    /// * `prize_money` - The prize pool
    /// * `start_date` - When the lottery opens
    #[must_use]
    pub const fn open(
        lottery_id: i64,
        name: String,
        prize_money: i64,
        start_date: PrimitiveDateTime,
    ) -> Self {
        Self {
            lottery_id,
            name,
            prize_money,
            status: LotteryStatus::Open,
            winner: None,
            start_date,
            end_date: None,
        }
    }

    /// Checks that this lottery admits ballot submissions.
    ///
    /// This is the admission gate consulted on every submission. It works
    /// on the freshest persisted status, so the caller must re-read the
    /// lottery rather than reuse a stale copy.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::LotteryClosed` if the lottery has closed.
    pub const fn ensure_accepts_submissions(&self) -> Result<(), DomainError> {
        if self.status.accepts_submissions() {
            Ok(())
        } else {
            Err(DomainError::LotteryClosed {
                lottery_id: self.lottery_id,
            })
        }
    }

    /// Checks that this lottery has closed and its result is available.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::LotteryNotClosed` while the lottery is open.
    pub const fn ensure_result_available(&self) -> Result<(), DomainError> {
        match self.status {
            LotteryStatus::Closed => Ok(()),
            LotteryStatus::Open => Err(DomainError::LotteryNotClosed {
                lottery_id: self.lottery_id,
            }),
        }
    }

    /// Validates that the winner and end date agree with the status.
    ///
    /// # Invariant
    ///
    /// `winner` and `end_date` are both present when `status` is `Closed`
    /// and both absent when `status` is `Open`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ClosureFieldsMismatch` if the fields disagree
    /// with the status.
    pub fn validate_closure_fields(&self) -> Result<(), DomainError> {
        let consistent: bool = match self.status {
            LotteryStatus::Open => self.winner.is_none() && self.end_date.is_none(),
            LotteryStatus::Closed => self.winner.is_some() && self.end_date.is_some(),
        };
        if consistent {
            Ok(())
        } else {
            Err(DomainError::ClosureFieldsMismatch {
                lottery_id: self.lottery_id,
                status: self.status,
            })
        }
    }
}
