// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod clock;
mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock, format_timestamp, parse_timestamp};
pub use error::DomainError;
pub use types::{Ballot, Lottery, LotteryStatus, User, Winner};
pub use validation::{validate_lottery_fields, validate_user_fields};
