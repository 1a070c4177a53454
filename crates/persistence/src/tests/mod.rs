// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]


use crate::Persistence;
use lottery_domain::{Ballot, Lottery, User};
use time::PrimitiveDateTime;
use time::macros::datetime;

/// Fixed timestamp used wherever a test needs a creation or start date.
pub fn test_timestamp() -> PrimitiveDateTime {
    datetime!(2026-03-01 12:00:00)
}

/// Fixed timestamp used wherever a test closes a lottery.
pub fn test_close_timestamp() -> PrimitiveDateTime {
    datetime!(2026-03-02 00:00:00)
}

/// Registers a user through the identifier generator and returns it.
pub fn create_test_user(persistence: &mut Persistence, username: &str) -> User {
    let user_id: i64 = persistence.next_identifier(User::ID_SEQUENCE).unwrap();
    let user: User = User::new(
        user_id,
        String::from(username),
        String::from("Ada"),
        String::from("Lovelace"),
    );
    persistence.insert_user(&user).unwrap();
    user
}

/// Creates an open lottery through the identifier generator and returns it.
pub fn create_test_lottery(persistence: &mut Persistence, name: &str) -> Lottery {
    let lottery_id: i64 = persistence.next_identifier(Lottery::ID_SEQUENCE).unwrap();
    let lottery: Lottery = Lottery::open(lottery_id, String::from(name), 1000, test_timestamp());
    persistence.insert_lottery(&lottery).unwrap();
    lottery
}

/// Submits a ballot through the identifier generator and returns it.
pub fn create_test_ballot(persistence: &mut Persistence, lottery_id: i64, user_id: i64) -> Ballot {
    let ballot_id: i64 = persistence.next_identifier(Ballot::ID_SEQUENCE).unwrap();
    let ballot: Ballot = Ballot::new(ballot_id, lottery_id, user_id, test_timestamp());
    persistence.insert_ballot(&ballot).unwrap();
    ballot
}
