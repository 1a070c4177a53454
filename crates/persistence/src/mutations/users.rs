// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User mutations.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::SqliteConnection;
use lottery_domain::User;
use tracing::info;

use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Inserts a registered user.
///
/// The username column carries a uniqueness constraint, so a duplicate
/// username is rejected here even if the caller's pre-check raced with a
/// concurrent registration.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user` - The user to insert, with a generator-issued identifier
///
/// # Errors
///
/// Returns `DuplicateUsername` if the username is already taken, or another
/// error if the insert fails.
pub fn insert_user(conn: &mut SqliteConnection, user: &User) -> Result<(), PersistenceError> {
    info!(
        "Inserting user ID: {} with username: {}",
        user.user_id, user.username
    );

    let result: Result<usize, diesel::result::Error> = diesel::insert_into(users::table)
        .values((
            users::user_id.eq(user.user_id),
            users::username.eq(&user.username),
            users::first_name.eq(&user.first_name),
            users::last_name.eq(&user.last_name),
        ))
        .execute(conn);

    match result {
        Ok(_) => Ok(()),
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(PersistenceError::DuplicateUsername(user.username.clone()))
        }
        Err(e) => Err(PersistenceError::from(e)),
    }
}
