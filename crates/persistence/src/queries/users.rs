// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lottery_domain::User;
use tracing::debug;

use crate::data_models::UserRow;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Retrieves a user by identifier.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The user identifier
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    debug!("Looking up user by ID: {}", user_id);

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(User::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a user by username.
///
/// Usernames are unique, so at most one row can match.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The username to search for
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has this username.
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, PersistenceError> {
    debug!("Looking up user by username: {}", username);

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::username.eq(username))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(User::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
