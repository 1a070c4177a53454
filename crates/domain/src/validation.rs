// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Validates the fields of a user registration.
///
/// This function checks that required fields are not empty or blank.
/// It does NOT check username uniqueness (that requires storage context).
///
/// # Arguments
///
/// * `username` - The login name to validate
/// * `first_name` - The first name to validate
/// * `last_name` - The last name to validate
///
/// # Returns
///
/// * `Ok(())` if all fields are valid
/// * `Err(DomainError)` if any field is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The username is empty or whitespace
/// - The first name is empty or whitespace
/// - The last name is empty or whitespace
pub fn validate_user_fields(
    username: &str,
    first_name: &str,
    last_name: &str,
) -> Result<(), DomainError> {
    // Rule: username must not be blank
    if username.trim().is_empty() {
        return Err(DomainError::InvalidUsername(String::from(
            "Username cannot be empty",
        )));
    }

    // Rule: first name must not be blank
    if first_name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "First name cannot be empty",
        )));
    }

    // Rule: last name must not be blank
    if last_name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Last name cannot be empty",
        )));
    }

    Ok(())
}

/// Validates the fields of a new lottery.
///
/// # Arguments
///
/// * `name` - The lottery name to validate
/// * `prize_money` - The prize pool to validate
///
/// # Returns
///
/// * `Ok(())` if the fields are valid
/// * `Err(DomainError)` if any field is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The lottery name is empty or whitespace
/// - The prize money is negative
pub fn validate_lottery_fields(name: &str, prize_money: i64) -> Result<(), DomainError> {
    // Rule: lottery name must not be blank
    if name.trim().is_empty() {
        return Err(DomainError::InvalidLotteryName(String::from(
            "Lottery name cannot be empty",
        )));
    }

    // Rule: prize money must not be negative
    if prize_money < 0 {
        return Err(DomainError::InvalidPrizeMoney {
            amount: prize_money,
        });
    }

    Ok(())
}
