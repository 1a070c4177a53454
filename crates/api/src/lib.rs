// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the lottery drawing service.
//!
//! Every operation takes the persistence adapter and, where the current time
//! matters, a [`Clock`]. Domain and persistence errors never cross this
//! boundary raw; they are translated into [`ApiError`] so callers see one
//! error contract.
//!
//! The closing cycle lives here as well: [`run_closing_cycle`] is the
//! synchronous entry point the scheduler fires on its cadence, and tests
//! invoke directly.

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
#![allow(clippy::multiple_crate_versions)]

use lottery_domain::{
    Ballot, Clock, DomainError, Lottery, LotteryStatus, User, Winner, format_timestamp,
    parse_timestamp, validate_lottery_fields, validate_user_fields,
};
use lottery_persistence::{Persistence, PersistenceError};
use time::PrimitiveDateTime;
use tracing::{error, info};

/// API request to register a new user.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    /// The unique login name.
    pub username: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
}

/// API response for a successful user registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserResponse {
    /// The generator-issued identifier of the new user.
    pub user_id: i64,
}

/// API request to open a new lottery.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLotteryRequest {
    /// The lottery name.
    pub name: String,
    /// The prize pool.
    pub prize_money: i64,
    /// Optional opening timestamp in `yyyy-MM-ddTHH:mm:ss` layout.
    /// The current time is used when absent.
    pub start_date: Option<String>,
}

/// API response for a successful lottery creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLotteryResponse {
    /// The generator-issued identifier of the new lottery.
    pub lottery_id: i64,
}

/// API request to submit a ballot to a lottery.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBallotRequest {
    /// The submitting user.
    pub user_id: i64,
    /// The lottery the ballot enters.
    pub lottery_id: i64,
}

/// API response for a successful ballot submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBallotResponse {
    /// The generator-issued identifier of the new ballot.
    pub ballot_id: i64,
}

/// API response for a closed lottery's result.
///
/// Exactly one of `winner_ballot_id` and `message` is present: the winning
/// ballot when somebody won, or the no-winner message when nobody entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryResultResponse {
    /// The winning ballot, if any ballot won the draw.
    pub winner_ballot_id: Option<i64>,
    /// Present when no ballot won the draw.
    pub message: Option<String>,
    /// When the lottery closed, in `yyyy-MM-ddTHH:mm:ss` layout.
    pub end_date: String,
    /// The prize pool, reported whether or not anybody won.
    pub prize_money: i64,
}

/// One lottery in a listing.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryDetails {
    /// The lottery identifier.
    pub lottery_id: i64,
    /// The lottery name.
    pub name: String,
    /// The prize pool.
    pub prize_money: i64,
    /// The lifecycle status, `OPEN` or `CLOSED`.
    pub status: String,
    /// The stored winner value; `-1` marks a drawing nobody entered.
    /// Absent while the lottery is open.
    pub winner_ballot_id: Option<i64>,
    /// When the lottery opened, in `yyyy-MM-ddTHH:mm:ss` layout.
    pub start_date: String,
    /// When the lottery closed. Absent while the lottery is open.
    pub end_date: Option<String>,
}

/// One ballot in a listing.
///
/// This DTO is distinct from domain types and represents the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotDetails {
    /// The ballot identifier.
    pub ballot_id: i64,
    /// The lottery the ballot was submitted to.
    pub lottery_id: i64,
    /// The user who submitted the ballot.
    pub user_id: i64,
    /// When the ballot was recorded, in `yyyy-MM-ddTHH:mm:ss` layout.
    pub created_date: String,
}

/// One lottery closed by a closing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedLottery {
    /// The lottery that closed.
    pub lottery_id: i64,
    /// The drawing outcome recorded for it.
    pub winner: Winner,
}

/// Outcome of one closing cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClosingCycleOutcome {
    /// Lotteries this cycle closed, in processing order.
    pub closed: Vec<ClosedLottery>,
    /// Lotteries that failed to close and remain open for the next cycle.
    pub failed: Vec<i64>,
}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract. `NotFound`, `InvalidState`, and `AlreadyExists` describe
/// outcomes the caller must change the request to avoid; `Storage` failures
/// are transient and the same request may be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A requested entity does not exist.
    NotFound {
        /// A human-readable description of what was missing.
        message: String,
    },
    /// The operation is not valid for the lottery's current lifecycle state.
    InvalidState {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A uniqueness rule was violated.
    AlreadyExists {
        /// A human-readable description of the collision.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The storage layer failed. The request itself may be sound and can be
    /// retried; the underlying mutations are atomic.
    Storage {
        /// A human-readable description of the failure.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { message }
            | Self::InvalidState { message }
            | Self::AlreadyExists { message } => write!(f, "{message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Storage { message } => write!(f, "Storage failure: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            // The insert itself is the uniqueness check of record; this arm
            // catches the loser of two concurrent registrations.
            PersistenceError::DuplicateUsername(_) => Self::AlreadyExists {
                message: String::from("Username already exists!"),
            },
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidStatus(msg) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown lottery status '{msg}'"),
        },
        DomainError::InvalidUsername(msg) => ApiError::InvalidInput {
            field: String::from("username"),
            message: msg,
        },
        DomainError::InvalidName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidLotteryName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidPrizeMoney { amount } => ApiError::InvalidInput {
            field: String::from("prize_money"),
            message: format!("Prize money {amount} must not be negative"),
        },
        DomainError::LotteryClosed { .. } => ApiError::InvalidState {
            message: String::from("Lottery is Closed"),
        },
        DomainError::LotteryNotClosed { .. } => ApiError::InvalidState {
            message: String::from("Lottery is not closed yet!"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("start_date"),
            message: format!("Failed to parse timestamp '{date_string}': {error}"),
        },
        DomainError::DateFormatError { error } => ApiError::Storage {
            message: format!("Failed to render timestamp: {error}"),
        },
        DomainError::ClosureFieldsMismatch { lottery_id, status } => ApiError::Storage {
            message: format!(
                "Lottery {lottery_id} has winner and end date fields inconsistent with status {status}"
            ),
        },
    }
}

/// Registers a new user.
///
/// This function:
/// - Validates the request fields
/// - Rejects a username that is already taken
/// - Issues the user identifier from `USER_ID_SEQUENCE`
/// - Stores the user
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `request` - The API request to register a user
///
/// # Returns
///
/// * `Ok(RegisterUserResponse)` carrying the new user's identifier
/// * `Err(ApiError)` if the request is invalid or the username is taken
///
/// # Errors
///
/// Returns an error if:
/// - Any field is blank
/// - The username already belongs to a registered user
/// - The storage layer fails
pub fn register_user(
    persistence: &mut Persistence,
    request: RegisterUserRequest,
) -> Result<RegisterUserResponse, ApiError> {
    // Validate before any storage mutation
    validate_user_fields(&request.username, &request.first_name, &request.last_name)
        .map_err(translate_domain_error)?;

    // Reject a taken username before burning an identifier
    if persistence.get_user_by_username(&request.username)?.is_some() {
        return Err(ApiError::AlreadyExists {
            message: String::from("Username already exists!"),
        });
    }

    let user_id: i64 = persistence.next_identifier(User::ID_SEQUENCE)?;
    let user: User = User::new(
        user_id,
        request.username,
        request.first_name,
        request.last_name,
    );
    persistence.insert_user(&user)?;

    info!(user_id, username = %user.username, "Registered user");

    Ok(RegisterUserResponse { user_id })
}

/// Opens a new lottery.
///
/// This function:
/// - Validates the request fields
/// - Parses the opening timestamp, or takes the current time when absent
/// - Issues the lottery identifier from `LOTTERY_ID_SEQUENCE`
/// - Stores the lottery as `OPEN` with no winner and no end date
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `clock` - The time source for a request without an opening timestamp
/// * `request` - The API request to open a lottery
///
/// # Returns
///
/// * `Ok(CreateLotteryResponse)` carrying the new lottery's identifier
/// * `Err(ApiError)` if the request is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The name is blank or the prize money is negative
/// - The opening timestamp does not parse
/// - The storage layer fails
pub fn create_lottery(
    persistence: &mut Persistence,
    clock: &dyn Clock,
    request: CreateLotteryRequest,
) -> Result<CreateLotteryResponse, ApiError> {
    // Validate before any storage mutation
    validate_lottery_fields(&request.name, request.prize_money).map_err(translate_domain_error)?;

    let start_date: PrimitiveDateTime = match request.start_date {
        Some(raw) => parse_timestamp(&raw).map_err(translate_domain_error)?,
        None => clock.now(),
    };

    let lottery_id: i64 = persistence.next_identifier(Lottery::ID_SEQUENCE)?;
    let lottery: Lottery = Lottery::open(lottery_id, request.name, request.prize_money, start_date);
    persistence.insert_lottery(&lottery)?;

    info!(lottery_id, name = %lottery.name, "Opened lottery");

    Ok(CreateLotteryResponse { lottery_id })
}

/// Submits a ballot to a lottery.
///
/// This function:
/// - Checks the submitting user exists
/// - Checks the lottery exists
/// - Checks the lottery still admits submissions, against the freshest
///   persisted status
/// - Issues the ballot identifier from `BALLOT_ID_SEQUENCE`
/// - Stores the ballot stamped with the current time
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `clock` - The time source for the submission timestamp
/// * `request` - The API request to submit a ballot
///
/// # Returns
///
/// * `Ok(SubmitBallotResponse)` carrying the new ballot's identifier
/// * `Err(ApiError)` if the user or lottery is missing or the lottery closed
///
/// # Errors
///
/// Returns an error if:
/// - The submitting user does not exist
/// - The lottery does not exist
/// - The lottery has closed
/// - The storage layer fails
pub fn submit_ballot(
    persistence: &mut Persistence,
    clock: &dyn Clock,
    request: SubmitBallotRequest,
) -> Result<SubmitBallotResponse, ApiError> {
    // The submitting user is checked before the lottery
    if persistence.get_user(request.user_id)?.is_none() {
        return Err(ApiError::NotFound {
            message: String::from("User Not found"),
        });
    }

    let lottery: Lottery =
        persistence
            .get_lottery(request.lottery_id)?
            .ok_or_else(|| ApiError::NotFound {
                message: String::from("Lottery Not found"),
            })?;

    // Admission gate: the status was read from storage on this call, not
    // reused from an earlier one
    lottery
        .ensure_accepts_submissions()
        .map_err(translate_domain_error)?;

    let ballot_id: i64 = persistence.next_identifier(Ballot::ID_SEQUENCE)?;
    let ballot: Ballot = Ballot::new(ballot_id, request.lottery_id, request.user_id, clock.now());
    persistence.insert_ballot(&ballot)?;

    info!(
        ballot_id,
        lottery_id = request.lottery_id,
        user_id = request.user_id,
        "Recorded ballot"
    );

    Ok(SubmitBallotResponse { ballot_id })
}

/// Fetches the result of a closed lottery.
///
/// This function:
/// - Checks the lottery exists
/// - Checks the lottery has closed
/// - Reports either the winning ballot or the no-winner message, with the
///   closing time and the prize pool in both cases
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `lottery_id` - The lottery to report on
///
/// # Returns
///
/// * `Ok(LotteryResultResponse)` with the drawing outcome
/// * `Err(ApiError)` if the lottery is missing or still open
///
/// # Errors
///
/// Returns an error if:
/// - The lottery does not exist
/// - The lottery is still open
/// - The storage layer fails
pub fn lottery_result(
    persistence: &mut Persistence,
    lottery_id: i64,
) -> Result<LotteryResultResponse, ApiError> {
    let lottery: Lottery =
        persistence
            .get_lottery(lottery_id)?
            .ok_or_else(|| ApiError::NotFound {
                message: String::from("Lottery not found"),
            })?;

    lottery
        .ensure_result_available()
        .map_err(translate_domain_error)?;

    // A closed row always carries both fields; the decode layer rejects rows
    // that do not
    let (winner, end_date): (Winner, PrimitiveDateTime) = match (lottery.winner, lottery.end_date)
    {
        (Some(winner), Some(end_date)) => (winner, end_date),
        _ => {
            return Err(ApiError::Storage {
                message: format!("Lottery {lottery_id} is closed but has no recorded outcome"),
            });
        }
    };

    let end_date: String = format_timestamp(end_date).map_err(translate_domain_error)?;

    let response: LotteryResultResponse = match winner {
        Winner::NoParticipants => LotteryResultResponse {
            winner_ballot_id: None,
            message: Some(String::from("Nobody won!")),
            end_date,
            prize_money: lottery.prize_money,
        },
        Winner::Ballot(ballot_id) => LotteryResultResponse {
            winner_ballot_id: Some(ballot_id),
            message: None,
            end_date,
            prize_money: lottery.prize_money,
        },
    };

    Ok(response)
}

/// Lists lotteries, optionally restricted to one status.
///
/// This function:
/// - Parses the optional status filter (`OPEN` or `CLOSED`)
/// - Lists matching lotteries, or every lottery when no filter is given
/// - Reports an empty listing as `NotFound`
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `status` - Restrict the listing to this status, or `None` for all
///
/// # Returns
///
/// * `Ok(Vec<LotteryDetails>)` with at least one lottery
/// * `Err(ApiError)` if the filter is invalid or nothing matched
///
/// # Errors
///
/// Returns an error if:
/// - The status filter is not a recognized status
/// - No lottery matched
/// - The storage layer fails
pub fn list_lotteries(
    persistence: &mut Persistence,
    status: Option<String>,
) -> Result<Vec<LotteryDetails>, ApiError> {
    let status_filter: Option<LotteryStatus> = match status {
        Some(raw) => Some(raw.parse::<LotteryStatus>().map_err(translate_domain_error)?),
        None => None,
    };

    let lotteries: Vec<Lottery> = persistence.list_lotteries(status_filter)?;
    if lotteries.is_empty() {
        return Err(ApiError::NotFound {
            message: String::from("Lotteries not found"),
        });
    }

    lotteries.iter().map(lottery_details).collect()
}

/// Lists ballots, optionally restricted by submitting user and lottery.
///
/// This function:
/// - Lists ballots matching the given filters; no filter lists everything
/// - Reports an empty listing as `NotFound`
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `user_id` - Restrict to ballots submitted by this user
/// * `lottery_id` - Restrict to ballots submitted to this lottery
///
/// # Returns
///
/// * `Ok(Vec<BallotDetails>)` with at least one ballot
/// * `Err(ApiError)` if nothing matched
///
/// # Errors
///
/// Returns an error if:
/// - No ballot matched
/// - The storage layer fails
pub fn list_ballots(
    persistence: &mut Persistence,
    user_id: Option<i64>,
    lottery_id: Option<i64>,
) -> Result<Vec<BallotDetails>, ApiError> {
    let ballots: Vec<Ballot> = persistence.list_ballots(user_id, lottery_id)?;
    if ballots.is_empty() {
        return Err(ApiError::NotFound {
            message: String::from("Ballots Not Found"),
        });
    }

    ballots.iter().map(ballot_details).collect()
}

/// Draws the winner for a lottery.
///
/// Zero submitted ballots yields [`Winner::NoParticipants`]; otherwise one
/// ballot is chosen with uniform probability over the lottery's ballots.
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `lottery_id` - The lottery to draw for
///
/// # Errors
///
/// Returns an error if the storage layer fails.
pub fn select_winner(persistence: &mut Persistence, lottery_id: i64) -> Result<Winner, ApiError> {
    let ballot_count: i64 = persistence.count_ballots(lottery_id)?;
    if ballot_count == 0 {
        return Ok(Winner::NoParticipants);
    }

    match persistence.random_ballot(lottery_id)? {
        Some(ballot) => Ok(Winner::Ballot(ballot.ballot_id)),
        // Ballots are append-only, so a positive count cannot drain to zero
        None => Ok(Winner::NoParticipants),
    }
}

/// Runs one closing cycle over every open lottery.
///
/// This function:
/// - Lists the lotteries still open
/// - Logs and returns an empty outcome when nothing is due
/// - For each open lottery, draws the winner and closes it with the current
///   time; a failure on one lottery never aborts the rest
///
/// Re-running a cycle is safe: the close is conditional on the lottery still
/// being open, so a lottery closed by an earlier cycle (or a racing one)
/// keeps its recorded winner.
///
/// # Arguments
///
/// * `persistence` - The persistence adapter
/// * `clock` - The time source for closing timestamps
///
/// # Returns
///
/// The lotteries closed and the lotteries that failed this cycle.
///
/// # Errors
///
/// Returns an error if the open lotteries cannot be listed. Per-lottery
/// failures are reported in the outcome instead.
pub fn run_closing_cycle(
    persistence: &mut Persistence,
    clock: &dyn Clock,
) -> Result<ClosingCycleOutcome, ApiError> {
    let open_lotteries: Vec<Lottery> = persistence.list_lotteries(Some(LotteryStatus::Open))?;

    let mut outcome: ClosingCycleOutcome = ClosingCycleOutcome::default();

    if open_lotteries.is_empty() {
        error!("No lotteries present to close for today!");
        return Ok(outcome);
    }

    for lottery in open_lotteries {
        let lottery_id: i64 = lottery.lottery_id;
        match close_due_lottery(persistence, clock, lottery_id) {
            Ok(Some(winner)) => {
                info!("Winner for {} is {}", lottery_id, winner.to_stored());
                outcome.closed.push(ClosedLottery { lottery_id, winner });
            }
            Ok(None) => {
                // Lost the close to a racing cycle; the stored winner stands
                info!(lottery_id, "Lottery was already closed");
            }
            Err(err) => {
                error!(lottery_id, error = %err, "Failed to close lottery");
                outcome.failed.push(lottery_id);
            }
        }
    }

    Ok(outcome)
}

/// Draws a winner for one lottery and conditionally closes it.
///
/// Returns the winner when this call performed the close, `None` when the
/// lottery was no longer open.
fn close_due_lottery(
    persistence: &mut Persistence,
    clock: &dyn Clock,
    lottery_id: i64,
) -> Result<Option<Winner>, ApiError> {
    let winner: Winner = select_winner(persistence, lottery_id)?;
    let closed: bool = persistence.close_lottery(lottery_id, winner, clock.now())?;
    Ok(closed.then_some(winner))
}

fn lottery_details(lottery: &Lottery) -> Result<LotteryDetails, ApiError> {
    let start_date: String = format_timestamp(lottery.start_date).map_err(translate_domain_error)?;
    let end_date: Option<String> = match lottery.end_date {
        Some(value) => Some(format_timestamp(value).map_err(translate_domain_error)?),
        None => None,
    };

    Ok(LotteryDetails {
        lottery_id: lottery.lottery_id,
        name: lottery.name.clone(),
        prize_money: lottery.prize_money,
        status: lottery.status.to_string(),
        winner_ballot_id: lottery.winner.map(Winner::to_stored),
        start_date,
        end_date,
    })
}

fn ballot_details(ballot: &Ballot) -> Result<BallotDetails, ApiError> {
    let created_date: String =
        format_timestamp(ballot.created_date).map_err(translate_domain_error)?;

    Ok(BallotDetails {
        ballot_id: ballot.ballot_id,
        lottery_id: ballot.lottery_id,
        user_id: ballot.user_id,
        created_date,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use lottery_domain::FixedClock;
    use time::macros::datetime;

    fn create_test_persistence() -> Persistence {
        Persistence::new_in_memory().unwrap()
    }

    fn create_test_clock() -> FixedClock {
        FixedClock::new(datetime!(2026-03-01 12:00:00))
    }

    fn create_closing_clock() -> FixedClock {
        FixedClock::new(datetime!(2026-03-02 00:00:00))
    }

    fn register_test_user(persistence: &mut Persistence, username: &str) -> i64 {
        let request: RegisterUserRequest = RegisterUserRequest {
            username: String::from(username),
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
        };
        register_user(persistence, request).unwrap().user_id
    }

    fn create_test_lottery(persistence: &mut Persistence, name: &str) -> i64 {
        let clock: FixedClock = create_test_clock();
        let request: CreateLotteryRequest = CreateLotteryRequest {
            name: String::from(name),
            prize_money: 1000,
            start_date: None,
        };
        create_lottery(persistence, &clock, request).unwrap().lottery_id
    }

    fn submit_test_ballot(persistence: &mut Persistence, user_id: i64, lottery_id: i64) -> i64 {
        let clock: FixedClock = create_test_clock();
        let request: SubmitBallotRequest = SubmitBallotRequest {
            user_id,
            lottery_id,
        };
        submit_ballot(persistence, &clock, request).unwrap().ballot_id
    }

    #[test]
    fn test_register_user_issues_sequential_identifiers() {
        let mut persistence: Persistence = create_test_persistence();

        let first: i64 = register_test_user(&mut persistence, "alovelace");
        let second: i64 = register_test_user(&mut persistence, "gboole");

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_register_user_rejects_blank_username() {
        let mut persistence: Persistence = create_test_persistence();
        let request: RegisterUserRequest = RegisterUserRequest {
            username: String::from("   "),
            first_name: String::from("Ada"),
            last_name: String::from("Lovelace"),
        };

        let result: Result<RegisterUserResponse, ApiError> =
            register_user(&mut persistence, request);

        match result {
            Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "username"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_register_duplicate_username_is_rejected() {
        let mut persistence: Persistence = create_test_persistence();
        let first_id: i64 = register_test_user(&mut persistence, "alovelace");

        let request: RegisterUserRequest = RegisterUserRequest {
            username: String::from("alovelace"),
            first_name: String::from("Augusta"),
            last_name: String::from("King"),
        };
        let result: Result<RegisterUserResponse, ApiError> =
            register_user(&mut persistence, request);

        assert_eq!(
            result,
            Err(ApiError::AlreadyExists {
                message: String::from("Username already exists!"),
            })
        );

        // The original registration is untouched
        let stored = persistence.get_user(first_id).unwrap().unwrap();
        assert_eq!(stored.first_name, "Ada");
    }

    #[test]
    fn test_create_lottery_uses_clock_when_start_date_absent() {
        let mut persistence: Persistence = create_test_persistence();
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");

        let stored = persistence.get_lottery(lottery_id).unwrap().unwrap();
        assert_eq!(stored.start_date, datetime!(2026-03-01 12:00:00));
        assert_eq!(stored.status, LotteryStatus::Open);
        assert_eq!(stored.winner, None);
        assert_eq!(stored.end_date, None);
    }

    #[test]
    fn test_create_lottery_parses_explicit_start_date() {
        let mut persistence: Persistence = create_test_persistence();
        let clock: FixedClock = create_test_clock();
        let request: CreateLotteryRequest = CreateLotteryRequest {
            name: String::from("Weekly Draw"),
            prize_money: 1000,
            start_date: Some(String::from("2026-04-15T09:30:00")),
        };

        let lottery_id: i64 = create_lottery(&mut persistence, &clock, request)
            .unwrap()
            .lottery_id;

        let stored = persistence.get_lottery(lottery_id).unwrap().unwrap();
        assert_eq!(stored.start_date, datetime!(2026-04-15 09:30:00));
    }

    #[test]
    fn test_create_lottery_rejects_malformed_start_date() {
        let mut persistence: Persistence = create_test_persistence();
        let clock: FixedClock = create_test_clock();
        let request: CreateLotteryRequest = CreateLotteryRequest {
            name: String::from("Weekly Draw"),
            prize_money: 1000,
            start_date: Some(String::from("15/04/2026")),
        };

        let result: Result<CreateLotteryResponse, ApiError> =
            create_lottery(&mut persistence, &clock, request);

        match result {
            Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "start_date"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_create_lottery_rejects_negative_prize() {
        let mut persistence: Persistence = create_test_persistence();
        let clock: FixedClock = create_test_clock();
        let request: CreateLotteryRequest = CreateLotteryRequest {
            name: String::from("Weekly Draw"),
            prize_money: -5,
            start_date: None,
        };

        let result: Result<CreateLotteryResponse, ApiError> =
            create_lottery(&mut persistence, &clock, request);

        match result {
            Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "prize_money"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_ballot_records_user_lottery_and_time() {
        let mut persistence: Persistence = create_test_persistence();
        let user_id: i64 = register_test_user(&mut persistence, "alovelace");
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");

        let ballot_id: i64 = submit_test_ballot(&mut persistence, user_id, lottery_id);

        assert_eq!(ballot_id, 1);
        let ballots = persistence.list_ballots(None, None).unwrap();
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots[0].user_id, user_id);
        assert_eq!(ballots[0].lottery_id, lottery_id);
        assert_eq!(ballots[0].created_date, datetime!(2026-03-01 12:00:00));
    }

    #[test]
    fn test_submit_ballot_for_missing_user_is_rejected() {
        let mut persistence: Persistence = create_test_persistence();
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");
        let clock: FixedClock = create_test_clock();

        let request: SubmitBallotRequest = SubmitBallotRequest {
            user_id: 42,
            lottery_id,
        };
        let result: Result<SubmitBallotResponse, ApiError> =
            submit_ballot(&mut persistence, &clock, request);

        assert_eq!(
            result,
            Err(ApiError::NotFound {
                message: String::from("User Not found"),
            })
        );
    }

    #[test]
    fn test_submit_ballot_for_missing_lottery_is_rejected() {
        let mut persistence: Persistence = create_test_persistence();
        let user_id: i64 = register_test_user(&mut persistence, "alovelace");
        let clock: FixedClock = create_test_clock();

        let request: SubmitBallotRequest = SubmitBallotRequest {
            user_id,
            lottery_id: 42,
        };
        let result: Result<SubmitBallotResponse, ApiError> =
            submit_ballot(&mut persistence, &clock, request);

        assert_eq!(
            result,
            Err(ApiError::NotFound {
                message: String::from("Lottery Not found"),
            })
        );
    }

    #[test]
    fn test_submit_ballot_to_closed_lottery_is_rejected() {
        let mut persistence: Persistence = create_test_persistence();
        let user_id: i64 = register_test_user(&mut persistence, "alovelace");
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");

        let closing_clock: FixedClock = create_closing_clock();
        run_closing_cycle(&mut persistence, &closing_clock).unwrap();

        // The gate reads the persisted status, so the close is visible here
        let clock: FixedClock = create_test_clock();
        let request: SubmitBallotRequest = SubmitBallotRequest {
            user_id,
            lottery_id,
        };
        let result: Result<SubmitBallotResponse, ApiError> =
            submit_ballot(&mut persistence, &clock, request);

        assert_eq!(
            result,
            Err(ApiError::InvalidState {
                message: String::from("Lottery is Closed"),
            })
        );
    }

    #[test]
    fn test_lottery_result_for_missing_lottery_is_rejected() {
        let mut persistence: Persistence = create_test_persistence();

        let result: Result<LotteryResultResponse, ApiError> = lottery_result(&mut persistence, 42);

        assert_eq!(
            result,
            Err(ApiError::NotFound {
                message: String::from("Lottery not found"),
            })
        );
    }

    #[test]
    fn test_lottery_result_while_open_is_rejected() {
        let mut persistence: Persistence = create_test_persistence();
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");

        let result: Result<LotteryResultResponse, ApiError> =
            lottery_result(&mut persistence, lottery_id);

        assert_eq!(
            result,
            Err(ApiError::InvalidState {
                message: String::from("Lottery is not closed yet!"),
            })
        );
    }

    #[test]
    fn test_lottery_result_reports_the_winning_ballot() {
        let mut persistence: Persistence = create_test_persistence();
        let user_id: i64 = register_test_user(&mut persistence, "alovelace");
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");
        let ballot_id: i64 = submit_test_ballot(&mut persistence, user_id, lottery_id);

        let closing_clock: FixedClock = create_closing_clock();
        run_closing_cycle(&mut persistence, &closing_clock).unwrap();

        let result: LotteryResultResponse = lottery_result(&mut persistence, lottery_id).unwrap();

        assert_eq!(result.winner_ballot_id, Some(ballot_id));
        assert_eq!(result.message, None);
        assert_eq!(result.end_date, "2026-03-02T00:00:00");
        assert_eq!(result.prize_money, 1000);
    }

    #[test]
    fn test_lottery_result_with_no_participants_reports_nobody_won() {
        let mut persistence: Persistence = create_test_persistence();
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");

        let closing_clock: FixedClock = create_closing_clock();
        run_closing_cycle(&mut persistence, &closing_clock).unwrap();

        let result: LotteryResultResponse = lottery_result(&mut persistence, lottery_id).unwrap();

        assert_eq!(result.winner_ballot_id, None);
        assert_eq!(result.message, Some(String::from("Nobody won!")));
        assert_eq!(result.end_date, "2026-03-02T00:00:00");
        // The prize is reported even when nobody won
        assert_eq!(result.prize_money, 1000);
    }

    #[test]
    fn test_select_winner_with_no_ballots_reports_no_participants() {
        let mut persistence: Persistence = create_test_persistence();
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");

        let winner: Winner = select_winner(&mut persistence, lottery_id).unwrap();

        assert_eq!(winner, Winner::NoParticipants);
    }

    #[test]
    fn test_select_winner_draws_ballots_with_uniform_frequency() {
        let mut persistence: Persistence = create_test_persistence();
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");
        let mut ballot_ids: Vec<i64> = Vec::new();
        for username in ["alovelace", "gboole", "enoether"] {
            let user_id: i64 = register_test_user(&mut persistence, username);
            ballot_ids.push(submit_test_ballot(&mut persistence, user_id, lottery_id));
        }

        // A uniform draw over three ballots lands each near 200 of 600
        // trials; a count outside [120, 280] is practically impossible
        let mut counts: Vec<i64> = vec![0; ballot_ids.len()];
        for _ in 0..600 {
            match select_winner(&mut persistence, lottery_id).unwrap() {
                Winner::Ballot(ballot_id) => {
                    let index: usize = ballot_ids
                        .iter()
                        .position(|candidate| *candidate == ballot_id)
                        .unwrap();
                    counts[index] += 1;
                }
                Winner::NoParticipants => panic!("draw reported no participants"),
            }
        }
        for (ballot_id, count) in ballot_ids.iter().zip(&counts) {
            assert!(
                (120..=280).contains(count),
                "ballot {ballot_id} drawn {count} times out of 600"
            );
        }
    }

    #[test]
    fn test_closing_cycle_closes_every_open_lottery() {
        let mut persistence: Persistence = create_test_persistence();
        let user_id: i64 = register_test_user(&mut persistence, "alovelace");
        let first: i64 = create_test_lottery(&mut persistence, "First Draw");
        let second: i64 = create_test_lottery(&mut persistence, "Second Draw");
        let ballot_id: i64 = submit_test_ballot(&mut persistence, user_id, first);

        let closing_clock: FixedClock = create_closing_clock();
        let outcome: ClosingCycleOutcome =
            run_closing_cycle(&mut persistence, &closing_clock).unwrap();

        assert_eq!(
            outcome.closed,
            vec![
                ClosedLottery {
                    lottery_id: first,
                    winner: Winner::Ballot(ballot_id),
                },
                ClosedLottery {
                    lottery_id: second,
                    winner: Winner::NoParticipants,
                },
            ]
        );
        assert!(outcome.failed.is_empty());

        let open = persistence
            .list_lotteries(Some(LotteryStatus::Open))
            .unwrap();
        assert!(open.is_empty());
    }

    #[test]
    fn test_closing_cycle_with_nothing_due_closes_nothing() {
        let mut persistence: Persistence = create_test_persistence();

        let closing_clock: FixedClock = create_closing_clock();
        let outcome: ClosingCycleOutcome =
            run_closing_cycle(&mut persistence, &closing_clock).unwrap();

        assert!(outcome.closed.is_empty());
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_closing_cycle_reruns_keep_the_first_winner() {
        let mut persistence: Persistence = create_test_persistence();
        let user_id: i64 = register_test_user(&mut persistence, "alovelace");
        let lottery_id: i64 = create_test_lottery(&mut persistence, "Weekly Draw");
        submit_test_ballot(&mut persistence, user_id, lottery_id);

        let closing_clock: FixedClock = create_closing_clock();
        run_closing_cycle(&mut persistence, &closing_clock).unwrap();
        let first_result: LotteryResultResponse =
            lottery_result(&mut persistence, lottery_id).unwrap();

        // A second cycle finds nothing open and must not redraw
        let later_clock: FixedClock = FixedClock::new(datetime!(2026-03-03 00:00:00));
        let second_outcome: ClosingCycleOutcome =
            run_closing_cycle(&mut persistence, &later_clock).unwrap();
        let second_result: LotteryResultResponse =
            lottery_result(&mut persistence, lottery_id).unwrap();

        assert!(second_outcome.closed.is_empty());
        assert_eq!(first_result, second_result);
    }

    #[test]
    fn test_list_lotteries_reports_missing_when_empty() {
        let mut persistence: Persistence = create_test_persistence();

        let result: Result<Vec<LotteryDetails>, ApiError> = list_lotteries(&mut persistence, None);

        assert_eq!(
            result,
            Err(ApiError::NotFound {
                message: String::from("Lotteries not found"),
            })
        );
    }

    #[test]
    fn test_list_lotteries_rejects_unknown_status() {
        let mut persistence: Persistence = create_test_persistence();
        create_test_lottery(&mut persistence, "Weekly Draw");

        let result: Result<Vec<LotteryDetails>, ApiError> =
            list_lotteries(&mut persistence, Some(String::from("PENDING")));

        match result {
            Err(ApiError::InvalidInput { field, .. }) => assert_eq!(field, "status"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_list_lotteries_filters_by_status() {
        let mut persistence: Persistence = create_test_persistence();
        let first: i64 = create_test_lottery(&mut persistence, "First Draw");

        let closing_clock: FixedClock = create_closing_clock();
        run_closing_cycle(&mut persistence, &closing_clock).unwrap();
        let second: i64 = create_test_lottery(&mut persistence, "Second Draw");

        let open: Vec<LotteryDetails> =
            list_lotteries(&mut persistence, Some(String::from("OPEN"))).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].lottery_id, second);
        assert_eq!(open[0].status, "OPEN");
        assert_eq!(open[0].winner_ballot_id, None);
        assert_eq!(open[0].end_date, None);

        let closed: Vec<LotteryDetails> =
            list_lotteries(&mut persistence, Some(String::from("CLOSED"))).unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].lottery_id, first);
        assert_eq!(closed[0].status, "CLOSED");
        assert_eq!(closed[0].winner_ballot_id, Some(-1));
        assert_eq!(closed[0].end_date, Some(String::from("2026-03-02T00:00:00")));

        let all: Vec<LotteryDetails> = list_lotteries(&mut persistence, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].start_date, "2026-03-01T12:00:00");
    }

    #[test]
    fn test_list_ballots_reports_missing_when_empty() {
        let mut persistence: Persistence = create_test_persistence();

        let result: Result<Vec<BallotDetails>, ApiError> =
            list_ballots(&mut persistence, None, None);

        assert_eq!(
            result,
            Err(ApiError::NotFound {
                message: String::from("Ballots Not Found"),
            })
        );
    }

    #[test]
    fn test_list_ballots_supports_every_filter_combination() {
        let mut persistence: Persistence = create_test_persistence();
        let ada: i64 = register_test_user(&mut persistence, "alovelace");
        let george: i64 = register_test_user(&mut persistence, "gboole");
        let first: i64 = create_test_lottery(&mut persistence, "First Draw");
        let second: i64 = create_test_lottery(&mut persistence, "Second Draw");

        let ada_first: i64 = submit_test_ballot(&mut persistence, ada, first);
        submit_test_ballot(&mut persistence, ada, second);
        submit_test_ballot(&mut persistence, george, first);

        let by_user: Vec<BallotDetails> =
            list_ballots(&mut persistence, Some(ada), None).unwrap();
        assert_eq!(by_user.len(), 2);

        let by_lottery: Vec<BallotDetails> =
            list_ballots(&mut persistence, None, Some(first)).unwrap();
        assert_eq!(by_lottery.len(), 2);

        let by_both: Vec<BallotDetails> =
            list_ballots(&mut persistence, Some(ada), Some(first)).unwrap();
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].ballot_id, ada_first);
        assert_eq!(by_both[0].created_date, "2026-03-01T12:00:00");

        let unfiltered: Vec<BallotDetails> = list_ballots(&mut persistence, None, None).unwrap();
        assert_eq!(unfiltered.len(), 3);

        // A selective filter with no matches is still reported as missing
        let result: Result<Vec<BallotDetails>, ApiError> =
            list_ballots(&mut persistence, Some(george), Some(second));
        assert_eq!(
            result,
            Err(ApiError::NotFound {
                message: String::from("Ballots Not Found"),
            })
        );
    }
}
