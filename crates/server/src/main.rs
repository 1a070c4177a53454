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
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use lottery_api::{
    ApiError, BallotDetails, CreateLotteryRequest, CreateLotteryResponse, LotteryDetails,
    LotteryResultResponse, RegisterUserRequest, RegisterUserResponse, SubmitBallotRequest,
    SubmitBallotResponse, create_lottery, list_ballots, list_lotteries, lottery_result,
    register_user, run_closing_cycle, submit_ballot,
};
use lottery_domain::{Clock, SystemClock, format_timestamp};
use lottery_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{error, info};

/// Lottery Server - HTTP server for the lottery drawing service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Seconds between closing cycles
    #[arg(long, default_value_t = 86_400)]
    closing_interval_secs: u64,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access, and the clock that stamps ballots, lotteries,
/// and closing cycles.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for users, lotteries, and ballots.
    persistence: Arc<Mutex<Persistence>>,
    /// The time source for handlers and the closing task.
    clock: Arc<dyn Clock>,
}

/// API request for registering a user.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegisterUserApiRequest {
    /// The unique login name.
    username: String,
    /// The user's first name.
    first_name: String,
    /// The user's last name.
    last_name: String,
}

/// API response for a successful user registration.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct RegisterUserApiResponse {
    /// A success message carrying the new user's identifier.
    message: String,
    /// The new user's identifier.
    user_id: i64,
}

/// API request for opening a lottery.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateLotteryApiRequest {
    /// The lottery name.
    name: String,
    /// The prize pool.
    prize_money: i64,
    /// Optional opening timestamp in `yyyy-MM-ddTHH:mm:ss` layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
}

/// API response for a successful lottery creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateLotteryApiResponse {
    /// A success message carrying the new lottery's identifier.
    message: String,
    /// The new lottery's identifier.
    lottery_id: i64,
}

/// API request for submitting a ballot.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SubmitBallotApiRequest {
    /// The submitting user.
    user_id: i64,
    /// The lottery the ballot enters.
    lottery_id: i64,
}

/// API response for a successful ballot submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SubmitBallotApiResponse {
    /// A success message carrying the new ballot's identifier.
    message: String,
    /// The new ballot's identifier.
    ballot_id: i64,
}

/// One lottery in a listing response.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct LotteryApiResponse {
    /// The lottery identifier.
    lottery_id: i64,
    /// The lottery name.
    name: String,
    /// The prize pool.
    prize_money: i64,
    /// The lifecycle status, `OPEN` or `CLOSED`.
    status: String,
    /// The stored winner value; `-1` marks a drawing nobody entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    winner_ballot_id: Option<i64>,
    /// When the lottery opened.
    start_date: String,
    /// When the lottery closed. Omitted while the lottery is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
}

/// One ballot in a listing response.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct BallotApiResponse {
    /// The ballot identifier.
    ballot_id: i64,
    /// The lottery the ballot was submitted to.
    lottery_id: i64,
    /// The user who submitted the ballot.
    user_id: i64,
    /// When the ballot was recorded.
    created_date: String,
}

/// API response for a closed lottery's result.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct LotteryResultApiResponse {
    /// The winning ballot. Omitted when nobody won.
    #[serde(skip_serializing_if = "Option::is_none")]
    winner_ballot_id: Option<i64>,
    /// The no-winner message. Omitted when a ballot won.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// When the lottery closed.
    end_date: String,
    /// The prize pool.
    prize_money: i64,
}

/// Query parameters for listing lotteries.
#[derive(Debug, Deserialize)]
struct ListLotteriesQuery {
    /// Restrict the listing to this status, `OPEN` or `CLOSED`.
    status: Option<String>,
}

/// Query parameters for the lottery result endpoint.
#[derive(Debug, Deserialize)]
struct LotteryResultQuery {
    /// The lottery to report on.
    #[serde(rename = "lotteryId")]
    lottery_id: i64,
}

/// Query parameters for listing ballots.
#[derive(Debug, Deserialize)]
struct ListBallotsQuery {
    /// Restrict to ballots submitted by this user.
    #[serde(rename = "userId")]
    user_id: Option<i64>,
    /// Restrict to ballots submitted to this lottery.
    #[serde(rename = "lotteryId")]
    lottery_id: Option<i64>,
}

/// Error response body.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ErrorResponse {
    /// When the error was produced.
    timestamp: String,
    /// A human-readable description of the failure.
    error_message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let timestamp: String = format_timestamp(SystemClock.now()).unwrap_or_default();
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            timestamp,
            error_message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidState { .. }
            | ApiError::AlreadyExists { .. }
            | ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::Storage { .. } => {
                error!(error = %err, "Storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Converts a `LotteryDetails` to a `LotteryApiResponse`.
fn lottery_to_response(details: LotteryDetails) -> LotteryApiResponse {
    LotteryApiResponse {
        lottery_id: details.lottery_id,
        name: details.name,
        prize_money: details.prize_money,
        status: details.status,
        winner_ballot_id: details.winner_ballot_id,
        start_date: details.start_date,
        end_date: details.end_date,
    }
}

/// Converts a `BallotDetails` to a `BallotApiResponse`.
fn ballot_to_response(details: BallotDetails) -> BallotApiResponse {
    BallotApiResponse {
        ballot_id: details.ballot_id,
        lottery_id: details.lottery_id,
        user_id: details.user_id,
        created_date: details.created_date,
    }
}

/// Handler for POST `/register` endpoint.
///
/// Registers a new user.
async fn handle_register_user(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterUserApiRequest>,
) -> Result<Json<RegisterUserApiResponse>, HttpError> {
    info!(username = %req.username, "Handling register request");

    let request: RegisterUserRequest = RegisterUserRequest {
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterUserResponse = register_user(&mut persistence, request)?;
    drop(persistence);

    Ok(Json(RegisterUserApiResponse {
        message: format!(
            "User registered successfully with userID:{}",
            response.user_id
        ),
        user_id: response.user_id,
    }))
}

/// Handler for POST `/lottery` endpoint.
///
/// Opens a new lottery.
async fn handle_create_lottery(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateLotteryApiRequest>,
) -> Result<Json<CreateLotteryApiResponse>, HttpError> {
    info!(name = %req.name, prize_money = req.prize_money, "Handling create_lottery request");

    let request: CreateLotteryRequest = CreateLotteryRequest {
        name: req.name,
        prize_money: req.prize_money,
        start_date: req.start_date,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateLotteryResponse =
        create_lottery(&mut persistence, app_state.clock.as_ref(), request)?;
    drop(persistence);

    Ok(Json(CreateLotteryApiResponse {
        message: format!("Lottery created with lotteryId:{}", response.lottery_id),
        lottery_id: response.lottery_id,
    }))
}

/// Handler for POST `/ballot` endpoint.
///
/// Submits a ballot to a lottery.
async fn handle_submit_ballot(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<SubmitBallotApiRequest>,
) -> Result<Json<SubmitBallotApiResponse>, HttpError> {
    info!(
        user_id = req.user_id,
        lottery_id = req.lottery_id,
        "Handling submit_ballot request"
    );

    let request: SubmitBallotRequest = SubmitBallotRequest {
        user_id: req.user_id,
        lottery_id: req.lottery_id,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: SubmitBallotResponse =
        submit_ballot(&mut persistence, app_state.clock.as_ref(), request)?;
    drop(persistence);

    Ok(Json(SubmitBallotApiResponse {
        message: format!("Ballot created with id:{}", response.ballot_id),
        ballot_id: response.ballot_id,
    }))
}

/// Handler for GET `/lotteries` endpoint.
///
/// Lists lotteries, optionally restricted to one status.
async fn handle_list_lotteries(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListLotteriesQuery>,
) -> Result<Json<Vec<LotteryApiResponse>>, HttpError> {
    info!(status = ?query.status, "Handling list_lotteries request");

    let mut persistence = app_state.persistence.lock().await;
    let lotteries: Vec<LotteryDetails> = list_lotteries(&mut persistence, query.status)?;
    drop(persistence);

    Ok(Json(lotteries.into_iter().map(lottery_to_response).collect()))
}

/// Handler for GET `/lotteryResult` endpoint.
///
/// Returns the result of a closed lottery.
async fn handle_lottery_result(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<LotteryResultQuery>,
) -> Result<Json<LotteryResultApiResponse>, HttpError> {
    info!(lottery_id = query.lottery_id, "Handling lottery_result request");

    let mut persistence = app_state.persistence.lock().await;
    let result: LotteryResultResponse = lottery_result(&mut persistence, query.lottery_id)?;
    drop(persistence);

    Ok(Json(LotteryResultApiResponse {
        winner_ballot_id: result.winner_ballot_id,
        message: result.message,
        end_date: result.end_date,
        prize_money: result.prize_money,
    }))
}

/// Handler for GET `/ballots` endpoint.
///
/// Lists ballots, optionally restricted by submitting user and lottery.
async fn handle_list_ballots(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListBallotsQuery>,
) -> Result<Json<Vec<BallotApiResponse>>, HttpError> {
    info!(
        user_id = ?query.user_id,
        lottery_id = ?query.lottery_id,
        "Handling list_ballots request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let ballots: Vec<BallotDetails> =
        list_ballots(&mut persistence, query.user_id, query.lottery_id)?;
    drop(persistence);

    Ok(Json(ballots.into_iter().map(ballot_to_response).collect()))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/register", post(handle_register_user))
        .route("/lottery", post(handle_create_lottery))
        .route("/ballot", post(handle_submit_ballot))
        .route("/lotteries", get(handle_list_lotteries))
        .route("/lotteryResult", get(handle_lottery_result))
        .route("/ballots", get(handle_list_ballots))
        .with_state(app_state)
}

/// Runs closing cycles on a fixed cadence until shutdown is signalled.
///
/// Each firing drives the same cycle tests invoke directly; the cadence is
/// configuration, not drawing logic.
async fn run_closing_task(
    app_state: AppState,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker: tokio::time::Interval =
        tokio::time::interval(Duration::from_secs(interval_secs));
    // The first tick completes immediately; swallow it so the first cycle
    // fires one full interval after startup
    ticker.tick().await;

    while !*shutdown.borrow() {
        tokio::select! {
            _ = ticker.tick() => {
                let mut persistence = app_state.persistence.lock().await;
                match run_closing_cycle(&mut persistence, app_state.clock.as_ref()) {
                    Ok(outcome) => info!(
                        closed = outcome.closed.len(),
                        failed = outcome.failed.len(),
                        "Closing cycle finished"
                    ),
                    Err(err) => error!(error = %err, "Closing cycle failed"),
                }
                drop(persistence);
            }

            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("Closing task received shutdown signal");
                    break;
                }
            }
        }
    }

    info!("Closing task stopped");
}

/// Resolves when the process is interrupted, signalling the closing task to
/// stop on the way out.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Lottery Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        clock: Arc::new(SystemClock),
    };

    // Spawn the periodic closing task with a shutdown handle
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let closing_task: tokio::task::JoinHandle<()> = tokio::spawn(run_closing_task(
        app_state.clone(),
        args.closing_interval_secs,
        shutdown_rx,
    ));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server until interrupted, then stop the closing task
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;
    closing_task.await?;

    Ok(())
}
