// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `users` — User lookups by identifier and username
//! - `lotteries` — Lottery lookups and status-filtered listings
//! - `ballots` — Ballot listings, counts, and the uniform random draw
//!
//! All queries use Diesel DSL against `SQLite` and are dispatched through
//! the `Persistence` adapter in `lib.rs`.

pub mod ballots;
pub mod lotteries;
pub mod users;
