// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules for the persistence layer.
//!
//! This module contains all state-changing operations for the persistence
//! layer. Identifiers are issued by the counter increment before any entity
//! insert, so every insert carries an explicit primary key.
//!
//! ## Module Organization
//!
//! - `counters` — Fused increment-and-fetch for named counters
//! - `users` — User inserts with duplicate-username rejection
//! - `lotteries` — Lottery inserts and the conditional close
//! - `ballots` — Append-only ballot inserts

pub mod ballots;
pub mod counters;
pub mod lotteries;
pub mod users;
