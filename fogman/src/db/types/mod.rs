// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Column-level database types and wrappers.
//!
//! This internal module defines helper types used in Diesel models
//! for representing non-standard Rust values in SQLite:
//!
//! - [`EpochMillis`]: Unix epoch milliseconds in SQLite `BIGINT`
//!   columns
//!
//! These are *not* domain types like [`ElementInstance`] or
//! [`StraceDiagnostics`]. For those, see the per-entity modules.
//!
//! All types here are re-exported at the `crate::db` level, so users
//! can write `use crate::db::EpochMillis` without referring to
//! implementation details.
//!
//! [`ElementInstance`]: crate::db::ElementInstance
//! [`StraceDiagnostics`]: crate::db::StraceDiagnostics

mod epoch_millis;

pub use self::epoch_millis::EpochMillis;
