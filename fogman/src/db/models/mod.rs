// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Diesel model definitions for fogman.
//!
//! This module defines domain-level types that correspond to rows in
//! the database, plus the read-only projections returned by the join
//! queries. Row types implement Diesel traits like `Queryable`,
//! `Insertable`, and `Identifiable`; projections implement
//! `Queryable` or `QueryableByName` only.
//!
//! Each entity has its own submodule. The element instance and
//! strace diagnostics modules also carry the query surface for their
//! tables as associated functions taking an explicit
//! `&mut SqliteConnection`.
//!
//! # Parent tables
//!
//! `Element`, `DataTrack`, `Fog`, `FogType`, `ElementFogType` and
//! `NetworkPairing` are owned by other parts of the fleet controller.
//! They are modelled here so element instance joins type-check and so
//! tests can seed them; only insertion, element lookup and fog deletion
//! are provided.
//!
//! # Design Notes: No `Default` for Model Types
//!
//! The row types do **not** implement `Default` in production code.
//! They represent persisted data with required fields, and a zeroed
//! placeholder risks violating check constraints (an empty uuid, an
//! invalid JSON config). We *do* implement `Default` under
//! `#[cfg(test)]` to reduce boilerplate in unit tests.

mod element;
mod element_instance;
mod fog;
mod network_pairing;
mod strace_diagnostics;

pub use element::*;
pub use element_instance::*;
pub use fog::*;
pub use network_pairing::*;
pub use strace_diagnostics::*;
