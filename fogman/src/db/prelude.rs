// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Commonly used database types and helpers.
//!
//! This module exposes domain-level types and column wrappers, but
//! **not** Diesel schema definitions like `element_instance::dsl::*`.
//! Schema elements are intentionally excluded to avoid polluting the
//! namespace with common column names like `id`, `name`, `uuid`.
//! Instead, import schema elements explicitly where needed.
pub use super::{
    ActiveElementInstance, DataTrack, Element, ElementFogType, ElementInstance,
    ElementInstanceChanges, ElementInstanceDetails, ElementInstanceProperties, ElementSummary,
    EpochMillis, ExtraTrackElement, Fog, FogType, IntraTrackElement, NetworkPairing,
    OtherTrackElement, StraceDiagnostics, StraceState,
};
