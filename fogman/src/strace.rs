// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Strace diagnostics service.
//!
//! Request handlers used by the fog-facing and user-facing APIs to
//! toggle strace for an element instance and to move its buffered
//! output. Each handler takes the connection explicitly and maps
//! store failures into [`FogmanError`].

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    db::{StraceDiagnostics, StraceState},
    errors::FogmanError,
};

/// Enables or disables strace for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStraceRequest {
    /// The fog the instance runs on. Strace needs an agent to run it.
    pub fog_uuid: Option<String>,
    pub instance_uuid: String,
    pub strace: bool,
}

/// Trace output reported by a fog, keyed by element instance uuid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushBufferRequest {
    pub strace_data: BTreeMap<String, String>,
}

pub fn switch_strace_for_element(
    conn: &mut SqliteConnection,
    request: &SwitchStraceRequest,
) -> Result<StraceDiagnostics, FogmanError> {
    if request.fog_uuid.is_none() {
        return Err(FogmanError::StraceWithoutFog);
    }

    let row = StraceDiagnostics::update_or_create(conn, &request.instance_uuid, request.strace)?;
    info!(
        "Strace {} for element instance {}",
        if row.strace_run { "enabled" } else { "disabled" },
        row.element_instance_uuid
    );
    Ok(row)
}

/// Appends every chunk in the request to its instance's buffer and
/// returns how many were stored.
///
/// A chunk that cannot be stored, or whose instance has no strace row,
/// is logged and skipped; the remaining chunks are still appended.
pub fn push_buffer_for_elements(
    conn: &mut SqliteConnection,
    request: &PushBufferRequest,
) -> Result<usize, FogmanError> {
    let mut appended = 0;
    for (instance_uuid, chunk) in &request.strace_data {
        match StraceDiagnostics::push_buffer_by_element_id(conn, instance_uuid, chunk) {
            Ok(0) => warn!("Dropping strace output for {instance_uuid}: not in strace list"),
            Ok(_) => {
                debug!("Appended {} bytes of strace output for {instance_uuid}", chunk.len());
                appended += 1;
            }
            Err(e) => warn!("Failed to append strace output for {instance_uuid}: {e}"),
        }
    }
    Ok(appended)
}

/// Drains the buffered output of one instance.
pub fn pop_buffer_by_element_id(
    conn: &mut SqliteConnection,
    instance_uuid: &str,
) -> Result<String, FogmanError> {
    StraceDiagnostics::find_and_pop_buffer_by_element_id(conn, instance_uuid)?
        .map(|row| row.buffer)
        .ok_or_else(|| FogmanError::NotInStraceList(instance_uuid.to_string()))
}

/// Strace toggles of every instance on a fog.
pub fn get_strace_values_for_fog(
    conn: &mut SqliteConnection,
    fog_uuid: &str,
) -> Result<Vec<StraceState>, FogmanError> {
    Ok(StraceDiagnostics::find_state_by_fog_id(conn, fog_uuid)?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use diesel::prelude::*;

    use super::*;
    use crate::db::{
        ElementInstance, strace_diagnostics,
        test_fixtures::{instance, seed_element, seed_fog, setup_test_db},
    };

    fn setup() -> SqliteConnection {
        let mut conn = setup_test_db();
        seed_element(&mut conn, 1, "sensor", "acme");
        seed_fog(&mut conn, "fog-a");
        for uuid in ["e1", "e2"] {
            ElementInstance::insert_record(&mut conn, &instance(uuid, 1, 0, Some("fog-a")))
                .unwrap();
        }
        conn
    }

    fn switch(uuid: &str, strace: bool) -> SwitchStraceRequest {
        SwitchStraceRequest {
            fog_uuid: Some("fog-a".to_string()),
            instance_uuid: uuid.to_string(),
            strace,
        }
    }

    #[test]
    fn test_switch_without_fog_leaves_store_untouched() {
        let mut conn = setup();
        let request = SwitchStraceRequest {
            fog_uuid: None,
            instance_uuid: "e1".to_string(),
            strace: true,
        };

        let err = switch_strace_for_element(&mut conn, &request).unwrap_err();
        assert_matches!(err, FogmanError::StraceWithoutFog);
        assert_eq!(err.to_string(), "Can't run strace for element without fog");

        let rows: i64 = strace_diagnostics::table.count().get_result(&mut conn).unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_switch_toggles_state() {
        let mut conn = setup();
        let on = switch_strace_for_element(&mut conn, &switch("e1", true)).unwrap();
        assert!(on.strace_run);
        let off = switch_strace_for_element(&mut conn, &switch("e1", false)).unwrap();
        assert!(!off.strace_run);
        assert_eq!(on.id, off.id);
    }

    #[test]
    fn test_switch_unknown_instance_is_database_error() {
        let mut conn = setup();
        let result = switch_strace_for_element(&mut conn, &switch("ghost", true));
        assert_matches!(result, Err(FogmanError::DatabaseError(_)));
    }

    #[test]
    fn test_push_skips_elements_not_in_list() {
        let mut conn = setup();
        switch_strace_for_element(&mut conn, &switch("e1", true)).unwrap();

        let request = PushBufferRequest {
            strace_data: BTreeMap::from([
                ("e1".to_string(), "execve(...)\n".to_string()),
                ("e2".to_string(), "ignored".to_string()),
                ("ghost".to_string(), "ignored".to_string()),
            ]),
        };
        assert_eq!(push_buffer_for_elements(&mut conn, &request).unwrap(), 1);
        assert_eq!(pop_buffer_by_element_id(&mut conn, "e1").unwrap(), "execve(...)\n");
    }

    #[test]
    fn test_push_empty_request() {
        let mut conn = setup();
        let request = PushBufferRequest::default();
        assert_eq!(push_buffer_for_elements(&mut conn, &request).unwrap(), 0);
    }

    #[test]
    fn test_pop_returns_accumulated_buffer_and_empties_it() {
        let mut conn = setup();
        switch_strace_for_element(&mut conn, &switch("e1", true)).unwrap();

        for chunk in ["one\n", "two\n"] {
            let request = PushBufferRequest {
                strace_data: BTreeMap::from([("e1".to_string(), chunk.to_string())]),
            };
            push_buffer_for_elements(&mut conn, &request).unwrap();
        }

        assert_eq!(pop_buffer_by_element_id(&mut conn, "e1").unwrap(), "one\ntwo\n");
        assert_eq!(pop_buffer_by_element_id(&mut conn, "e1").unwrap(), "");
    }

    #[test]
    fn test_pop_not_in_strace_list() {
        let mut conn = setup();
        let result = pop_buffer_by_element_id(&mut conn, "e2");
        assert_matches!(result, Err(FogmanError::NotInStraceList(uuid)) if uuid == "e2");
    }

    #[test]
    fn test_get_strace_values_for_fog() {
        let mut conn = setup();
        assert!(get_strace_values_for_fog(&mut conn, "fog-a").unwrap().is_empty());

        switch_strace_for_element(&mut conn, &switch("e2", true)).unwrap();
        let values = get_strace_values_for_fog(&mut conn, "fog-a").unwrap();
        assert_eq!(
            values,
            vec![StraceState {
                element_instance_uuid: "e2".to_string(),
                strace_run: true,
            }]
        );
    }
}
