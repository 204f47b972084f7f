// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! NetworkPairing records the two network element instances created
//! to bridge an element's traffic through a satellite. Removing the
//! pairing's element removes both network instances, see
//! [`crate::db::ElementInstance::delete_network_element`].

use diesel::prelude::*;

#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    Insertable,
    Identifiable,
    Queryable,
    Selectable,
)]
#[diesel(table_name = crate::db::network_pairing)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(id))]
pub struct NetworkPairing {
    pub id: i64,
    pub element_id1: String,
    pub element_id2: Option<String>,
    pub network_element_id1: String,
    pub network_element_id2: String,
    pub is_public_port: bool,
}

impl NetworkPairing {
    pub fn insert_record(
        conn: &mut SqliteConnection,
        pairing: &NetworkPairing,
    ) -> QueryResult<NetworkPairing> {
        diesel::insert_into(crate::db::network_pairing::table)
            .values(pairing)
            .returning(crate::db::network_pairing::all_columns)
            .get_result(conn)
    }
}
