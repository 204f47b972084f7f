// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use diesel::prelude::*;

/// A registered fog node (remote IoT gateway/agent).
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
#[diesel(table_name = crate::db::iofogs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(uuid))]
pub struct Fog {
    pub uuid: String,
    pub name: String,
    pub iofog_type_id: Option<i64>,
}

impl Fog {
    pub fn insert_record(conn: &mut SqliteConnection, fog: &Fog) -> QueryResult<Fog> {
        diesel::insert_into(crate::db::iofogs::table)
            .values(fog)
            .returning(crate::db::iofogs::all_columns)
            .get_result(conn)
    }

    /// Deletes a fog node. Its element instances, and their strace
    /// rows, go with it through `ON DELETE CASCADE`.
    pub fn delete_record(conn: &mut SqliteConnection, delete_uuid: &str) -> QueryResult<bool> {
        use crate::db::iofogs::dsl::*;
        let num_deleted = diesel::delete(iofogs.filter(uuid.eq(delete_uuid))).execute(conn)?;
        Ok(num_deleted > 0)
    }
}

/// A fog hardware/platform type (e.g. x86, ARM).
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
#[diesel(table_name = crate::db::iofog_type)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(id))]
pub struct FogType {
    pub id: i64,
    pub name: String,
}

impl FogType {
    pub fn insert_record(conn: &mut SqliteConnection, fog_type: &FogType) -> QueryResult<FogType> {
        diesel::insert_into(crate::db::iofog_type::table)
            .values(fog_type)
            .returning(crate::db::iofog_type::all_columns)
            .get_result(conn)
    }
}
