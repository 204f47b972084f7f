// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use diesel::prelude::*;

/// A deployable application template. Element instances reference it
/// through `element_key`.
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
#[diesel(table_name = crate::db::element)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(id))]
pub struct Element {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub container_image: String,
    pub publisher: String,
    pub picture: String,
    pub registry_id: Option<i64>,
}

impl Element {
    pub fn insert_record(conn: &mut SqliteConnection, element: &Element) -> QueryResult<Element> {
        diesel::insert_into(crate::db::element::table)
            .values(element)
            .returning(crate::db::element::all_columns)
            .get_result(conn)
    }

    pub fn find_record(conn: &mut SqliteConnection, search_id: i64) -> QueryResult<Element> {
        use crate::db::element::dsl::*;
        element.filter(id.eq(search_id)).first(conn)
    }
}

/// The subset of element columns shown next to an instance.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, Queryable, Selectable)]
#[diesel(table_name = crate::db::element)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ElementSummary {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub container_image: String,
    pub publisher: String,
}

/// A pipeline grouping of element instances.
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
#[diesel(table_name = crate::db::data_tracks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(id))]
pub struct DataTrack {
    pub id: i64,
    pub name: String,
    pub is_activated: bool,
}

impl DataTrack {
    pub fn insert_record(conn: &mut SqliteConnection, track: &DataTrack) -> QueryResult<DataTrack> {
        diesel::insert_into(crate::db::data_tracks::table)
            .values(track)
            .returning(crate::db::data_tracks::all_columns)
            .get_result(conn)
    }
}

/// Links an element template to a fog type it can run on.
#[derive(Clone, Debug, Eq, PartialEq, Insertable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Element, foreign_key = element_id))]
#[diesel(belongs_to(crate::db::FogType, foreign_key = iofog_type_id))]
#[diesel(table_name = crate::db::element_fog_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ElementFogType {
    pub id: i64,
    pub element_id: i64,
    pub iofog_type_id: i64,
}

impl ElementFogType {
    pub fn insert_record(
        conn: &mut SqliteConnection,
        element_id: i64,
        iofog_type_id: i64,
    ) -> QueryResult<()> {
        use crate::db::element_fog_types;

        diesel::insert_into(element_fog_types::table)
            .values((
                element_fog_types::element_id.eq(element_id),
                element_fog_types::iofog_type_id.eq(iofog_type_id),
            ))
            .execute(conn)?;
        Ok(())
    }
}

#[cfg(test)]
impl Default for Element {
    fn default() -> Self {
        Self {
            id: 0,
            name: "".to_owned(),
            description: "".to_owned(),
            category: "".to_owned(),
            container_image: "".to_owned(),
            publisher: "".to_owned(),
            picture: "".to_owned(),
            registry_id: None,
        }
    }
}
