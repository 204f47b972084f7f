// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Seed helpers shared by the database unit tests.

use diesel::prelude::*;

use crate::db::{
    DataTrack, Element, ElementInstance, EpochMillis, Fog, establish_database_connection,
};

pub(crate) fn setup_test_db() -> SqliteConnection {
    establish_database_connection(":memory:")
        .expect("Failed to establish in-memory SQLite connection")
}

pub(crate) fn seed_fog(conn: &mut SqliteConnection, uuid: &str) -> Fog {
    Fog::insert_record(
        conn,
        &Fog {
            uuid: uuid.to_owned(),
            name: format!("fog {uuid}"),
            iofog_type_id: None,
        },
    )
    .expect("Failed to insert fog")
}

pub(crate) fn seed_element(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    publisher: &str,
) -> Element {
    Element::insert_record(
        conn,
        &Element {
            id,
            name: name.to_owned(),
            category: "sensors".to_owned(),
            container_image: format!("registry.example.com/{name}:latest"),
            publisher: publisher.to_owned(),
            picture: "images/shared/default.png".to_owned(),
            ..Default::default()
        },
    )
    .expect("Failed to insert element")
}

pub(crate) fn seed_track(
    conn: &mut SqliteConnection,
    id: i64,
    name: &str,
    is_activated: bool,
) -> DataTrack {
    DataTrack::insert_record(
        conn,
        &DataTrack {
            id,
            name: name.to_owned(),
            is_activated,
        },
    )
    .expect("Failed to insert data track")
}

pub(crate) fn set_track_activated(conn: &mut SqliteConnection, id: i64, is_activated: bool) {
    use crate::db::data_tracks;

    diesel::update(data_tracks::table.find(id))
        .set(data_tracks::is_activated.eq(is_activated))
        .execute(conn)
        .expect("Failed to update data track");
}

/// An instance named after its uuid with fixed timestamps.
pub(crate) fn instance(
    uuid: &str,
    element_key: i64,
    track_id: i64,
    fog_uuid: Option<&str>,
) -> ElementInstance {
    ElementInstance {
        uuid: uuid.to_owned(),
        track_id,
        element_key,
        name: uuid.to_owned(),
        last_updated: EpochMillis::from(1_000),
        config_last_updated: EpochMillis::from(1_000),
        iofog_uuid: fog_uuid.map(str::to_owned),
        ..Default::default()
    }
}
