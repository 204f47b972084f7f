// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Element instances and their query surface.
//!
//! Every query takes the connection explicitly and returns Diesel's
//! [`QueryResult`] unchanged, so connectivity failures and constraint
//! violations reach the caller as-is. Lookups that may legitimately
//! find nothing return `Option` or an empty `Vec` rather than
//! [`diesel::result::Error::NotFound`].
//!
//! Hand-written SQL is used where the join shape is easier to read as
//! SQL than as query builder calls. Those statements bind every caller
//! supplied value as a parameter.

use diesel::{
    prelude::*,
    sql_types::{BigInt, Bool, Nullable, Text},
};

use crate::db::{
    ElementSummary, EpochMillis, data_tracks, element, element_instance, iofogs,
};

/// `track_id` of an instance that runs regardless of any track.
pub const TRACK_INDEPENDENT: i64 = 0;

/// Publisher of built-in elements, hidden from track detail listings.
const SYSTEM_PUBLISHER: &str = "SYSTEM";

/// Uuids bound per `IN (...)` list, kept under SQLite's host parameter
/// limit.
const UUID_BATCH_SIZE: usize = 500;

const DELETE_NETWORK_ELEMENT_QUERY: &str = "\
    DELETE FROM element_instance \
    WHERE uuid IN ( \
        SELECT network_element_id1 FROM network_pairing WHERE element_id1 = ? \
    ) \
    OR uuid IN ( \
        SELECT network_element_id2 FROM network_pairing WHERE element_id1 = ? \
    )";

const ELEMENT_INSTANCE_DETAILS_QUERY: &str = "\
    SELECT ei.uuid AS uuid, ei.name AS element_instance_name, ei.config AS config, \
           ei.iofog_uuid AS fog_uuid, ei.root_host_access AS root_host_access, \
           ei.log_size AS log_size, e.name AS element_name, e.picture AS element_picture, \
           ft.name AS fog_type_name, ft.id AS fog_type_id \
    FROM element_instance ei \
    INNER JOIN element e ON ei.element_key = e.id \
    LEFT JOIN element_fog_types eft ON ei.element_key = eft.element_id \
    LEFT JOIN iofog_type ft ON ft.id = eft.iofog_type_id \
    WHERE ei.track_id = ? AND e.publisher != ? \
    ORDER BY ei.uuid, ft.id";

const ELEMENT_INSTANCE_PROPERTIES_QUERY: &str = "\
    SELECT ei.uuid AS uuid, ei.element_key AS element_key, \
           ei.name AS element_instance_name, ei.config AS config, \
           ei.iofog_uuid AS fog_uuid, ei.root_host_access AS root_host_access, \
           ei.log_size AS log_size, ei.rebuild AS rebuild, \
           ei.is_stream_viewer AS is_stream_viewer, ei.is_debug_console AS is_debug_console, \
           ei.is_manager AS is_manager, ei.is_network AS is_network, \
           e.id AS element_id, e.name AS element_name, e.description AS element_description, \
           e.category AS element_category, e.container_image AS container_image, \
           e.publisher AS publisher, e.picture AS picture, e.registry_id AS registry_id, \
           ft.id AS fog_type_id \
    FROM element_instance ei \
    LEFT JOIN element e ON ei.element_key = e.id \
    LEFT JOIN element_fog_types eft ON ei.element_key = eft.element_id \
    LEFT JOIN iofog_type ft ON ft.id = eft.iofog_type_id \
    WHERE ei.uuid = ? \
    ORDER BY ft.id";

/// The per-node running configuration of an [`crate::db::Element`].
///
/// `uuid` is assigned at creation and never changes; updates go
/// through [`ElementInstanceChanges`], which has no uuid field.
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
#[diesel(table_name = crate::db::element_instance)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(uuid))]
pub struct ElementInstance {
    pub uuid: String,
    pub track_id: i64,
    pub element_key: i64,
    /// JSON encoded configuration handed to the agent.
    pub config: String,
    pub name: String,
    pub last_updated: EpochMillis,
    pub config_last_updated: EpochMillis,
    pub updated_by: Option<i64>,
    pub is_stream_viewer: bool,
    pub is_debug_console: bool,
    pub is_manager: bool,
    pub is_network: bool,
    pub registry_id: Option<i64>,
    pub rebuild: bool,
    pub root_host_access: bool,
    pub log_size: i64,
    pub iofog_uuid: Option<String>,
}

/// A partial update of an element instance.
///
/// `None` leaves a column untouched. For nullable columns,
/// `Some(None)` writes `NULL`.
#[derive(Clone, Debug, Default, Eq, PartialEq, AsChangeset)]
#[diesel(table_name = crate::db::element_instance)]
pub struct ElementInstanceChanges {
    pub track_id: Option<i64>,
    pub element_key: Option<i64>,
    pub config: Option<String>,
    pub name: Option<String>,
    pub last_updated: Option<EpochMillis>,
    pub config_last_updated: Option<EpochMillis>,
    pub updated_by: Option<Option<i64>>,
    pub is_stream_viewer: Option<bool>,
    pub is_debug_console: Option<bool>,
    pub is_manager: Option<bool>,
    pub is_network: Option<bool>,
    pub registry_id: Option<Option<i64>>,
    pub rebuild: Option<bool>,
    pub root_host_access: Option<bool>,
    pub log_size: Option<i64>,
    pub iofog_uuid: Option<Option<String>>,
}

/// An instance scheduled on a fog, with the activation state of its
/// track. `is_activated` is `None` for track-independent instances.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct ActiveElementInstance {
    #[serde(flatten)]
    pub instance: ElementInstance,
    pub is_activated: Option<bool>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, Queryable)]
pub struct IntraTrackElement {
    pub element_id: String,
    pub element_name: String,
    pub element_type_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, Queryable)]
pub struct ExtraTrackElement {
    pub element_id: String,
    pub element_name: String,
    pub element_type_name: String,
    pub track_id: i64,
    pub track_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, Queryable)]
pub struct OtherTrackElement {
    pub element_id: String,
    pub element_name: String,
    pub element_type_name: String,
    pub track_id: i64,
    pub track_name: String,
    pub fog_uuid: String,
    pub fog_name: String,
}

/// One display row of a track's instances. An element that runs on
/// several fog types yields one row per type.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, QueryableByName)]
pub struct ElementInstanceDetails {
    #[diesel(sql_type = Text)]
    pub uuid: String,
    #[diesel(sql_type = Text)]
    pub element_instance_name: String,
    #[diesel(sql_type = Text)]
    pub config: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub fog_uuid: Option<String>,
    #[diesel(sql_type = Bool)]
    pub root_host_access: bool,
    #[diesel(sql_type = BigInt)]
    pub log_size: i64,
    #[diesel(sql_type = Text)]
    pub element_name: String,
    #[diesel(sql_type = Text)]
    pub element_picture: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub fog_type_name: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub fog_type_id: Option<i64>,
}

/// Instance columns together with every column of its element.
/// Element columns are `None` when the element row is missing.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, QueryableByName)]
pub struct ElementInstanceProperties {
    #[diesel(sql_type = Text)]
    pub uuid: String,
    #[diesel(sql_type = BigInt)]
    pub element_key: i64,
    #[diesel(sql_type = Text)]
    pub element_instance_name: String,
    #[diesel(sql_type = Text)]
    pub config: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub fog_uuid: Option<String>,
    #[diesel(sql_type = Bool)]
    pub root_host_access: bool,
    #[diesel(sql_type = BigInt)]
    pub log_size: i64,
    #[diesel(sql_type = Bool)]
    pub rebuild: bool,
    #[diesel(sql_type = Bool)]
    pub is_stream_viewer: bool,
    #[diesel(sql_type = Bool)]
    pub is_debug_console: bool,
    #[diesel(sql_type = Bool)]
    pub is_manager: bool,
    #[diesel(sql_type = Bool)]
    pub is_network: bool,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub element_id: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub element_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub element_description: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub element_category: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub container_image: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub publisher: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub picture: Option<String>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub registry_id: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub fog_type_id: Option<i64>,
}

/// Runs `load` over the distinct `uuids` in sorted batches and
/// concatenates the results, which stay ordered by uuid.
fn load_in_batches<T>(
    uuids: &[String],
    mut load: impl FnMut(&[String]) -> QueryResult<Vec<T>>,
) -> QueryResult<Vec<T>> {
    let mut sorted = uuids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut rows = Vec::new();
    for batch in sorted.chunks(UUID_BATCH_SIZE) {
        rows.extend(load(batch)?);
    }
    Ok(rows)
}

impl ElementInstance {
    pub fn insert_record(
        conn: &mut SqliteConnection,
        instance: &ElementInstance,
    ) -> QueryResult<ElementInstance> {
        diesel::insert_into(element_instance::table)
            .values(instance)
            .returning(element_instance::all_columns)
            .get_result(conn)
    }

    /// Applies `changes` to the instance with the given uuid and
    /// returns the number of rows updated (0 or 1).
    ///
    /// There is no concurrency check; the last writer wins. An empty
    /// changeset is rejected by Diesel with a query builder error.
    pub fn update_by_uuid(
        conn: &mut SqliteConnection,
        search_uuid: &str,
        changes: &ElementInstanceChanges,
    ) -> QueryResult<usize> {
        diesel::update(element_instance::table.filter(element_instance::uuid.eq(search_uuid)))
            .set(changes)
            .execute(conn)
    }

    /// Applies `changes` to every instance on the given fog.
    pub fn update_by_fog_uuid(
        conn: &mut SqliteConnection,
        fog_uuid: &str,
        changes: &ElementInstanceChanges,
    ) -> QueryResult<usize> {
        diesel::update(element_instance::table.filter(element_instance::iofog_uuid.eq(fog_uuid)))
            .set(changes)
            .execute(conn)
    }

    /// Returns the instances a fog should be running: those that are
    /// track independent or whose track is activated.
    pub fn find_by_instance_id(
        conn: &mut SqliteConnection,
        fog_uuid: &str,
    ) -> QueryResult<Vec<ActiveElementInstance>> {
        let rows: Vec<(ElementInstance, Option<bool>)> = element_instance::table
            .left_join(data_tracks::table)
            .filter(element_instance::iofog_uuid.eq(fog_uuid))
            .filter(
                element_instance::track_id
                    .eq(TRACK_INDEPENDENT)
                    .or(data_tracks::is_activated.eq(true)),
            )
            .select((
                ElementInstance::as_select(),
                data_tracks::is_activated.nullable(),
            ))
            .order_by(element_instance::uuid)
            .load(conn)?;

        Ok(rows
            .into_iter()
            .map(|(instance, is_activated)| ActiveElementInstance {
                instance,
                is_activated,
            })
            .collect())
    }

    pub fn find_by_uuid(
        conn: &mut SqliteConnection,
        search_uuid: &str,
    ) -> QueryResult<Option<ElementInstance>> {
        element_instance::table
            .filter(element_instance::uuid.eq(search_uuid))
            .select(ElementInstance::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_track_id(
        conn: &mut SqliteConnection,
        search_track_id: i64,
    ) -> QueryResult<Vec<ElementInstance>> {
        element_instance::table
            .filter(element_instance::track_id.eq(search_track_id))
            .select(ElementInstance::as_select())
            .order_by(element_instance::uuid)
            .load(conn)
    }

    /// Deletes the instances whose uuid is either of the two network
    /// element ids. Returns the number of rows deleted.
    pub fn delete_network_elements(
        conn: &mut SqliteConnection,
        network_element_id1: &str,
        network_element_id2: &str,
    ) -> QueryResult<usize> {
        diesel::delete(
            element_instance::table.filter(
                element_instance::uuid
                    .eq(network_element_id1)
                    .or(element_instance::uuid.eq(network_element_id2)),
            ),
        )
        .execute(conn)
    }

    /// Deletes both network instances of every pairing created for
    /// `element_id`. Returns the number of rows deleted.
    pub fn delete_network_element(
        conn: &mut SqliteConnection,
        element_id: &str,
    ) -> QueryResult<usize> {
        diesel::sql_query(DELETE_NETWORK_ELEMENT_QUERY)
            .bind::<Text, _>(element_id)
            .bind::<Text, _>(element_id)
            .execute(conn)
    }

    pub fn delete_by_element_uuid(
        conn: &mut SqliteConnection,
        delete_uuid: &str,
    ) -> QueryResult<usize> {
        diesel::delete(element_instance::table.filter(element_instance::uuid.eq(delete_uuid)))
            .execute(conn)
    }

    /// Returns the user-deployed instances of a track, skipping stream
    /// viewers, debug consoles, managers and network instances.
    pub fn find_real_element_instance_by_track_id(
        conn: &mut SqliteConnection,
        search_track_id: i64,
    ) -> QueryResult<Vec<(ElementInstance, ElementSummary)>> {
        element_instance::table
            .inner_join(element::table)
            .filter(element_instance::track_id.eq(search_track_id))
            .filter(element_instance::is_stream_viewer.eq(false))
            .filter(element_instance::is_debug_console.eq(false))
            .filter(element_instance::is_manager.eq(false))
            .filter(element_instance::is_network.eq(false))
            .select((ElementInstance::as_select(), ElementSummary::as_select()))
            .order_by(element_instance::uuid)
            .load(conn)
    }

    pub fn find_by_uuids(
        conn: &mut SqliteConnection,
        uuids: &[String],
    ) -> QueryResult<Vec<ElementInstance>> {
        load_in_batches(uuids, |batch| {
            element_instance::table
                .filter(element_instance::uuid.eq_any(batch))
                .select(ElementInstance::as_select())
                .order_by(element_instance::uuid)
                .load(conn)
        })
    }

    pub fn find_intra_track_by_uuids(
        conn: &mut SqliteConnection,
        uuids: &[String],
    ) -> QueryResult<Vec<IntraTrackElement>> {
        load_in_batches(uuids, |batch| {
            element_instance::table
                .inner_join(element::table)
                .filter(element_instance::uuid.eq_any(batch))
                .select((element_instance::uuid, element_instance::name, element::name))
                .distinct()
                .order_by(element_instance::uuid)
                .load(conn)
        })
    }

    pub fn find_extra_track_by_uuids(
        conn: &mut SqliteConnection,
        uuids: &[String],
    ) -> QueryResult<Vec<ExtraTrackElement>> {
        load_in_batches(uuids, |batch| {
            element_instance::table
                .inner_join(element::table)
                .inner_join(data_tracks::table)
                .filter(element_instance::uuid.eq_any(batch))
                .select((
                    element_instance::uuid,
                    element_instance::name,
                    element::name,
                    element_instance::track_id,
                    data_tracks::name,
                ))
                .distinct()
                .order_by(element_instance::uuid)
                .load(conn)
        })
    }

    pub fn find_other_track_detail_by_uuids(
        conn: &mut SqliteConnection,
        uuids: &[String],
    ) -> QueryResult<Vec<OtherTrackElement>> {
        load_in_batches(uuids, |batch| {
            element_instance::table
                .inner_join(element::table)
                .inner_join(data_tracks::table)
                .inner_join(iofogs::table)
                .filter(element_instance::uuid.eq_any(batch))
                .select((
                    element_instance::uuid,
                    element_instance::name,
                    element::name,
                    element_instance::track_id,
                    data_tracks::name,
                    iofogs::uuid,
                    iofogs::name,
                ))
                .distinct()
                .order_by(element_instance::uuid)
                .load(conn)
        })
    }

    /// Display rows for the non-system instances of a track.
    pub fn get_element_instance_details(
        conn: &mut SqliteConnection,
        track_id: i64,
    ) -> QueryResult<Vec<ElementInstanceDetails>> {
        diesel::sql_query(ELEMENT_INSTANCE_DETAILS_QUERY)
            .bind::<BigInt, _>(track_id)
            .bind::<Text, _>(SYSTEM_PUBLISHER)
            .load(conn)
    }

    /// Instance and element properties for one instance. Empty when
    /// the uuid is unknown.
    pub fn get_element_instance_properties(
        conn: &mut SqliteConnection,
        search_uuid: &str,
    ) -> QueryResult<Vec<ElementInstanceProperties>> {
        diesel::sql_query(ELEMENT_INSTANCE_PROPERTIES_QUERY)
            .bind::<Text, _>(search_uuid)
            .load(conn)
    }

    /// The role this instance plays on its fog, if any.
    pub fn role(&self) -> Option<&'static str> {
        if self.is_stream_viewer {
            Some("stream-viewer")
        } else if self.is_debug_console {
            Some("debug-console")
        } else if self.is_manager {
            Some("manager")
        } else if self.is_network {
            Some("network")
        } else {
            None
        }
    }
}

#[cfg(test)]
impl Default for ElementInstance {
    fn default() -> Self {
        Self {
            uuid: "".to_owned(),
            track_id: TRACK_INDEPENDENT,
            element_key: 0,
            config: "{}".to_owned(),
            name: "".to_owned(),
            last_updated: Default::default(),
            config_last_updated: Default::default(),
            updated_by: None,
            is_stream_viewer: false,
            is_debug_console: false,
            is_manager: false,
            is_network: false,
            registry_id: None,
            rebuild: false,
            root_host_access: false,
            log_size: 50,
            iofog_uuid: None,
        }
    }
}
