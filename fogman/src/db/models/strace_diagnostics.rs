// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use diesel::prelude::*;

use crate::db::{ElementInstance, element_instance, strace_diagnostics};

/// Strace toggle and pending output for one element instance.
///
/// A fog agent appends trace output to `buffer` while `strace_run` is
/// set; the controller drains it with
/// [`StraceDiagnostics::find_and_pop_buffer_by_element_id`]. Rows are
/// removed together with their instance.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    serde::Serialize,
    serde::Deserialize,
    Identifiable,
    Queryable,
    Selectable,
    Associations,
)]
#[diesel(belongs_to(ElementInstance, foreign_key = element_instance_uuid))]
#[diesel(table_name = crate::db::strace_diagnostics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(primary_key(id))]
pub struct StraceDiagnostics {
    pub id: i64,
    pub strace_run: bool,
    pub buffer: String,
    pub element_instance_uuid: String,
}

/// Whether strace is enabled for an instance.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, Queryable)]
pub struct StraceState {
    pub element_instance_uuid: String,
    pub strace_run: bool,
}

impl StraceDiagnostics {
    /// Sets `strace_run` for an instance, creating its row on first
    /// use. The buffer of an existing row is left alone.
    pub fn update_or_create(
        conn: &mut SqliteConnection,
        instance_uuid: &str,
        run: bool,
    ) -> QueryResult<StraceDiagnostics> {
        diesel::insert_into(strace_diagnostics::table)
            .values((
                strace_diagnostics::element_instance_uuid.eq(instance_uuid),
                strace_diagnostics::strace_run.eq(run),
            ))
            .on_conflict(strace_diagnostics::element_instance_uuid)
            .do_update()
            .set(strace_diagnostics::strace_run.eq(run))
            .returning(StraceDiagnostics::as_returning())
            .get_result(conn)
    }

    /// Appends `chunk` to the instance's buffer in a single statement.
    /// Returns 0 when the instance has no strace row.
    pub fn push_buffer_by_element_id(
        conn: &mut SqliteConnection,
        instance_uuid: &str,
        chunk: &str,
    ) -> QueryResult<usize> {
        diesel::update(
            strace_diagnostics::table
                .filter(strace_diagnostics::element_instance_uuid.eq(instance_uuid)),
        )
        .set(strace_diagnostics::buffer.eq(strace_diagnostics::buffer.concat(chunk)))
        .execute(conn)
    }

    /// Returns the row as it was and clears its stored buffer.
    ///
    /// The read and the clear share an immediate transaction, which
    /// takes the write lock up front, so a push cannot land between
    /// them.
    pub fn find_and_pop_buffer_by_element_id(
        conn: &mut SqliteConnection,
        instance_uuid: &str,
    ) -> QueryResult<Option<StraceDiagnostics>> {
        conn.immediate_transaction(|conn| {
            let row = strace_diagnostics::table
                .filter(strace_diagnostics::element_instance_uuid.eq(instance_uuid))
                .select(StraceDiagnostics::as_select())
                .first(conn)
                .optional()?;

            if let Some(row) = &row
                && !row.buffer.is_empty()
            {
                diesel::update(strace_diagnostics::table.find(row.id))
                    .set(strace_diagnostics::buffer.eq(""))
                    .execute(conn)?;
            }

            Ok(row)
        })
    }

    /// Strace state of every instance on the given fog.
    pub fn find_state_by_fog_id(
        conn: &mut SqliteConnection,
        fog_uuid: &str,
    ) -> QueryResult<Vec<StraceState>> {
        strace_diagnostics::table
            .inner_join(element_instance::table)
            .filter(element_instance::iofog_uuid.eq(fog_uuid))
            .select((
                strace_diagnostics::element_instance_uuid,
                strace_diagnostics::strace_run,
            ))
            .order_by(strace_diagnostics::element_instance_uuid)
            .load(conn)
    }
}
