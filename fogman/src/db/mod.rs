// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Top-level database module.
//!
//! This module re-exports the models, schema tables and column types
//! used throughout the crate, flattening the module structure so
//! consumers can simply `use crate::db::ElementInstance;`.
//!
//! The `types` module and its internal submodules are kept private to
//! encourage consistent usage and avoid exposing internal structure.
//!
//! If a type appears in `crate::db`, it's part of the crate's
//! intended public interface.

use diesel::{Connection, prelude::*, sqlite::SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::debug;

use crate::FogmanError;

pub mod models;
pub mod prelude;
pub mod schema;
#[cfg(test)]
pub(crate) mod test_fixtures;
mod types;
pub use models::*;
pub use schema::{
    data_tracks, element, element_fog_types, element_instance, iofog_type, iofogs,
    network_pairing, strace_diagnostics,
};
// Re-export database column types and wrappers for public use. These
// types are defined in the private `types` module and exposed here to
// flatten the db module API.
//
// See also: `crate::db::prelude` for glob imports.
pub use types::EpochMillis;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Establish a new SQLite database connection and run pending
/// migrations.
///
/// This function connects to the SQLite database at the provided URL,
/// applies standard PRAGMA settings, and runs any unapplied schema
/// migrations embedded in the binary.
///
/// The following PRAGMAs are set to configure the database's
/// behaviour:
///
/// - `journal_mode = WAL`: lets fog-facing readers proceed while a
///   writer appends strace output.
/// - `busy_timeout = 5000`: Sets a 5-second timeout when the database
///   is locked, to avoid immediate failure under contention.
/// - `foreign_keys = ON`: Enforces foreign key constraints at the
///   database level. Strace rows and fog-owned instances rely on
///   `ON DELETE CASCADE`.
///
/// # Arguments
///
/// * `database_url` – Path or URI to the SQLite database file.
///
/// # Errors
///
/// Returns a [`FogmanError`] if:
///
/// - The connection cannot be established.
/// - Any of the PRAGMA statements fail to execute.
/// - One or more schema migrations fail to apply.
pub fn establish_database_connection(database_url: &str) -> Result<SqliteConnection, FogmanError> {
    debug!("Opening database {database_url}");
    let mut conn = SqliteConnection::establish(database_url).map_err(|e| {
        FogmanError::SqliteConnectionError {
            database_url: database_url.to_string(),
            source: e,
        }
    })?;

    diesel::sql_query("PRAGMA journal_mode = WAL")
        .execute(&mut conn)
        .map_err(|e| FogmanError::SqliteQueryError {
            database_url: database_url.to_string(),
            context: "setting WAL journal mode".into(),
            source: e,
        })?;

    diesel::sql_query("PRAGMA busy_timeout = 5000")
        .execute(&mut conn)
        .map_err(|e| FogmanError::SqliteQueryError {
            database_url: database_url.to_string(),
            context: "setting busy timeout".into(),
            source: e,
        })?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(|e| FogmanError::SqliteQueryError {
            database_url: database_url.to_string(),
            context: "enabling foreign key support".into(),
            source: e,
        })?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| FogmanError::SqliteMigrationError {
            database_url: database_url.to_string(),
            source: e,
        })?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(QueryableByName, Debug)]
    struct ForeignKeySetting {
        #[diesel(sql_type = diesel::sql_types::Integer)]
        foreign_keys: i32,
    }

    #[derive(QueryableByName, Debug)]
    struct TableName {
        #[diesel(sql_type = diesel::sql_types::Text)]
        name: String,
    }

    /// SQLite does not enforce foreign keys by default. Strace rows
    /// and fog-owned instances are cleaned up through cascades, which
    /// silently stop working if this pragma is lost.
    #[test]
    fn test_foreign_keys_pragma_enabled() {
        let mut conn = establish_database_connection(":memory:")
            .expect("Failed to establish in-memory SQLite connection");

        let result = diesel::sql_query("PRAGMA foreign_keys")
            .load::<ForeignKeySetting>(&mut conn)
            .expect("Failed to query foreign_keys PRAGMA");

        assert_eq!(
            result
                .first()
                .expect("Expected one row from PRAGMA foreign_keys")
                .foreign_keys,
            1,
            "PRAGMA foreign_keys is not enabled"
        );
    }

    #[test]
    fn test_migrations_create_all_tables() {
        let mut conn = establish_database_connection(":memory:")
            .expect("Failed to establish in-memory SQLite connection");

        let tables: Vec<String> = diesel::sql_query(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' \
             ORDER BY name",
        )
        .load::<TableName>(&mut conn)
        .expect("Failed to list tables")
        .into_iter()
        .map(|t| t.name)
        .collect();

        assert_eq!(
            tables,
            vec![
                "data_tracks",
                "element",
                "element_fog_types",
                "element_instance",
                "iofog_type",
                "iofogs",
                "network_pairing",
                "strace_diagnostics",
            ]
        );
    }

    #[test]
    fn test_connection_error_names_database() {
        let result = establish_database_connection("/nonexistent-dir/for/fogman/test.db");
        match result {
            Err(FogmanError::SqliteConnectionError { database_url, .. }) => {
                assert_eq!(database_url, "/nonexistent-dir/for/fogman/test.db");
            }
            Err(e) => panic!("Expected connection error, got {e:?}"),
            Ok(_) => panic!("Expected connection to a missing directory to fail"),
        }
    }
}
