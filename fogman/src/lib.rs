// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! Element instance and strace diagnostics store for an ioFog fleet
//! controller.
//!
//! The [`db`] module holds the SQLite schema, models and the query
//! surface over element instances. [`instances`] creates instances,
//! and [`strace`] is the service layer that toggles strace and moves
//! buffered trace output for fog agents.

use std::{path::Path, thread::sleep, time::Duration};

use diesel::SqliteConnection;
use log::{debug, info, warn};

use crate::{config::Config, utils::open_config_file};

pub mod config;
pub mod db;
pub mod errors;
pub mod instances;
pub mod strace;
pub mod utils;

pub use db::establish_database_connection;
pub use errors::FogmanError;

pub mod directories {
    // ConfigurationDirectory: /etc/fogman/
    pub const CFGPATH_FOGMAN_CONFIG: &str = "/etc/fogman/fogman.toml";

    // StateDirectory: /var/lib/fogman/
    pub const STDIR_DB: &str = "/var/lib/fogman/fogman.db";
}

/// Opens the configured database, retrying while it cannot be opened.
///
/// Makes up to `max_retries + 1` attempts, sleeping `millisec_delay`
/// between them. Each attempt also applies pending migrations.
///
/// # Errors
///
/// Returns [`FogmanError::DatabaseOpenTimeout`] once every attempt has
/// failed.
pub fn init_database(config: &Config) -> Result<SqliteConnection, FogmanError> {
    let database_config = config.database();
    let attempts = database_config.max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        match establish_database_connection(&database_config.path) {
            Ok(conn) => {
                debug!("Successfully opened database {}", database_config.path);
                return Ok(conn);
            }
            Err(e) => {
                warn!("Attempt {attempt}/{attempts} to open database failed: {e}");
                if attempt < attempts {
                    info!(
                        "Retrying database open after {} milliseconds",
                        database_config.millisec_delay
                    );
                    sleep(Duration::from_millis(database_config.millisec_delay));
                }
            }
        }
    }

    Err(FogmanError::DatabaseOpenTimeout {
        database_url: database_config.path,
        attempts,
    })
}

/// Loads the configuration at `config_path` and opens its database.
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use fogman::{directories::CFGPATH_FOGMAN_CONFIG, setup};
///
/// match setup(Path::new(CFGPATH_FOGMAN_CONFIG)) {
///     Ok((config, _conn)) => println!("Opened {}", config.database().path),
///     Err(e) => eprintln!("Failed to set up fogman: {e}"),
/// }
/// ```
pub fn setup(config_path: &Path) -> Result<(Config, SqliteConnection), FogmanError> {
    debug!("fogman::setup({})", config_path.display());
    let config = open_config_file(config_path);
    let conn = init_database(&config)?;
    Ok((config, conn))
}
