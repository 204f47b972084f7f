// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use thiserror::Error;

use crate::instances::InstanceSpecError;

#[derive(Debug, Error)]
pub enum FogmanError {
    #[error("Unable to connect to database {database_url}")]
    SqliteConnectionError {
        database_url: String,
        #[source]
        source: diesel::ConnectionError,
    },
    #[error("Database {database_url}: failed {context}")]
    SqliteQueryError {
        database_url: String,
        context: String,
        #[source]
        source: diesel::result::Error,
    },
    #[error("Unable to apply migrations to database {database_url}: {source}")]
    SqliteMigrationError {
        database_url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Timed out opening database {database_url} after {attempts} attempts")]
    DatabaseOpenTimeout { database_url: String, attempts: u32 },
    #[error(transparent)]
    DatabaseError(#[from] diesel::result::Error),
    #[error("Unable to serialise instance config: {0}")]
    ConfigSerialisation(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidInstanceSpec(#[from] InstanceSpecError),
    #[error("Element instance {0} not found")]
    InstanceNotFound(String),
    #[error("Can't run strace for element without fog")]
    StraceWithoutFog,
    #[error("Element instance {0} isn't in strace diagnostics list")]
    NotInStraceList(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{mode} is not a valid network mode")]
    InvalidNetworkMode { mode: String },
    #[error("Error parsing config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}
