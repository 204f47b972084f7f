// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use std::str::FromStr;

use serde::Deserialize;

use crate::{directories::STDIR_DB, errors::ParseError};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    database: Option<DatabaseConfig>,
}

impl Config {
    pub fn database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }

    /// Replaces the database location, keeping the retry settings.
    pub fn with_database_path(mut self, path: impl Into<String>) -> Self {
        let mut database = self.database();
        database.path = path.into();
        self.database = Some(database);
        self
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path or URI of the SQLite database.
    pub path: String,
    pub max_retries: u32,
    pub millisec_delay: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: STDIR_DB.to_string(),
            // Maximum numbers of times to attempt to open the database after a failed attempt
            max_retries: 10,
            // Number of milli-seconds to wait between failed database attempts
            millisec_delay: 1000,
        }
    }
}

impl FromStr for Config {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(ParseError::ConfigParseError)
    }
}
