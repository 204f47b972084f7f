// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use std::path::Path;

use log::{debug, warn};
use rand::{Rng, distr::Alphanumeric};

use crate::config::Config;

/// Returns a random identifier of `len` lowercase ASCII letters and
/// digits, as used for element instance uuids and stream viewer
/// access tokens.
pub fn generate_instance_id(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Returns a random string of `len` mixed-case ASCII letters and
/// digits, as used for passcodes and debug console access tokens.
pub fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Reads the configuration file at `path`, falling back to defaults
/// when it is missing or does not parse.
pub fn open_config_file(path: &Path) -> Config {
    if let Ok(c) = std::fs::read_to_string(path) {
        match c.parse::<Config>() {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Unable to parse config file {}, using defaults: {e}",
                    path.display()
                );
                Config::default()
            }
        }
    } else {
        debug!(
            "Unable to read config file {}, using defaults",
            path.display()
        );
        Config::default()
    }
}
