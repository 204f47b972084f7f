// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

//! # Instance Factories
//!
//! Creation of element instances. A plain instance is described by an
//! [`ElementInstanceSpec`] and a network bridge by a
//! [`NetworkInstanceSpec`]; both are assembled with a builder and
//! validated in `build()`. Stream viewers and debug consoles take no
//! spec since everything but the owning fog is fixed.
//!
//! Every factory generates a fresh 32 character uuid, stamps both
//! timestamps with the current time and inserts a single row.
//!
//! ```rust,no_run
//! use fogman::{
//!     db::{Element, ElementInstance},
//!     establish_database_connection,
//!     instances::ElementInstanceSpecBuilder,
//! };
//!
//! # fn main() -> Result<(), fogman::errors::FogmanError> {
//! let mut conn = establish_database_connection("/tmp/fogman.db")?;
//! let element = Element::find_record(&mut conn, 42)?;
//! let spec = ElementInstanceSpecBuilder::default()
//!     .user_id(1)
//!     .name("temperature")
//!     .config(serde_json::json!({"interval": 5}))
//!     .fog_uuid("fog-a")
//!     .build()?;
//! let instance = ElementInstance::create_element_instance(&mut conn, &element, &spec)?;
//! println!("created {}", instance.uuid);
//! # Ok(())
//! # }
//! ```

use std::{fmt, str::FromStr};

use derive_builder::Builder;
use diesel::SqliteConnection;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    db::{Element, ElementInstance, EpochMillis, TRACK_INDEPENDENT},
    errors::{FogmanError, ParseError},
    utils::{generate_instance_id, generate_random_string},
};

/// Length of generated instance uuids, access tokens and passcodes.
pub const INSTANCE_ID_LENGTH: usize = 32;
pub const DEFAULT_LOG_SIZE: i64 = 50;

pub const STREAM_VIEWER_NAME: &str = "Stream Viewer";
pub const DEBUG_CONSOLE_NAME: &str = "Debug Console";
const STORAGE_SIZE_LIMIT: f64 = 200.0;

const NETWORK_CONNECTION_COUNT: u32 = 60;
const NETWORK_LOCALHOST: &str = "iofog";
const NETWORK_HEARTBEAT_FREQUENCY_MS: u64 = 20_000;
const NETWORK_HEARTBEAT_ABSENCE_THRESHOLD_MS: u64 = 60_000;

/// Errors raised while turning a builder into a spec.
#[derive(Debug, Error)]
pub enum InstanceSpecError {
    /// One or more required fields were not set. The inner string
    /// names them, as reported by `derive_builder`.
    #[error("failed to build instance spec: {0}")]
    UninitialisedFields(String),

    #[error("error serialising instance config to JSON")]
    ConfigSerialisation(#[from] serde_json::Error),

    #[error("log size must not be negative, got {0}")]
    NegativeLogSize(i64),
}

/// Parameters for [`ElementInstance::create_element_instance`].
///
/// `config` is stored as its JSON encoding, computed in `build()`.
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "mutable", build_fn(name = "build_partial"))]
pub struct ElementInstanceSpec {
    user_id: i64,

    #[builder(default = "TRACK_INDEPENDENT")]
    track_id: i64,

    #[builder(default = "serde_json::Value::Object(Default::default())")]
    config: serde_json::Value,

    #[builder(setter(into))]
    name: String,

    #[builder(default = "DEFAULT_LOG_SIZE")]
    log_size: i64,

    #[builder(setter(into, strip_option), default)]
    fog_uuid: Option<String>,

    #[builder(setter(skip))]
    config_json: String,
}

impl ElementInstanceSpecBuilder {
    /// Validates the builder and serialises `config`.
    ///
    /// # Errors
    ///
    /// - [`InstanceSpecError::UninitialisedFields`] if `user_id` or
    ///   `name` is missing.
    /// - [`InstanceSpecError::NegativeLogSize`] for a negative log size.
    /// - [`InstanceSpecError::ConfigSerialisation`] if the config
    ///   cannot be encoded.
    pub fn build(&mut self) -> Result<ElementInstanceSpec, InstanceSpecError> {
        let mut spec = self
            .build_partial()
            .map_err(|e| InstanceSpecError::UninitialisedFields(e.to_string()))?;

        if spec.log_size < 0 {
            return Err(InstanceSpecError::NegativeLogSize(spec.log_size));
        }
        spec.config_json = serde_json::to_string(&spec.config)?;

        Ok(spec)
    }
}

impl ElementInstanceSpec {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn track_id(&self) -> i64 {
        self.track_id
    }

    pub fn config(&self) -> &serde_json::Value {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log_size(&self) -> i64 {
        self.log_size
    }

    pub fn fog_uuid(&self) -> Option<&str> {
        self.fog_uuid.as_deref()
    }
}

/// Whether a network bridge is reachable from outside the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Public,
    Private,
}

impl NetworkMode {
    pub fn from_public(is_public: bool) -> Self {
        if is_public {
            NetworkMode::Public
        } else {
            NetworkMode::Private
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMode::Public => write!(f, "public"),
            NetworkMode::Private => write!(f, "private"),
        }
    }
}

impl FromStr for NetworkMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(NetworkMode::Public),
            "private" => Ok(NetworkMode::Private),
            other => Err(ParseError::InvalidNetworkMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Parameters for [`ElementInstance::create_network_instance`].
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "mutable", build_fn(name = "build_partial"))]
pub struct NetworkInstanceSpec {
    user_id: i64,

    #[builder(setter(into))]
    fog_uuid: String,

    #[builder(setter(into))]
    satellite_domain: String,

    satellite_port: u16,

    #[builder(setter(into))]
    name: String,

    local_port: u16,

    #[builder(default)]
    is_public: bool,

    #[builder(default = "TRACK_INDEPENDENT")]
    track_id: i64,
}

impl NetworkInstanceSpecBuilder {
    pub fn build(&mut self) -> Result<NetworkInstanceSpec, InstanceSpecError> {
        self.build_partial()
            .map_err(|e| InstanceSpecError::UninitialisedFields(e.to_string()))
    }
}

impl NetworkInstanceSpec {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn fog_uuid(&self) -> &str {
        &self.fog_uuid
    }

    pub fn satellite_domain(&self) -> &str {
        &self.satellite_domain
    }

    pub fn satellite_port(&self) -> u16 {
        self.satellite_port
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn track_id(&self) -> i64 {
        self.track_id
    }
}

/// Config document of a stream viewer instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamViewerConfig {
    pub accesstoken: String,
    pub foldersizelimit: f64,
}

/// Config document of a debug console instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConsoleConfig {
    pub accesstoken: String,
    pub filesizelimit: f64,
}

/// Config document of a network instance, as read by the fog's
/// network bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub mode: NetworkMode,
    pub host: String,
    pub port: u16,
    pub connectioncount: u32,
    pub passcode: String,
    pub localhost: String,
    pub localport: u16,
    pub heartbeatfrequency: u64,
    pub heartbeatabsencethreshold: u64,
}

impl NetworkConfig {
    fn for_spec(spec: &NetworkInstanceSpec) -> Self {
        Self {
            mode: NetworkMode::from_public(spec.is_public),
            host: spec.satellite_domain.clone(),
            port: spec.satellite_port,
            connectioncount: NETWORK_CONNECTION_COUNT,
            passcode: generate_random_string(INSTANCE_ID_LENGTH),
            localhost: NETWORK_LOCALHOST.to_string(),
            localport: spec.local_port,
            heartbeatfrequency: NETWORK_HEARTBEAT_FREQUENCY_MS,
            heartbeatabsencethreshold: NETWORK_HEARTBEAT_ABSENCE_THRESHOLD_MS,
        }
    }
}

/// A role-free instance row stamped with the current time.
fn new_instance_row(
    element_key: i64,
    user_id: i64,
    name: &str,
    config: String,
    fog_uuid: Option<&str>,
) -> ElementInstance {
    let now = EpochMillis::now();
    ElementInstance {
        uuid: generate_instance_id(INSTANCE_ID_LENGTH),
        track_id: TRACK_INDEPENDENT,
        element_key,
        config,
        name: name.to_string(),
        last_updated: now,
        config_last_updated: now,
        updated_by: Some(user_id),
        is_stream_viewer: false,
        is_debug_console: false,
        is_manager: false,
        is_network: false,
        registry_id: None,
        rebuild: false,
        root_host_access: false,
        log_size: DEFAULT_LOG_SIZE,
        iofog_uuid: fog_uuid.map(str::to_string),
    }
}

impl ElementInstance {
    /// Creates a user-deployed instance of `element`.
    pub fn create_element_instance(
        conn: &mut SqliteConnection,
        element: &Element,
        spec: &ElementInstanceSpec,
    ) -> Result<ElementInstance, FogmanError> {
        let mut row = new_instance_row(
            element.id,
            spec.user_id,
            &spec.name,
            spec.config_json.clone(),
            spec.fog_uuid(),
        );
        row.track_id = spec.track_id;
        row.log_size = spec.log_size;
        row.registry_id = element.registry_id;

        let created = ElementInstance::insert_record(conn, &row)?;
        info!(
            "Created element instance {} of element {}",
            created.uuid, element.id
        );
        Ok(created)
    }

    /// Creates the stream viewer for a fog.
    pub fn create_stream_viewer_instance(
        conn: &mut SqliteConnection,
        element_key: i64,
        user_id: i64,
        fog_uuid: &str,
    ) -> Result<ElementInstance, FogmanError> {
        let config = StreamViewerConfig {
            accesstoken: generate_instance_id(INSTANCE_ID_LENGTH),
            foldersizelimit: STORAGE_SIZE_LIMIT,
        };
        let mut row = new_instance_row(
            element_key,
            user_id,
            STREAM_VIEWER_NAME,
            serde_json::to_string(&config)?,
            Some(fog_uuid),
        );
        row.is_stream_viewer = true;

        let created = ElementInstance::insert_record(conn, &row)?;
        info!("Created stream viewer {} on fog {fog_uuid}", created.uuid);
        Ok(created)
    }

    /// Creates the debug console for a fog.
    pub fn create_debug_console_instance(
        conn: &mut SqliteConnection,
        element_key: i64,
        user_id: i64,
        fog_uuid: &str,
    ) -> Result<ElementInstance, FogmanError> {
        let config = DebugConsoleConfig {
            accesstoken: generate_random_string(INSTANCE_ID_LENGTH),
            filesizelimit: STORAGE_SIZE_LIMIT,
        };
        let mut row = new_instance_row(
            element_key,
            user_id,
            DEBUG_CONSOLE_NAME,
            serde_json::to_string(&config)?,
            Some(fog_uuid),
        );
        row.is_debug_console = true;

        let created = ElementInstance::insert_record(conn, &row)?;
        info!("Created debug console {} on fog {fog_uuid}", created.uuid);
        Ok(created)
    }

    /// Creates one side of a satellite network bridge.
    pub fn create_network_instance(
        conn: &mut SqliteConnection,
        element: &Element,
        spec: &NetworkInstanceSpec,
    ) -> Result<ElementInstance, FogmanError> {
        let config = NetworkConfig::for_spec(spec);
        debug!(
            "Network instance {} for fog {}: {} mode via {}:{}",
            spec.name, spec.fog_uuid, config.mode, config.host, config.port
        );

        let mut row = new_instance_row(
            element.id,
            spec.user_id,
            &spec.name,
            serde_json::to_string(&config)?,
            Some(&spec.fog_uuid),
        );
        row.track_id = spec.track_id;
        row.registry_id = element.registry_id;
        row.is_network = true;

        let created = ElementInstance::insert_record(conn, &row)?;
        info!(
            "Created network instance {} on fog {}",
            created.uuid, spec.fog_uuid
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::db::test_fixtures::{seed_element, seed_fog, setup_test_db};

    fn network_spec(is_public: bool) -> NetworkInstanceSpec {
        NetworkInstanceSpecBuilder::default()
            .user_id(3)
            .fog_uuid("fog-a")
            .satellite_domain("sat.example.com")
            .satellite_port(4443)
            .name("bridge")
            .local_port(8080)
            .is_public(is_public)
            .track_id(9)
            .build()
            .expect("Failed to build network spec")
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn test_element_spec_requires_fields() {
            let result = ElementInstanceSpecBuilder::default().build();
            assert_matches!(result, Err(InstanceSpecError::UninitialisedFields(_)));

            let result = ElementInstanceSpecBuilder::default().user_id(1).build();
            assert_matches!(result, Err(InstanceSpecError::UninitialisedFields(msg)) if msg.contains("name"));
        }

        #[test]
        fn test_element_spec_defaults() {
            let spec = ElementInstanceSpecBuilder::default()
                .user_id(1)
                .name("sensor")
                .build()
                .unwrap();
            assert_eq!(spec.track_id(), TRACK_INDEPENDENT);
            assert_eq!(spec.log_size(), DEFAULT_LOG_SIZE);
            assert_eq!(spec.fog_uuid(), None);
            assert_eq!(spec.config_json, "{}");
        }

        #[test]
        fn test_element_spec_rejects_negative_log_size() {
            let result = ElementInstanceSpecBuilder::default()
                .user_id(1)
                .name("sensor")
                .log_size(-1)
                .build();
            assert_matches!(result, Err(InstanceSpecError::NegativeLogSize(-1)));
        }

        #[test]
        fn test_network_spec_requires_fields() {
            let result = NetworkInstanceSpecBuilder::default()
                .user_id(1)
                .fog_uuid("fog-a")
                .build();
            assert_matches!(result, Err(InstanceSpecError::UninitialisedFields(_)));
        }

        #[test]
        fn test_network_mode_parse() {
            assert_eq!("public".parse::<NetworkMode>().unwrap(), NetworkMode::Public);
            assert_eq!("private".parse::<NetworkMode>().unwrap(), NetworkMode::Private);
            assert_matches!(
                "PUBLIC".parse::<NetworkMode>(),
                Err(ParseError::InvalidNetworkMode { mode }) if mode == "PUBLIC"
            );
            assert_eq!(NetworkMode::from_public(false).to_string(), "private");
        }
    }

    #[test]
    fn test_create_element_instance() {
        let mut conn = setup_test_db();
        let mut element = seed_element(&mut conn, 1, "sensor", "acme");
        element.registry_id = Some(4);
        seed_fog(&mut conn, "fog-a");

        let spec = ElementInstanceSpecBuilder::default()
            .user_id(7)
            .track_id(2)
            .name("temperature")
            .config(serde_json::json!({"interval": 5}))
            .log_size(20)
            .fog_uuid("fog-a")
            .build()
            .unwrap();

        let created = ElementInstance::create_element_instance(&mut conn, &element, &spec).unwrap();
        assert_eq!(created.uuid.len(), INSTANCE_ID_LENGTH);
        assert_eq!(created.element_key, 1);
        assert_eq!(created.track_id, 2);
        assert_eq!(created.name, "temperature");
        assert_eq!(created.log_size, 20);
        assert_eq!(created.updated_by, Some(7));
        assert_eq!(created.registry_id, Some(4));
        assert_eq!(created.iofog_uuid.as_deref(), Some("fog-a"));
        assert_eq!(created.role(), None);
        assert!(!created.rebuild);
        assert!(!created.root_host_access);
        assert_eq!(created.last_updated, created.config_last_updated);

        let config: serde_json::Value = serde_json::from_str(&created.config).unwrap();
        assert_eq!(config, serde_json::json!({"interval": 5}));

        let found = ElementInstance::find_by_uuid(&mut conn, &created.uuid)
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn test_create_generates_distinct_uuids() {
        let mut conn = setup_test_db();
        seed_fog(&mut conn, "fog-a");
        seed_element(&mut conn, 1, "viewer", "SYSTEM");

        let first =
            ElementInstance::create_stream_viewer_instance(&mut conn, 1, 1, "fog-a").unwrap();
        let second =
            ElementInstance::create_stream_viewer_instance(&mut conn, 1, 1, "fog-a").unwrap();
        assert_ne!(first.uuid, second.uuid);
    }

    #[test]
    fn test_create_stream_viewer_instance() {
        let mut conn = setup_test_db();
        seed_fog(&mut conn, "fog-a");
        seed_element(&mut conn, 5, "viewer", "SYSTEM");

        let created =
            ElementInstance::create_stream_viewer_instance(&mut conn, 5, 2, "fog-a").unwrap();
        assert_eq!(created.name, STREAM_VIEWER_NAME);
        assert_eq!(created.track_id, TRACK_INDEPENDENT);
        assert_eq!(created.log_size, DEFAULT_LOG_SIZE);
        assert_eq!(created.registry_id, None);
        assert_eq!(created.role(), Some("stream-viewer"));

        let config: StreamViewerConfig = serde_json::from_str(&created.config).unwrap();
        assert_eq!(config.accesstoken.len(), INSTANCE_ID_LENGTH);
        assert_eq!(config.foldersizelimit, 200.0);
        assert!(created.config.contains(r#""foldersizelimit":200.0"#));
    }

    #[test]
    fn test_debug_console_round_trip_through_properties() {
        let mut conn = setup_test_db();
        seed_fog(&mut conn, "fog-a");
        seed_element(&mut conn, 6, "console", "SYSTEM");

        let created =
            ElementInstance::create_debug_console_instance(&mut conn, 6, 2, "fog-a").unwrap();
        let config: DebugConsoleConfig = serde_json::from_str(&created.config).unwrap();
        assert_eq!(config.filesizelimit, 200.0);

        let props =
            ElementInstance::get_element_instance_properties(&mut conn, &created.uuid).unwrap();
        assert_eq!(props.len(), 1);
        assert!(props[0].is_debug_console);
        assert!(!props[0].is_stream_viewer);
        assert_eq!(props[0].element_instance_name, DEBUG_CONSOLE_NAME);

        let stored: DebugConsoleConfig = serde_json::from_str(&props[0].config).unwrap();
        assert_eq!(stored.accesstoken, config.accesstoken);
    }

    #[test]
    fn test_create_network_instance_public_and_private() {
        let mut conn = setup_test_db();
        seed_fog(&mut conn, "fog-a");
        let element = seed_element(&mut conn, 8, "network", "SYSTEM");

        for (is_public, expected) in [(true, NetworkMode::Public), (false, NetworkMode::Private)] {
            let created =
                ElementInstance::create_network_instance(&mut conn, &element, &network_spec(is_public))
                    .unwrap();
            assert_eq!(created.role(), Some("network"));
            assert_eq!(created.track_id, 9);
            assert_eq!(created.name, "bridge");
            assert_eq!(created.log_size, DEFAULT_LOG_SIZE);

            let config: NetworkConfig = serde_json::from_str(&created.config).unwrap();
            assert_eq!(config.mode, expected);
            assert_eq!(config.host, "sat.example.com");
            assert_eq!(config.port, 4443);
            assert_eq!(config.connectioncount, 60);
            assert_eq!(config.passcode.len(), INSTANCE_ID_LENGTH);
            assert_eq!(config.localhost, "iofog");
            assert_eq!(config.localport, 8080);
            assert_eq!(config.heartbeatfrequency, 20_000);
            assert_eq!(config.heartbeatabsencethreshold, 60_000);
        }

        let raw = ElementInstance::find_by_track_id(&mut conn, 9).unwrap();
        assert!(raw.iter().any(|i| i.config.contains(r#""mode":"public""#)));
        assert!(raw.iter().any(|i| i.config.contains(r#""mode":"private""#)));
    }

    #[test]
    fn test_create_for_unknown_fog_fails() {
        let mut conn = setup_test_db();
        seed_element(&mut conn, 5, "viewer", "SYSTEM");

        let result = ElementInstance::create_stream_viewer_instance(&mut conn, 5, 1, "ghost");
        assert_matches!(
            result,
            Err(FogmanError::DatabaseError(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation,
                _
            )))
        );
    }
}
