// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use comfy_table::{Cell, Color, Table};
use fogman::db::{
    ActiveElementInstance, ElementInstance, ElementInstanceDetails, ElementInstanceProperties,
    StraceState,
};

pub(crate) struct InstanceTable(Table);

fn or_none(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

fn heading(title: &str) -> Cell {
    Cell::new(title)
        .add_attribute(comfy_table::Attribute::Bold)
        .add_attribute(comfy_table::Attribute::Underlined)
        .fg(Color::Green)
}

impl InstanceTable {
    pub(crate) fn new_instance(instance: &ElementInstance) -> Self {
        let mut table = Table::new();

        table.load_preset(comfy_table::presets::NOTHING);
        table.set_header(vec![heading("Element Instance")]);

        table.add_row(vec!["UUID:", &instance.uuid]);
        table.add_row(vec!["Name:", &instance.name]);
        table.add_row(vec!["Element:", &instance.element_key.to_string()]);
        table.add_row(vec!["Track:", &instance.track_id.to_string()]);
        table.add_row(vec!["Fog:", &or_none(instance.iofog_uuid.as_ref())]);
        table.add_row(vec!["Role:", instance.role().unwrap_or("None")]);
        table.add_row(vec!["Config:", &instance.config]);
        table.add_row(vec!["Log Size:", &instance.log_size.to_string()]);
        table.add_row(vec!["Rebuild:", &instance.rebuild.to_string()]);
        table.add_row(vec![
            "Root Host Access:",
            &instance.root_host_access.to_string(),
        ]);
        table.add_row(vec!["Registry:", &or_none(instance.registry_id)]);
        table.add_row(vec!["Updated By:", &or_none(instance.updated_by)]);
        table.add_row(vec!["Last Updated:", &instance.last_updated.to_string()]);
        table.add_row(vec![
            "Config Last Updated:",
            &instance.config_last_updated.to_string(),
        ]);

        InstanceTable(table)
    }

    /// Element columns of an instance. Every row describes the same
    /// element, so only the fog types differ.
    pub(crate) fn new_element(properties: &[ElementInstanceProperties]) -> Option<Self> {
        let first = properties.first()?;
        let mut table = Table::new();

        table.load_preset(comfy_table::presets::NOTHING);
        table.set_header(vec![heading("Element")]);

        table.add_row(vec!["Id:", &or_none(first.element_id)]);
        table.add_row(vec!["Name:", &or_none(first.element_name.as_ref())]);
        table.add_row(vec![
            "Description:",
            &or_none(first.element_description.as_ref()),
        ]);
        table.add_row(vec!["Category:", &or_none(first.element_category.as_ref())]);
        table.add_row(vec!["Image:", &or_none(first.container_image.as_ref())]);
        table.add_row(vec!["Publisher:", &or_none(first.publisher.as_ref())]);
        table.add_row(vec!["Picture:", &or_none(first.picture.as_ref())]);

        let fog_types: Vec<String> = properties
            .iter()
            .filter_map(|p| p.fog_type_id)
            .map(|id| id.to_string())
            .collect();
        if fog_types.is_empty() {
            table.add_row(vec!["Fog Types:", "None"]);
        } else {
            table.add_row(vec!["Fog Types:", &fog_types.join(", ")]);
        }

        Some(InstanceTable(table))
    }

    pub(crate) fn new_fog_list() -> Self {
        let mut table = Table::new();

        table.load_preset(comfy_table::presets::NOTHING);
        table.set_header(vec!["UUID", "Name", "Element", "Track", "Role", "Track Active"]);
        InstanceTable(table)
    }

    pub(crate) fn add_row_fog_list(&mut self, active: &ActiveElementInstance) {
        let instance = &active.instance;
        self.0.add_row(vec![
            instance.uuid.clone(),
            instance.name.clone(),
            instance.element_key.to_string(),
            instance.track_id.to_string(),
            instance.role().unwrap_or("").to_string(),
            active
                .is_activated
                .map_or_else(|| "-".to_string(), |a| a.to_string()),
        ]);
    }

    pub(crate) fn new_track_list() -> Self {
        let mut table = Table::new();

        table.load_preset(comfy_table::presets::NOTHING);
        table.set_header(vec!["UUID", "Name", "Element", "Fog", "Fog Type", "Log Size"]);
        InstanceTable(table)
    }

    pub(crate) fn add_row_track_list(&mut self, details: &ElementInstanceDetails) {
        self.0.add_row(vec![
            details.uuid.clone(),
            details.element_instance_name.clone(),
            details.element_name.clone(),
            details.fog_uuid.clone().unwrap_or_default(),
            details.fog_type_name.clone().unwrap_or_default(),
            details.log_size.to_string(),
        ]);
    }

    pub(crate) fn new_strace_status() -> Self {
        let mut table = Table::new();

        table.load_preset(comfy_table::presets::NOTHING);
        table.set_header(vec!["Element Instance", "Strace"]);
        InstanceTable(table)
    }

    pub(crate) fn add_row_strace_status(&mut self, state: &StraceState) {
        self.0.add_row(vec![
            state.element_instance_uuid.clone(),
            if state.strace_run { "on" } else { "off" }.to_string(),
        ]);
    }

    pub(crate) fn print(&self) {
        println!("{self}\n")
    }
}

impl std::fmt::Display for InstanceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
