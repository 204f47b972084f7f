// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use anyhow::{Context, bail};
use diesel::SqliteConnection;
use fogman::{
    FogmanError,
    db::{Element, ElementInstance},
    instances::{ElementInstanceSpecBuilder, NetworkInstanceSpecBuilder, NetworkMode},
};
use log::info;

use crate::{
    args::{
        CreateElementArgs, CreateNetworkArgs, CreateSubcommand, DeleteArgs, DeleteNetworkArgs,
        GetArgs, InstanceSubcommand, ListArgs,
    },
    table::InstanceTable,
};

impl InstanceSubcommand {
    pub(crate) fn execute(&self, conn: &mut SqliteConnection) -> anyhow::Result<()> {
        match self {
            InstanceSubcommand::Get(args) => execute_get(conn, args),
            InstanceSubcommand::List(args) => execute_list(conn, args),
            InstanceSubcommand::Create(create) => create.execute(conn),
            InstanceSubcommand::Delete(args) => execute_delete(conn, args),
            InstanceSubcommand::DeleteNetwork(args) => execute_delete_network(conn, args),
        }
    }
}

fn execute_get(conn: &mut SqliteConnection, args: &GetArgs) -> anyhow::Result<()> {
    let instance = ElementInstance::find_by_uuid(conn, &args.uuid)?
        .ok_or_else(|| FogmanError::InstanceNotFound(args.uuid.clone()))?;
    InstanceTable::new_instance(&instance).print();

    let properties = ElementInstance::get_element_instance_properties(conn, &args.uuid)?;
    if let Some(table) = InstanceTable::new_element(&properties) {
        table.print();
    }
    Ok(())
}

fn execute_list(conn: &mut SqliteConnection, args: &ListArgs) -> anyhow::Result<()> {
    match (&args.fog, args.track) {
        (Some(fog), _) => {
            let mut table = InstanceTable::new_fog_list();
            for active in ElementInstance::find_by_instance_id(conn, fog)? {
                table.add_row_fog_list(&active);
            }
            table.print();
        }
        (None, Some(track)) => {
            let mut table = InstanceTable::new_track_list();
            for details in ElementInstance::get_element_instance_details(conn, track)? {
                table.add_row_track_list(&details);
            }
            table.print();
        }
        (None, None) => bail!("either --fog or --track is required"),
    }
    Ok(())
}

impl CreateSubcommand {
    fn execute(&self, conn: &mut SqliteConnection) -> anyhow::Result<()> {
        let created = match self {
            CreateSubcommand::Element(args) => create_element(conn, args)?,
            CreateSubcommand::StreamViewer(args) => ElementInstance::create_stream_viewer_instance(
                conn,
                args.element_key,
                args.user_id,
                &args.fog,
            )?,
            CreateSubcommand::DebugConsole(args) => {
                ElementInstance::create_debug_console_instance(
                    conn,
                    args.element_key,
                    args.user_id,
                    &args.fog,
                )?
            }
            CreateSubcommand::Network(args) => create_network(conn, args)?,
        };
        InstanceTable::new_instance(&created).print();
        Ok(())
    }
}

fn create_element(
    conn: &mut SqliteConnection,
    args: &CreateElementArgs,
) -> anyhow::Result<ElementInstance> {
    let element = Element::find_record(conn, args.element)
        .with_context(|| format!("element {} not found", args.element))?;

    let mut builder = ElementInstanceSpecBuilder::default();
    builder
        .user_id(args.user_id)
        .name(args.name.as_str())
        .track_id(args.track_id);
    if let Some(config) = &args.config {
        builder.config(config.clone());
    }
    if let Some(log_size) = args.log_size {
        builder.log_size(log_size);
    }
    if let Some(fog) = &args.fog {
        builder.fog_uuid(fog.as_str());
    }

    let spec = builder.build()?;
    Ok(ElementInstance::create_element_instance(conn, &element, &spec)?)
}

fn create_network(
    conn: &mut SqliteConnection,
    args: &CreateNetworkArgs,
) -> anyhow::Result<ElementInstance> {
    let element = Element::find_record(conn, args.element)
        .with_context(|| format!("element {} not found", args.element))?;

    let spec = NetworkInstanceSpecBuilder::default()
        .user_id(args.user_id)
        .fog_uuid(args.fog.as_str())
        .satellite_domain(args.satellite_domain.as_str())
        .satellite_port(args.satellite_port)
        .name(args.name.as_str())
        .local_port(args.local_port)
        .is_public(args.mode == NetworkMode::Public)
        .track_id(args.track_id)
        .build()?;
    Ok(ElementInstance::create_network_instance(conn, &element, &spec)?)
}

fn execute_delete(conn: &mut SqliteConnection, args: &DeleteArgs) -> anyhow::Result<()> {
    if ElementInstance::delete_by_element_uuid(conn, &args.uuid)? == 0 {
        return Err(FogmanError::InstanceNotFound(args.uuid.clone()).into());
    }
    info!("Deleted element instance {}", args.uuid);
    println!("Deleted element instance {}", args.uuid);
    Ok(())
}

fn execute_delete_network(
    conn: &mut SqliteConnection,
    args: &DeleteNetworkArgs,
) -> anyhow::Result<()> {
    let deleted = ElementInstance::delete_network_element(conn, &args.element_id)?;
    println!(
        "Deleted {deleted} network instance(s) of {}",
        args.element_id
    );
    Ok(())
}
