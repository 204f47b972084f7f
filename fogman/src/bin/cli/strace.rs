// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use std::{collections::BTreeMap, io::Write as _};

use diesel::SqliteConnection;
use fogman::strace::{
    PushBufferRequest, SwitchStraceRequest, get_strace_values_for_fog, pop_buffer_by_element_id,
    push_buffer_for_elements, switch_strace_for_element,
};

use crate::{args::StraceSubcommand, table::InstanceTable};

impl StraceSubcommand {
    pub(crate) fn execute(&self, conn: &mut SqliteConnection) -> anyhow::Result<()> {
        match self {
            StraceSubcommand::Switch(args) => {
                let request = SwitchStraceRequest {
                    fog_uuid: args.fog.clone(),
                    instance_uuid: args.instance.clone(),
                    strace: args.enable && !args.disable,
                };
                let row = switch_strace_for_element(conn, &request)?;
                println!(
                    "Strace {} for {}",
                    if row.strace_run { "enabled" } else { "disabled" },
                    row.element_instance_uuid
                );
            }
            StraceSubcommand::Push(args) => {
                let request = PushBufferRequest {
                    strace_data: BTreeMap::from([(args.instance.clone(), args.chunk.clone())]),
                };
                let appended = push_buffer_for_elements(conn, &request)?;
                println!("Appended {appended} buffer(s)");
            }
            StraceSubcommand::Pop(args) => {
                let buffer = pop_buffer_by_element_id(conn, &args.instance)?;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(buffer.as_bytes())?;
                stdout.flush()?;
            }
            StraceSubcommand::Status(args) => {
                let mut table = InstanceTable::new_strace_status();
                for state in get_strace_values_for_fog(conn, &args.fog)? {
                    table.add_row_strace_status(&state);
                }
                table.print();
            }
        }
        Ok(())
    }
}
