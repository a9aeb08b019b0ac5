//! Data type command handlers.

use std::fmt::Write as _;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use refcat_core::model::display_timestamp;
use refcat_core::{Catalogue, CoreError, DataType};

use crate::cli::{GlobalOpts, TypesArgs, TypesCommand};
use crate::error::CliError;
use crate::output;

use super::points::PointRow;
use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&DataType> for TypeRow {
    fn from(t: &DataType) -> Self {
        Self {
            name: t.name.clone(),
            display_name: t.display_name.clone(),
            description: t.description.clone().unwrap_or_default(),
            updated: display_timestamp(t.updated_at.as_deref()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    catalogue: &Catalogue,
    args: TypesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = catalogue.client();
    match args.command {
        TypesCommand::List => {
            let types = util::with_spinner("Loading data types", global, client.list_types())
                .await
                .map_err(CoreError::from)?;
            let out = output::render_list(
                &global.output,
                &types,
                |t| TypeRow::from(t),
                |t| t.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TypesCommand::Show { name } => {
            let detail =
                util::with_spinner("Loading data type", global, client.get_type_with_points(&name))
                    .await
                    .map_err(|e| {
                        if e.is_not_found() {
                            CliError::NotFound {
                                resource_type: "data type".into(),
                                identifier: name.clone(),
                                list_command: "types list".into(),
                            }
                        } else {
                            CoreError::from(e).into()
                        }
                    })?;

            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &detail,
                |d| {
                    let mut text = String::new();
                    let t = &d.data_type;
                    let _ = writeln!(text, "{} ({})", t.display_name, t.name);
                    if let Some(ref desc) = t.description {
                        let _ = writeln!(text, "{desc}");
                    }
                    let _ = writeln!(text, "ID: {}", t.id);
                    let _ = writeln!(text);
                    let rows: Vec<PointRow> =
                        d.data_points.iter().map(|p| PointRow::new(p, color)).collect();
                    let _ = write!(text, "{}", Table::new(rows).with(Style::rounded()));
                    text
                },
                |d| d.data_type.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TypesCommand::Seed => {
            if !util::confirm(
                "Seed the catalogue with its default data types and points?",
                global.yes,
            )? {
                return Ok(());
            }
            let message =
                util::with_spinner("Seeding defaults", global, client.initialize_defaults())
                    .await
                    .map_err(CoreError::from)?;
            util::note(
                if message.is_empty() {
                    "Defaults initialized"
                } else {
                    &message
                },
                global,
            );
            Ok(())
        }
    }
}
