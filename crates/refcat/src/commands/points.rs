//! Data point command handlers.

use tabled::Tabled;

use refcat_core::api::{BulkCreateRequest, NewDataPoint};
use refcat_core::model::display_timestamp;
use refcat_core::{
    Catalogue, CoreError, CreateDataPointRequest, DataPoint, EntityId, UpdateDataPointRequest,
};

use crate::cli::{GlobalOpts, PointsArgs, PointsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct PointRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Order")]
    order: i32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl PointRow {
    pub(super) fn new(p: &DataPoint, color: bool) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            label: p.description.clone().unwrap_or_default(),
            order: p.sort_order,
            status: output::active_badge(p.is_active, color),
            updated: display_timestamp(p.updated_at.as_deref()),
        }
    }
}

fn point_detail(p: &DataPoint, color: bool) -> String {
    [
        format!("ID:      {}", p.id),
        format!("Name:    {}", p.name),
        format!("Label:   {}", p.label()),
        format!("Order:   {}", p.sort_order),
        format!("Status:  {}", output::active_badge(p.is_active, color)),
        format!("Created: {}", display_timestamp(p.created_at.as_deref())),
        format!("Updated: {}", display_timestamp(p.updated_at.as_deref())),
    ]
    .join("\n")
}

fn print_points(points: &[DataPoint], global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        points,
        |p| PointRow::new(p, color),
        |p| p.name.clone(),
    );
    output::print_output(&out, global.quiet);
}

fn print_point(point: &DataPoint, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        point,
        |p| point_detail(p, color),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    catalogue: &Catalogue,
    args: PointsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = catalogue.client();
    match args.command {
        PointsCommand::List { data_type, all } => {
            let fetch = async {
                if all {
                    client.list_all_points(&data_type).await
                } else {
                    client.list_points(&data_type).await
                }
            };
            let mut points = util::with_spinner("Loading data points", global, fetch)
                .await
                .map_err(CoreError::from)?;
            refcat_core::model::sort_by_order(&mut points);
            print_points(&points, global);
            Ok(())
        }

        PointsCommand::Create {
            data_type,
            name,
            description,
            sort_order,
            inactive,
        } => {
            let data_type = util::resolve_type(catalogue, &data_type, global).await?;
            let req = CreateDataPointRequest {
                data_type_id: data_type.id,
                name,
                description: description.filter(|d| !d.trim().is_empty()),
                sort_order,
                is_active: !inactive,
                extra_data: None,
            };
            let created = util::with_spinner("Creating data point", global, client.create_point(&req))
                .await
                .map_err(CoreError::from)?;
            util::note("Data point created", global);
            print_point(&created, global);
            Ok(())
        }

        PointsCommand::Update {
            id,
            name,
            description,
            sort_order,
            active,
        } => {
            let req = UpdateDataPointRequest {
                name,
                description,
                sort_order,
                is_active: active,
                extra_data: None,
            };
            if req.is_empty() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass --name, --description, --sort-order or --active"
                        .into(),
                });
            }
            let id = EntityId::from(id);
            let updated =
                util::with_spinner("Updating data point", global, client.update_point(&id, &req))
                    .await
                    .map_err(|e| not_found_point(e, &id))?;
            util::note("Data point updated", global);
            print_point(&updated, global);
            Ok(())
        }

        PointsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Are you sure you want to delete data point '{id}'?"),
                global.yes,
            )? {
                return Ok(());
            }
            let id = EntityId::from(id);
            util::with_spinner("Deleting data point", global, client.delete_point(&id))
                .await
                .map_err(|e| not_found_point(e, &id))?;
            util::note("Data point deleted", global);
            Ok(())
        }

        PointsCommand::Search { query, data_type } => {
            let points = util::with_spinner(
                "Searching",
                global,
                client.search_points(&query, data_type.as_deref()),
            )
            .await
            .map_err(CoreError::from)?;
            print_points(&points, global);
            Ok(())
        }

        PointsCommand::Bulk {
            data_type,
            from_file,
        } => {
            let data_points: Vec<NewDataPoint> = util::read_json_file(&from_file)?;
            if data_points.is_empty() {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "expected a non-empty JSON array of data points".into(),
                });
            }
            let data_type = util::resolve_type(catalogue, &data_type, global).await?;
            let req = BulkCreateRequest {
                data_type_id: data_type.id,
                data_points,
            };
            let resp =
                util::with_spinner("Creating data points", global, client.bulk_create_points(&req))
                    .await
                    .map_err(CoreError::from)?;
            util::note(&format!("Created {} data points", resp.created_count), global);
            print_points(&resp.data_points, global);
            Ok(())
        }
    }
}

fn not_found_point(err: refcat_core::api::Error, id: &EntityId) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            resource_type: "data point".into(),
            identifier: id.to_string(),
            list_command: "points list <data-type> --all".into(),
        }
    } else {
        CoreError::from(err).into()
    }
}
