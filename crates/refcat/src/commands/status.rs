//! `status` handler.

use std::fmt::Write as _;

use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use refcat_core::api::CatalogueStatus;
use refcat_core::{Catalogue, CoreError};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct TypeCountRow {
    #[tabled(rename = "Type")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Points")]
    points: u32,
    #[tabled(rename = "Status")]
    status: String,
}

fn detail(status: &CatalogueStatus, color: bool) -> String {
    let mut out = String::new();
    let state = if !color {
        status.status.clone()
    } else if status.is_operational() {
        status.status.green().to_string()
    } else {
        status.status.red().to_string()
    };
    let _ = writeln!(out, "Status:      {state}");
    if let Some(ref err) = status.error {
        let _ = writeln!(out, "Error:       {err}");
    }
    if let Some(n) = status.total_data_types {
        let _ = writeln!(out, "Data types:  {n}");
    }
    if let Some(n) = status.total_data_points {
        let _ = writeln!(out, "Data points: {n}");
    }
    if !status.data_types.is_empty() {
        let rows: Vec<TypeCountRow> = status
            .data_types
            .iter()
            .map(|(name, t)| TypeCountRow {
                name: name.clone(),
                display_name: t.display_name.clone(),
                points: t.points_count,
                status: output::active_badge(t.is_active, color),
            })
            .collect();
        let _ = writeln!(out);
        let _ = write!(out, "{}", Table::new(rows).with(Style::rounded()));
    }
    out.trim_end().to_owned()
}

pub async fn handle(catalogue: &Catalogue, global: &GlobalOpts) -> Result<(), CliError> {
    let status = util::with_spinner("Checking catalogue", global, catalogue.client().status())
        .await
        .map_err(CoreError::from)?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &status,
        |s| detail(s, color),
        |s| s.status.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
