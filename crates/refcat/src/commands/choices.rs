//! `choices` handler: render the options a form control would offer.
//!
//! Runs the same retrieval as an embedded control, so an unreachable
//! service yields the built-in fallback options (flagged as degraded).

use serde::Serialize;
use tabled::Tabled;

use refcat_core::{Catalogue, ChoiceProps, ChoiceVariant, ChoiceView, RadioLayout};

use crate::cli::{ChoiceStyle, ChoicesArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

/// Serializable form of a rendered control.
#[derive(Debug, Serialize)]
struct ChoicePreview {
    data_type: String,
    variant: &'static str,
    degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    options: Vec<PreviewOption>,
}

#[derive(Debug, Serialize, Tabled)]
struct PreviewOption {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Label")]
    label: String,
}

fn props_for(args: &ChoicesArgs) -> ChoiceProps {
    let props = match args.style {
        ChoiceStyle::Select => ChoiceProps::select(&args.data_type),
        ChoiceStyle::Radio => {
            let layout = if args.horizontal {
                RadioLayout::Horizontal
            } else {
                RadioLayout::Vertical
            };
            ChoiceProps::radio(&args.data_type, layout)
        }
    };
    let props = props.include_other(args.other).show_error(true);
    match args.placeholder {
        Some(ref text) => props.placeholder(text),
        None => props,
    }
}

/// Draw the control the way a form would show it.
fn draw(view: &ChoiceView) -> String {
    let mut lines: Vec<String> = match view.variant {
        ChoiceVariant::Select => view
            .options
            .iter()
            .map(|opt| {
                let marker = if opt.is_placeholder() { "▾" } else { " " };
                format!("{marker} {}", opt.label)
            })
            .collect(),
        ChoiceVariant::Radio { layout } => {
            let items = view.options.iter().map(|o| format!("( ) {}", o.label));
            match layout {
                RadioLayout::Horizontal => vec![items.collect::<Vec<_>>().join("   ")],
                RadioLayout::Vertical => items.collect(),
            }
        }
    };
    if view.options.iter().any(|o| o.is_other()) {
        lines.push(format!(
            "  (choosing Other asks for: {})",
            view.other_placeholder
        ));
    }
    lines.join("\n").trim_end().to_owned()
}

pub async fn handle(
    catalogue: &Catalogue,
    args: ChoicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let control = catalogue.choice(props_for(&args));
    let mut stream = control.subscribe();
    util::with_spinner("Loading options", global, stream.settled()).await;
    let view = control.view();

    if view.degraded {
        output::warn_line(
            "Catalogue service unavailable; showing built-in fallback options",
            global,
        );
    }

    let preview = ChoicePreview {
        data_type: args.data_type.clone(),
        variant: match view.variant {
            ChoiceVariant::Select => "select",
            ChoiceVariant::Radio { .. } => "radio",
        },
        degraded: view.degraded,
        error: view.error.clone(),
        options: view
            .options
            .iter()
            .filter(|o| !o.is_placeholder())
            .map(|o| PreviewOption {
                value: o.value.clone(),
                label: o.label.clone(),
            })
            .collect(),
    };

    let out = match global.output {
        OutputFormat::Table => draw(&view),
        OutputFormat::Plain => preview
            .options
            .iter()
            .map(|o| o.value.clone())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => output::render_single(&global.output, &preview, |_| String::new(), |_| String::new()),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
