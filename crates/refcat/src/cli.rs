//! Clap derive structures for the `refcat` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// refcat -- reference-data catalogue CLI
#[derive(Debug, Parser)]
#[command(
    name = "refcat",
    version,
    about = "Browse and manage the reference-data catalogue from the command line",
    long_about = "Lists, searches and edits the data types and data points that\n\
        populate dropdowns and radio groups across case-management forms.\n\n\
        When the catalogue service is unreachable, read commands that back a\n\
        form control fall back to a built-in snapshot and say so.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Catalogue profile to use
    #[arg(long, short = 'p', env = "REFCAT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL, e.g. http://localhost:8000/api/v1 (overrides profile)
    #[arg(long, env = "REFCAT_API_BASE_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REFCAT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "REFCAT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "REFCAT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect data types (categories of selectable values)
    #[command(alias = "t")]
    Types(TypesArgs),

    /// Manage data points (the values inside a type)
    #[command(alias = "pt")]
    Points(PointsArgs),

    /// Preview the options a form control would offer for a type
    #[command(alias = "ch")]
    Choices(ChoicesArgs),

    /// Show catalogue service health and per-type counts
    Status,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TYPES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TypesArgs {
    #[command(subcommand)]
    pub command: TypesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TypesCommand {
    /// List active data types
    #[command(alias = "ls")]
    List,

    /// Show one data type with all of its points
    Show {
        /// Data type name, e.g. contact_methods
        name: String,
    },

    /// Ask the service to seed its default types and points
    Seed,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POINTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PointsArgs {
    #[command(subcommand)]
    pub command: PointsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PointsCommand {
    /// List the points of a data type
    #[command(alias = "ls")]
    List {
        /// Data type name
        data_type: String,

        /// Include inactive points
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Create a data point
    Create {
        /// Data type name
        data_type: String,

        /// Stored value (unique within the type)
        name: String,

        /// Human-readable label
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Position within the type (ascending)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        sort_order: i32,

        /// Create the point inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update fields of a data point
    Update {
        /// Data point ID
        id: String,

        /// New stored value
        #[arg(long)]
        name: Option<String>,

        /// New label
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New position
        #[arg(long, allow_negative_numbers = true)]
        sort_order: Option<i32>,

        /// Activate or deactivate
        #[arg(long, action = clap::ArgAction::Set)]
        active: Option<bool>,
    },

    /// Delete a data point
    #[command(alias = "rm")]
    Delete {
        /// Data point ID
        id: String,
    },

    /// Search points by name or label
    Search {
        /// Text to search for
        query: String,

        /// Restrict to one data type
        #[arg(long, short = 't')]
        data_type: Option<String>,
    },

    /// Create many points in one request
    Bulk {
        /// Data type name
        data_type: String,

        /// JSON file holding an array of {name, description, sort_order, is_active}
        #[arg(long, short = 'f')]
        from_file: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHOICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ChoicesArgs {
    /// Data type name
    pub data_type: String,

    /// Control variant to preview
    #[arg(long, short = 's', default_value = "select")]
    pub style: ChoiceStyle,

    /// Lay radio options out in a row
    #[arg(long)]
    pub horizontal: bool,

    /// Offer a free-text "Other" option
    #[arg(long)]
    pub other: bool,

    /// Placeholder text for the select variant
    #[arg(long)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChoiceStyle {
    /// Dropdown with a placeholder entry
    Select,
    /// Radio group
    Radio,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key: api_base_url, timeout, insecure, ca_cert
        key: String,

        /// Value to set
        value: String,
    },

    /// Print the config file path
    Path,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
