//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keydesk_domain::{DEFAULT_PORT, DEFAULT_THRESHOLD, DEFAULT_TOP_K, ModelType, SearchTarget};

/// Keydesk: manage a key-value store through its REST service.
#[derive(Debug, Parser)]
#[command(name = "keydesk", about, version)]
pub struct Cli {
    /// Base URL of the REST service (overrides settings and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory where exports are written
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage connection profiles
    Connections {
        #[command(subcommand)]
        action: ConnectionsCommand,
    },

    /// List keys of the active connection
    Keys {
        /// Glob pattern (`*` and `?`), default `*`
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Show a record
    Get {
        /// Record key
        key: String,
    },

    /// Create or replace a record
    Put(PutArgs),

    /// Delete a record
    Rm {
        /// Record key
        key: String,
    },

    /// Edit one field of a record
    Edit {
        /// Record key
        key: String,
        /// Field to edit
        field: String,
        /// New field name
        #[arg(long)]
        rename: Option<String>,
        /// New value, parsed as JSON when possible
        #[arg(long)]
        value: Option<String>,
    },

    /// Remove one field of a record
    Unset {
        /// Record key
        key: String,
        /// Field to remove
        field: String,
    },

    /// Add a field with a generated name to a record
    AddField {
        /// Record key
        key: String,
        /// Value, parsed as JSON when possible
        #[arg(long)]
        value: String,
    },

    /// Export matching records to a JSON file
    Export {
        /// Glob pattern, default `*`
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Semantic search within a sub-collection
    Search(SearchArgs),

    /// Manage inference model profiles
    Models {
        #[command(subcommand)]
        action: ModelsCommand,
    },
}

/// `connections` actions.
#[derive(Debug, Subcommand)]
pub enum ConnectionsCommand {
    /// List profiles, marking the active one
    List,

    /// Create or replace a profile
    Save {
        /// Profile name
        name: String,
        /// Store host
        #[arg(long)]
        host: String,
        /// Store port
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Store password
        #[arg(long)]
        password: Option<String>,
        /// Database index
        #[arg(long, default_value_t = 0)]
        db: u32,
    },

    /// Make a profile the active one
    Use {
        /// Profile name
        name: String,
    },

    /// Delete a profile
    Remove {
        /// Profile name
        name: String,
    },
}

/// Arguments of `put`.
#[derive(Debug, Args)]
pub struct PutArgs {
    /// Record key
    pub key: String,

    /// Field as NAME=VALUE; VALUE is parsed as JSON when possible
    #[arg(long = "field", value_parser = parse_key_val)]
    pub fields: Vec<(String, String)>,

    /// Text file added as a field named after the file
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// JSON object file holding the whole record
    #[arg(long, conflicts_with = "fields")]
    pub import: Option<PathBuf>,
}

/// Arguments of `search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Sub-collection to search
    pub collection: String,

    /// Query text
    pub query: String,

    /// Maximum number of matches
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: u32,

    /// Minimum similarity
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Side of each pair to match against
    #[arg(long, value_enum, default_value_t = TargetArg::Question)]
    pub target: TargetArg,
}

/// `models` actions.
#[derive(Debug, Subcommand)]
pub enum ModelsCommand {
    /// List profiles, marking the current one
    List,

    /// Create a profile, or update one with `--edit`
    Save {
        /// Profile name
        name: String,
        /// Endpoint URL
        #[arg(long, required_unless_present = "edit")]
        url: Option<String>,
        /// API key; when editing, omit it to keep the stored key
        #[arg(long)]
        api_key: Option<String>,
        /// Model kind
        #[arg(long = "type", value_enum)]
        model_type: Option<ModelTypeArg>,
        /// Update an existing profile
        #[arg(long)]
        edit: bool,
    },

    /// Show a profile with its API key masked
    Show {
        /// Profile name
        name: String,
    },

    /// Make a profile the current model
    Use {
        /// Profile name
        name: String,
    },

    /// Delete a profile
    Remove {
        /// Profile name
        name: String,
    },

    /// Show the current model
    Current,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// Match field names
    Question,
    /// Match field values
    Answer,
}

impl From<TargetArg> for SearchTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Question => Self::Question,
            TargetArg::Answer => Self::Answer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelTypeArg {
    /// Chat completion
    Chat,
    /// Embeddings
    Embedding,
}

impl From<ModelTypeArg> for ModelType {
    fn from(arg: ModelTypeArg) -> Self {
        match arg {
            ModelTypeArg::Chat => Self::Chat,
            ModelTypeArg::Embedding => Self::Embedding,
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid NAME=VALUE: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
