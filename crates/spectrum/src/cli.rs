//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// Spectrum - ask several AI providers at once
///
/// Sends one query to every active provider through the aggregation service
/// and shows the answers side by side, with optional cross-model insights.
#[derive(Parser, Debug)]
#[command(name = "spectrum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Aggregation service URL (overrides config and SPECTRUM_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List providers and models offered by the aggregation service
    Models,

    /// API key management (add, list, remove, model)
    Keys(KeysCommand),

    /// Choose which providers take part in queries
    Providers(ProvidersCommand),

    /// Ask every active provider one question
    Ask(AskArgs),

    /// Interactive session with follow-ups, retry, insights and export
    Chat {
        /// Request an inline summary with every round
        #[arg(short, long)]
        summarize: bool,
    },

    /// Show recent queries
    History,

    /// Inline summary setting (on, off, status)
    Summary(SummaryCommand),

    /// Configuration (show, path, init)
    Config(ConfigCommand),

    /// Run diagnostics
    Doctor,

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Key Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct KeysCommand {
    #[command(subcommand)]
    pub action: KeysAction,
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Validate and store an API key, then activate the provider
    Add {
        /// Provider ID (e.g. openai, anthropic)
        provider: String,

        /// API key (prompted for when omitted)
        #[arg(short, long)]
        key: Option<String>,

        /// Model to use for this provider
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List stored keys (masked)
    List,

    /// Delete a stored key and deactivate the provider
    Remove {
        /// Provider ID
        provider: String,
    },

    /// Select the model used for a provider
    Model {
        /// Provider ID
        provider: String,

        /// Model ID from `spectrum models`
        model: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ProvidersCommand {
    #[command(subcommand)]
    pub action: ProvidersAction,
}

#[derive(Subcommand, Debug)]
pub enum ProvidersAction {
    /// Show providers with key and activation status
    List,

    /// Include a provider in queries (requires a stored key)
    Enable {
        /// Provider ID
        provider: String,
    },

    /// Exclude a provider from queries
    Disable {
        /// Provider ID
        provider: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Query Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Request an inline summary for this query
    #[arg(short, long)]
    pub summarize: bool,

    /// Generate cross-model insights after the answers arrive
    #[arg(short, long)]
    pub insights: bool,

    /// Export the results (json, markdown, csv)
    #[arg(short, long, value_name = "FORMAT")]
    pub export: Option<String>,
}

impl AskArgs {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct SummaryCommand {
    #[command(subcommand)]
    pub action: SummaryAction,
}

#[derive(Subcommand, Debug)]
pub enum SummaryAction {
    /// Request an inline summary with every query
    On,

    /// Stop requesting inline summaries
    Off,

    /// Show the current setting
    Status,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
