//! CLI command definitions.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create a starter build spec
    Init,

    /// Validate a build spec
    Validate {
        /// Path to the build spec (defaults to the configured spec path)
        path: Option<String>,
    },

    /// Show which jobs an event triggers
    Match {
        /// Path to the build spec
        path: Option<String>,

        /// JSON file describing the event
        #[arg(short, long)]
        event: String,
    },

    /// Print the build query selecting a job's builds at a commit
    Query {
        /// Commit id
        #[arg(short, long)]
        commit: String,

        /// Job name
        #[arg(short, long)]
        job: String,
    },

    /// Print jobs in dependency order
    Plan {
        /// Path to the build spec
        path: Option<String>,
    },

    /// Print the retry schedule of a job
    Retries {
        /// Path to the build spec
        path: Option<String>,

        /// Job name or `jobs/<name>` selection
        #[arg(short, long)]
        job: String,
    },

    /// Print upcoming schedule trigger fire times
    Schedule {
        /// Path to the build spec
        path: Option<String>,
    },

    /// Print the JSON schema of the build spec format
    Schema,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
