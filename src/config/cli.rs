use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "clubdesk")]
#[command(about = "Club membership dashboard and broadcast tool")]
pub struct CliArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "clubdesk.toml")]
    pub config: String,

    /// Enable verbose output.
    #[arg(long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print every dashboard view as JSON.
    Aggregates,
    /// List the clubs present in the current snapshot.
    Clubs,
    /// Broadcast a message to the recipients of a target.
    Send {
        #[arg(long)]
        text: String,
        /// "All Students", "<name> Board", or a club name.
        #[arg(long)]
        target: String,
        #[arg(long)]
        sent_by: String,
    },
    /// Print the message history, newest first.
    Messages,
}
