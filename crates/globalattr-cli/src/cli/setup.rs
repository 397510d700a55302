use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ga", bin_name = "ga", version, disable_help_subcommand = true)]
#[command(about = "Manage global attributes shared across attribute views", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (GA files live under <DATA>/storage/ga)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub data: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List builtin and stored global attributes
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a global attribute
    #[command(alias = "n", display_order = 2)]
    Create {
        /// Attribute name
        name: String,

        /// Value type (text, number, date, select, mSelect, url, email, phone, checkbox, ...)
        #[arg(short = 't', long = "type", default_value = "text")]
        kind: String,

        /// Explicit id (a node id is generated when omitted)
        #[arg(long)]
        id: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        /// Description
        #[arg(long)]
        desc: Option<String>,

        /// Select option, as NAME or NAME:COLOR (repeatable)
        #[arg(short, long = "option")]
        options: Vec<String>,

        /// Mirror values onto blocks as custom-<name> inline attributes
        #[arg(long)]
        custom: bool,
    },

    /// Show one global attribute with its values
    #[command(alias = "v", display_order = 3)]
    Show {
        id: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a global attribute
    #[command(alias = "rm", display_order = 4)]
    Delete { id: String },

    /// Show the resolved configuration
    #[command(display_order = 10)]
    Config,
}
