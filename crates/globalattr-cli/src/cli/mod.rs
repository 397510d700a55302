//! # CLI Behavior
//!
//! The only place that knows about terminal I/O, exit codes and output
//! formatting.
//!
//! - `ga` with no subcommand lists attributes.
//! - `--json` on `list` and `show` prints the API result as JSON instead of
//!   the styled text form.
//! - `--data <dir>` selects the data directory; see [`globalattr::init`].
//!
//! ## Module Structure
//!
//! - `commands`: context setup, dispatch and per-command handlers
//! - `render`: text output for attribute lists and documents
//! - `setup`: argument parsing via clap

mod commands;
mod render;
pub mod setup;

pub use commands::run;
