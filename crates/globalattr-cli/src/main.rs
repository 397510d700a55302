//! # `ga`: Global Attribute CLI
//!
//! A thin client over the `globalattr` library. This file only invokes
//! `cli::run()` and handles process termination; everything user-facing
//! lives in `src/cli/`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/cli/)                                       │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal rendering (render.rs)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (globalattr::api::GaApi)                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI manages the GA catalog of one data directory. Views and blocks
//! belong to the host application, so column and block operations are not
//! exposed here.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
