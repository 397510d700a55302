//! # Configuration
//!
//! Managed by [`clapfig`]: layered loading from `globalattr.toml` files and
//! compiled defaults. See [`crate::init`] for the search paths.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `single_line_save` | `false` | Save GA documents as compact single-line JSON instead of tab-indented JSON |
//! | `data_dir` | unset | Workspace data directory; GA files live under `<data_dir>/storage/ga/` |

use std::path::PathBuf;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::store::SaveFormat;

/// Configuration for the GA store, stored in `globalattr.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct GaConfig {
    /// Write GA documents on a single line.
    #[config(default = false)]
    #[serde(default)]
    pub single_line_save: bool,

    /// Workspace data directory.
    pub data_dir: Option<PathBuf>,
}

impl GaConfig {
    pub fn save_format(&self) -> SaveFormat {
        SaveFormat::from_single_line(self.single_line_save)
    }
}
