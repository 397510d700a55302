//! # Workspace Resolution
//!
//! [`initialize`] builds a ready [`GaApi`] over the filesystem store.
//!
//! ## Data Directory
//!
//! The first of these wins:
//!
//! 1. The explicit `data_override` (the CLI's `--data`).
//! 2. The `GLOBALATTR_DATA` environment variable.
//! 3. `data_dir` from `globalattr.toml`.
//! 4. The OS data directory (via the `directories` crate).
//!
//! GA documents live under `<data_dir>/storage/ga/`.
//!
//! ## Config Search Paths
//!
//! `globalattr.toml` is merged from the OS config directory and then from the
//! explicit data directory, if one was given. Later files override earlier
//! ones. A broken or missing file falls back to compiled defaults.
//!
//! The context has no host collaborators attached; attribute views and
//! blocks belong to the embedding program, which passes its own
//! [`Hosts`] to [`GaApi::new`].

use std::path::PathBuf;

use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use tracing::debug;

use crate::api::GaApi;
use crate::config::GaConfig;
use crate::error::{GaError, Result};
use crate::host::Hosts;
use crate::store::{FsBackend, GaStore};

pub const DATA_ENV: &str = "GLOBALATTR_DATA";
pub const CONFIG_FILE: &str = "globalattr.toml";

pub struct GaContext {
    pub api: GaApi<FsBackend>,
    pub config: GaConfig,
    pub data_dir: PathBuf,
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<GaContext> {
    let explicit = data_override.or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from));
    let project_dirs = ProjectDirs::from("com", "globalattr", "globalattr");

    let mut search_paths = Vec::new();
    if let Some(dirs) = &project_dirs {
        search_paths.push(SearchPath::Path(dirs.config_dir().to_path_buf()));
    }
    if let Some(dir) = &explicit {
        search_paths.push(SearchPath::Path(dir.clone()));
    }

    let config: GaConfig = Clapfig::builder()
        .app_name("globalattr")
        .file_name(CONFIG_FILE)
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default();

    let data_dir = explicit
        .or_else(|| config.data_dir.clone())
        .or_else(|| project_dirs.map(|dirs| dirs.data_dir().to_path_buf()))
        .ok_or_else(|| GaError::Store("could not determine a data directory".to_string()))?;

    let backend = FsBackend::for_data_dir(&data_dir);
    debug!(root = %backend.root().display(), "opened global attribute store");
    let store = GaStore::new(backend).with_format(config.save_format());
    let api = GaApi::new(store, Hosts::detached());

    Ok(GaContext {
        api,
        config,
        data_dir,
    })
}
