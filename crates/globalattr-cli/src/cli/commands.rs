//! Context setup, dispatch and the per-command handlers.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use globalattr::api::CreateAttrRequest;
use globalattr::attributes::{auto_color, SelectOption};
use globalattr::init::{initialize, GaContext};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::render;
use super::setup::{Cli, Commands};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = initialize(cli.data.as_ref().map(PathBuf::from))?;
    debug!(data_dir = %ctx.data_dir.display(), "initialized");

    match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::List { json } => handle_list(&ctx, json),
        Commands::Create {
            name,
            kind,
            id,
            icon,
            desc,
            options,
            custom,
        } => {
            let req = CreateAttrRequest {
                ga_id: id.unwrap_or_default(),
                name,
                icon: icon.unwrap_or_default(),
                desc: desc.unwrap_or_default(),
                kind,
                options: parse_options(&options)?,
                is_custom_attr: custom,
                ..Default::default()
            };
            handle_create(&ctx, req)
        }
        Commands::Show { id, json } => handle_show(&ctx, &id, json),
        Commands::Delete { id } => handle_delete(&ctx, &id),
        Commands::Config => handle_config(&ctx),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "globalattr=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn handle_list(ctx: &GaContext, json: bool) -> Result<()> {
    let metas = ctx.api.list_attrs()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&metas)?);
        return Ok(());
    }
    print!("{}", render::attr_list(&metas));
    Ok(())
}

fn handle_create(ctx: &GaContext, req: CreateAttrRequest) -> Result<()> {
    let meta = ctx.api.create_attr(req)?;
    println!("{}", render::created(&meta));
    Ok(())
}

fn handle_show(ctx: &GaContext, id: &str, json: bool) -> Result<()> {
    let attr = ctx.api.get_attr(id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&attr)?);
        return Ok(());
    }
    print!("{}", render::attr_detail(&attr));
    Ok(())
}

fn handle_delete(ctx: &GaContext, id: &str) -> Result<()> {
    ctx.api.delete_attr(id)?;
    println!("Deleted global attribute {}", id);
    Ok(())
}

/// Prints the resolved configuration, one `key = value` per line.
fn handle_config(ctx: &GaContext) -> Result<()> {
    let mut table = match toml::Value::try_from(&ctx.config)? {
        toml::Value::Table(t) => t,
        _ => toml::map::Map::new(),
    };
    table
        .entry("data_dir")
        .or_insert_with(|| toml::Value::String(ctx.data_dir.display().to_string()));

    for (k, v) in &table {
        println!("{} = {}", k, format_toml_value(v));
    }
    Ok(())
}

fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

/// Parses `NAME` or `NAME:COLOR` option specs. Options without a color get
/// the palette color of their position.
fn parse_options(raw: &[String]) -> Result<Vec<SelectOption>> {
    let mut options: Vec<SelectOption> = Vec::with_capacity(raw.len());
    for (idx, spec) in raw.iter().enumerate() {
        let (name, color) = match spec.split_once(':') {
            Some((name, color)) if !color.trim().is_empty() => {
                (name.trim(), color.trim().to_string())
            }
            Some((name, _)) => (name.trim(), auto_color(idx)),
            None => (spec.trim(), auto_color(idx)),
        };
        if name.is_empty() {
            bail!("option {:?} has no name", spec);
        }
        if options.iter().any(|o| o.name == name) {
            bail!("option {} is given twice", name);
        }
        options.push(SelectOption::new(name, color));
    }
    Ok(options)
}
