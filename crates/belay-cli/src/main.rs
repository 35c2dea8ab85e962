mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use belay_catalog::Catalog;
use belay_core::{Attributes, Resource, ResourceId, ResourceStore};
use belay_logging::{BelaySubscriberBuilder, CallerContextGuard};
use belay_storage::RedbResourceStore;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use config::{BelayConfig, Cli, Command};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = BelayConfig::load(&cli.config)?;
    config.apply(&cli);

    let _log_guard = BelaySubscriberBuilder::new()
        .with_config(config.log.clone())
        .init()?;

    info!(db = %config.store.db_path.display(), "Opening catalog");
    let store: Arc<dyn ResourceStore> = Arc::new(RedbResourceStore::open(config.store.clone())?);
    let catalog = Catalog::new(store.clone(), config.catalog.clone());

    run(cli.command, &catalog, store.as_ref()).await
}

async fn run(command: Command, catalog: &Catalog, store: &dyn ResourceStore) -> anyhow::Result<()> {
    match command {
        Command::Seed { file } => {
            let resources: Vec<Resource> = read_json(&file)?;
            let count = resources.len();
            for resource in resources {
                store.put(resource).await?;
            }
            info!(count, "Seeded resources");
            println!("Seeded {count} resources");
        }

        Command::Get { kind, id, caller } => {
            let caller = caller.caller();
            let _ctx = CallerContextGuard::new(&caller);
            let resource = catalog
                .resources()
                .get(kind, &ResourceId::from(id), &caller)
                .await?;
            print_json(&resource)?;
        }

        Command::Children {
            kind,
            parent,
            ordered,
            caller,
        } => {
            let caller = caller.caller();
            let _ctx = CallerContextGuard::new(&caller);
            let children = catalog
                .resources()
                .list_children(kind, &ResourceId::from(parent), &caller, ordered)
                .await?;
            print_json(&children)?;
        }

        Command::Subtree {
            kind,
            id,
            depth,
            caller,
        } => {
            let caller = caller.caller();
            let _ctx = CallerContextGuard::new(&caller);
            let subtree = catalog
                .subtrees()
                .get_subtree(kind, &ResourceId::from(id), &caller, depth)
                .await?;
            print_json(&subtree)?;
        }

        Command::BatchCreate { kind, parent, file } => {
            let specs: Vec<Attributes> = read_json(&file)?;
            let created = catalog
                .chains()
                .batch_create(kind, &ResourceId::from(parent), specs)
                .await?;
            print_json(&created)?;
        }

        Command::BatchDelete { kind, ids } => {
            let ids: Vec<ResourceId> = ids.into_iter().map(ResourceId::from).collect();
            catalog.chains().batch_delete(kind, &ids).await?;
            println!("Deleted {} {kind} resources", ids.len());
        }

        Command::Clear { kind, parent } => {
            let removed = catalog
                .chains()
                .delete_all_children(kind, &ResourceId::from(parent))
                .await?;
            println!("Deleted {removed} {kind} resources");
        }

        Command::Delete { kind, id } => {
            let id = ResourceId::from(id);
            catalog.resources().delete(kind, &id).await?;
            println!("Deleted {kind} {id}");
        }
    }

    Ok(())
}
