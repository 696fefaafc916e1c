use crate::cli::ServeArgs;
use std::path::PathBuf;
use std::sync::Arc;
use taskboard_core::AppConfig;
use taskboard_persistence::{MemoryStore, TaskStore};

pub async fn handle(config: &AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    let bind = args
        .bind
        .unwrap_or_else(|| config.effective_bind().to_string());
    let store = open_store(args.database.or_else(|| config.database.clone()))?;
    taskboard_server::serve(&bind, store).await?;
    Ok(())
}

#[cfg(feature = "sqlite")]
fn open_store(database: Option<PathBuf>) -> anyhow::Result<Arc<dyn TaskStore>> {
    match database {
        Some(path) => {
            tracing::info!("Using SQLite database {}", path.display());
            Ok(Arc::new(taskboard_persistence::SqliteStore::new(path)))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(not(feature = "sqlite"))]
fn open_store(database: Option<PathBuf>) -> anyhow::Result<Arc<dyn TaskStore>> {
    if let Some(path) = database {
        anyhow::bail!(
            "cannot open {}: taskboard was built without the sqlite feature",
            path.display()
        );
    }
    tracing::info!("Keeping tasks in memory");
    Ok(Arc::new(MemoryStore::new()))
}
