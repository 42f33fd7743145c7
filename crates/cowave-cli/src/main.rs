//! Smoke tool for the CoWave data layer: lists approved rooms and, given a
//! room slug, walks its threads page by page through the cursor contract.
//!
//! Backend selection: set `COWAVE_LOCAL_DB=<path>` to use the local SQLite
//! backend, otherwise `COWAVE_BACKEND_URL`/`COWAVE_BACKEND_KEY` pick the
//! managed service.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use cowave_backend::{Backend, BackendConfig, HttpBackend};
use cowave_data::{RoomRepo, ThreadRepo};
use cowave_local::SqliteBackend;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cowave=debug".into()),
        )
        .init();

    let slug = std::env::args().nth(1);

    match std::env::var("COWAVE_LOCAL_DB") {
        Ok(path) => {
            info!("using local backend at {path}");
            let backend = Arc::new(SqliteBackend::open(Path::new(&path))?);
            run(backend, slug).await
        }
        Err(_) => {
            let config = BackendConfig::from_env()?;
            info!("using managed backend at {}", config.base_url);
            let backend = Arc::new(HttpBackend::new(config)?);
            run(backend, slug).await
        }
    }
}

async fn run<B: Backend>(backend: Arc<B>, slug: Option<String>) -> Result<()> {
    let rooms = RoomRepo::new(backend.clone());

    let listing = rooms.list_approved().await?;
    println!("{} approved room(s)", listing.len());
    for room in &listing {
        println!("  {}  {}", room.slug, room.name);
    }

    let Some(slug) = slug else {
        return Ok(());
    };

    let Some(room) = rooms.get_by_slug(&slug).await? else {
        anyhow::bail!("no room with slug '{slug}'");
    };

    let threads = ThreadRepo::new(backend);
    let mut cursor = None;
    let mut page_no = 0u32;
    loop {
        let page = threads.list_page(&room.id, None, cursor).await?;
        page_no += 1;
        println!("page {page_no}: {} thread(s)", page.items.len());
        for thread in &page.items {
            println!("  [{}] {}", thread.created_at.format("%Y-%m-%d %H:%M"), thread.title);
        }
        if !page.has_more {
            break;
        }
        cursor = page.cursor;
    }

    Ok(())
}
