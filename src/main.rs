#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use bookmark_insets::config::AppSettings;
use bookmark_insets::headless::HeadlessProvider;
use bookmark_insets::inset::{InsetViewManager, MapProvider, PanelContent};
use bookmark_insets::logging;
use bookmark_insets::map::{FileMapLoader, MapLoader, PrimaryView};
use bookmark_insets::pipeline::InsetPipeline;
use bookmark_insets::projection::SphericalMercator;
use bookmark_insets::reconciler::{ConfigEdit, ConfigurationEditor, HostSignal};
use bookmark_insets::resolver::missing_bookmarks;
use bookmark_insets::store::{ConfigStore, FileConfigStore};
use bookmark_insets::types::InsetPosition;

#[derive(Debug, Parser)]
#[command(name = "bookmark-insets", version, about = "Bookmark inset views for a map")]
struct Cli {
    /// trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Settings file (defaults to the platform config dir)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory holding configuration documents
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lay out the insets a map shows with its stored configuration
    Preview {
        /// Map item id or path to a map JSON file
        #[arg(long)]
        map: String,
        /// Application whose configuration document to use
        #[arg(long)]
        app_id: Option<String>,
    },
    /// Print the editable configuration rows
    Show {
        #[arg(long)]
        map: String,
        #[arg(long)]
        app_id: String,
    },
    /// Edit one configuration row, preview the result and save it
    Set {
        #[arg(long)]
        map: String,
        #[arg(long)]
        app_id: String,
        /// Bookmark name of the row
        name: String,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        wkid: Option<u32>,
        #[arg(long)]
        position: Option<InsetPosition>,
        #[arg(long)]
        index: Option<u32>,
        /// Preview only, do not save
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    logging::init(cli.log_level.as_deref(), &settings.log_level)?;

    let store = FileConfigStore::new(cli.store_dir.clone().unwrap_or_else(|| settings.store_dir()));
    info!(store = %store.dir().display(), "Using configuration store");

    match cli.command {
        Command::Preview { map, app_id } => {
            let primary = load_primary(&settings, &map).await?;
            let document = match &app_id {
                Some(app_id) => store
                    .get(app_id)
                    .await
                    .with_context(|| format!("Failed to load configuration for '{app_id}'"))?,
                None => None,
            };

            let mut pipeline = start_pipeline(primary, &settings).await?;
            pipeline.apply_document(document.as_ref());
            pipeline.settle().await;
            print_layout(pipeline.manager());
        }
        Command::Show { map, app_id } => {
            let primary = load_primary(&settings, &map).await?;
            let (changes_tx, _changes_rx) = mpsc::unbounded_channel();
            let (host_tx, mut host_rx) = mpsc::unbounded_channel();
            let editor =
                ConfigurationEditor::open(&store, &app_id, primary.bookmarks(), changes_tx, &host_tx)
                    .await
                    .with_context(|| format!("Failed to open configuration for '{app_id}'"))?;
            log_host_signals(&mut host_rx);

            if editor.working().is_empty() {
                println!("map has no bookmarks");
                return Ok(());
            }
            println!("{:<24} {:<8} {:<8} {:<13} {}", "name", "enabled", "wkid", "position", "index");
            for row in editor.working().rows() {
                println!(
                    "{:<24} {:<8} {:<8} {:<13} {}",
                    row.name, row.enabled, row.spatial_reference_id, row.position, row.index
                );
            }

            let stored = store.get(&app_id).await?.unwrap_or_default();
            for missing in missing_bookmarks(primary.bookmarks(), &stored.placement_specs()) {
                println!("note: {missing} (stored row is ignored)");
            }
        }
        Command::Set {
            map,
            app_id,
            name,
            enabled,
            wkid,
            position,
            index,
            dry_run,
        } => {
            let primary = load_primary(&settings, &map).await?;
            anyhow::ensure!(
                primary.map().bookmark(&name).is_some(),
                "map '{map}' has no bookmark named '{name}'"
            );
            let (changes_tx, mut changes_rx) = mpsc::unbounded_channel();
            let (host_tx, mut host_rx) = mpsc::unbounded_channel();
            let mut editor =
                ConfigurationEditor::open(&store, &app_id, primary.bookmarks(), changes_tx, &host_tx)
                    .await
                    .with_context(|| format!("Failed to open configuration for '{app_id}'"))?;
            log_host_signals(&mut host_rx);

            let edits = [
                enabled.map(ConfigEdit::Enabled),
                wkid.map(ConfigEdit::SpatialReference),
                position.map(ConfigEdit::Position),
                index.map(ConfigEdit::Index),
            ];
            let mut pipeline = start_pipeline(primary, &settings).await?;
            pipeline.apply_document(Some(&editor.document()));

            for edit in edits.into_iter().flatten() {
                editor
                    .edit(&name, edit)
                    .with_context(|| format!("Cannot edit '{name}'"))?;
            }
            while let Ok(working) = changes_rx.try_recv() {
                pipeline.apply_working(&working);
            }
            pipeline.settle().await;
            print_layout(pipeline.manager());

            if dry_run {
                info!(app_id = %app_id, "Dry run, configuration not saved");
                return Ok(());
            }
            if !editor.is_dirty() {
                warn!("No field given, nothing to save");
                return Ok(());
            }
            editor
                .save(&store)
                .await
                .with_context(|| format!("Configuration for '{app_id}' was NOT saved"))?;
            println!("saved configuration for '{app_id}'");
        }
    }

    Ok(())
}

async fn load_primary(settings: &AppSettings, item: &str) -> Result<PrimaryView> {
    let loader = FileMapLoader::new(settings.map_dir());
    let map = loader
        .load_map(item)
        .await
        .with_context(|| format!("Failed to load map '{item}' (map dir {})", loader.dir().display()))?;
    let primary = PrimaryView::new(Arc::new(map), settings.default_spatial_reference());
    info!(
        title = %primary.map().title,
        spatial_reference = %primary.spatial_reference(),
        extent = ?primary.extent(),
        bookmarks = primary.bookmarks().len(),
        "Loaded primary map"
    );
    Ok(primary)
}

async fn start_pipeline(
    primary: PrimaryView,
    settings: &AppSettings,
) -> Result<InsetPipeline<HeadlessProvider, SphericalMercator>> {
    InsetPipeline::start(
        primary,
        HeadlessProvider::new(),
        SphericalMercator::new(),
        settings.inset_base_size,
    )
    .await
    .context("Failed to load projection engine")
}

fn log_host_signals(host_rx: &mut mpsc::UnboundedReceiver<HostSignal>) {
    while let Ok(signal) = host_rx.try_recv() {
        match signal {
            HostSignal::OpenConfigureDialog { app_id } => {
                info!(app_id = %app_id, "Configure dialog requested");
            }
        }
    }
}

fn print_layout<P: MapProvider>(manager: &InsetViewManager<P>) {
    for position in InsetPosition::ALL {
        let mut in_corner = manager
            .instances()
            .iter()
            .filter(|instance| instance.spec().position == position)
            .peekable();
        if in_corner.peek().is_none() {
            continue;
        }
        println!("{position}:");
        for instance in in_corner {
            let size = instance.container().dimensions;
            let status = match instance.container().content() {
                PanelContent::Loading => "loading".to_string(),
                PanelContent::Map => "ready".to_string(),
                PanelContent::Error(message) => format!("error: {message}"),
            };
            println!(
                "  [{}] {:<24} {:>4.0}x{:<4.0} wkid {:<7} {}",
                instance.spec().index,
                instance.name(),
                size.width,
                size.height,
                instance.spec().spatial_reference_id,
                status
            );
        }
    }
    if manager.instances().is_empty() {
        println!("no insets");
    }
}
