use camgal::capture::{CaptureSession, FileCamera};
use camgal::config::{self, AppConfig};
use camgal::gallery::Gallery;
use camgal::imaging::{ImageBackend, RustBackend};
use camgal::ladder::VariantKey;
use camgal::media::{LibraryStore, MediaStore};
use camgal::output;
use camgal::state::Notice;
use camgal::view::Viewport;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "camgal")]
#[command(about = "Capture photos and compare them at eight quality levels")]
#[command(long_about = "\
Capture photos and compare them at eight quality levels

The most recent photo in the library is re-encoded into a fixed ladder of
variants. Each is a (compression, width fraction) pair:

  original   1.0  1.0
  high       0.8  0.8
  medium     0.8  0.6
  low        0.9  0.4
  low1       0.8  0.4
  low2       0.7  0.4
  low3       0.6  0.4
  low4       0.0  0.4

Variants live in the work directory only while they are shown; pass --keep
to leave them on disk.

Run 'camgal gen-config' to generate a documented camgal.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./camgal.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Photo library directory (overrides config)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Directory for derived variants (overrides config)
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save an image file to the library, as the shutter would
    Capture {
        /// Photo to capture
        input: PathBuf,
    },
    /// Show the most recent photo in the library
    Latest,
    /// Derive all variants of the most recent photo and show one
    Gallery {
        /// Variant to show
        #[arg(long, default_value = "original")]
        quality: VariantKey,
        /// Print the variant set and selection as JSON
        #[arg(long)]
        json: bool,
        /// Leave derived files in the work directory
        #[arg(long)]
        keep: bool,
    },
    /// Save one variant of the most recent photo to the library
    Save {
        #[arg(long)]
        quality: VariantKey,
    },
    /// Delete the most recent photo from the library
    Delete {
        /// Required; deletion cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Print a stock camgal.toml with all options documented
    GenConfig,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, config::ConfigError> {
    let mut app = match &cli.config {
        Some(path) => config::load_config(path, true)?,
        None => config::load_config(std::path::Path::new(config::CONFIG_FILENAME), false)?,
    };
    if let Some(library) = &cli.library {
        app.library.root = library.clone();
    }
    if let Some(work_dir) = &cli.work_dir {
        app.derivation.work_dir = work_dir.clone();
    }
    Ok(app)
}

type CliGallery = Gallery<RustBackend, LibraryStore>;

fn open_gallery(app: &AppConfig, store: Arc<LibraryStore>) -> CliGallery {
    Gallery::new(
        Arc::new(RustBackend::new(&app.derivation.work_dir)),
        store,
        app.derivation.format,
        Viewport::from(app.viewport),
    )
}

/// Refresh, printing whatever notices the load raised.
async fn load(gallery: &CliGallery) -> Result<(), Box<dyn std::error::Error>> {
    let result = gallery.refresh().await;
    output::print_notices(&gallery.take_notices());
    result?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let app = resolve_config(&cli)?;
    let store = Arc::new(LibraryStore::new(
        &app.library.root,
        app.library.recent_window,
    ));

    match cli.command {
        Command::Capture { input } => {
            let session = CaptureSession::new(Arc::new(FileCamera::new(&input)), store);
            let result = session.shutter().await;
            output::print_notices(&session.take_notices());
            match result? {
                Some(saved) => output::print_saved(&saved),
                None => return Err(format!("no photo at {}", input.display()).into()),
            }
        }
        Command::Latest => {
            if !store.permission().is_granted() {
                output::print_notices(&[Notice::PERMISSION_REQUIRED]);
                return Err("media library access denied".into());
            }
            match store.most_recent_photo()? {
                Some(source) => {
                    let dims = RustBackend::new(&app.derivation.work_dir).identify(&source.path)?;
                    output::print_latest(&source, dims.width, dims.height);
                }
                None => println!("Library is empty"),
            }
        }
        Command::Gallery {
            quality,
            json,
            keep,
        } => {
            let gallery = open_gallery(&app, store);
            load(&gallery).await?;
            if !gallery.select(quality) {
                return Err(format!("variant '{quality}' is not loaded").into());
            }
            gallery.with_state(|state| -> Result<(), Box<dyn std::error::Error>> {
                let (Some(source), Some(set), Some(view)) = (
                    state.source(),
                    state.variants(),
                    state.display(Viewport::from(app.viewport)),
                ) else {
                    return Ok(());
                };
                if json {
                    let doc = serde_json::json!({
                        "source": { "id": source.id, "path": source.path },
                        "selected": view,
                        "variants": set,
                    });
                    println!("{}", serde_json::to_string_pretty(&doc)?);
                } else {
                    output::print_gallery(source, set, &view);
                }
                Ok(())
            })?;
            if keep && let Some(set) = gallery.detach_variants() {
                let kept = set.keep();
                eprintln!(
                    "Kept {} variants in {}",
                    kept.len(),
                    app.derivation.work_dir.display()
                );
            }
        }
        Command::Save { quality } => {
            let gallery = open_gallery(&app, store);
            load(&gallery).await?;
            if !gallery.select(quality) {
                return Err(format!("variant '{quality}' is not loaded").into());
            }
            let result = gallery.save().await;
            output::print_notices(&gallery.take_notices());
            output::print_saved(&result?);
        }
        Command::Delete { yes } => {
            if !yes {
                return Err("refusing to delete without --yes".into());
            }
            let gallery = open_gallery(&app, store);
            load(&gallery).await?;
            let source = gallery.source();
            let result = gallery.delete().await;
            output::print_notices(&gallery.take_notices());
            result?;
            if let Some(source) = source {
                println!("Deleted {}", source.id);
            }
        }
        Command::GenConfig => {}
    }

    Ok(())
}
