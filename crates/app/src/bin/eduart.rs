//! EduArt workshop - command-line front end
//!
//! Each invocation opens a session over the local store, acts as the given
//! role, and exits.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use eduart_app::{generate, render_generation, workflows_for, Download, GenerationOutcome, Session};
use eduart_artifacts::{ArtifactKind, Content};
use eduart_common::{Config, UserRole};
use eduart_llm::{GenerationConfig, GenerationServiceFactory, InlineImage};

#[derive(Parser)]
#[command(name = "eduart")]
#[command(author = "EduArt Team")]
#[command(version)]
#[command(about = "Visual-arts workshop for Valencian teachers and students")]
struct Cli {
    /// Acting role
    #[arg(short, long, env = "EDUART_ROLE", default_value = "none")]
    role: UserRole,

    /// Store directory (overrides EDUART_STORE_DIR)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved items for the role
    List {
        /// Only this type (lesson, rubric, heritage, analysis, prompt, image, search)
        #[arg(short, long)]
        kind: Option<ArtifactKind>,
    },

    /// Save text or an image file
    Save {
        #[arg(short, long)]
        kind: ArtifactKind,

        #[arg(short, long)]
        title: String,

        /// Text content
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Image file for IMAGE items, or a text file otherwise
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a saved item
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Export the role's images as one ZIP
    Export {
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Write one saved image to disk
    Download {
        id: String,

        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Show or toggle the theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },

    /// Generate content and optionally save it
    Generate {
        #[arg(short, long)]
        kind: ArtifactKind,

        #[arg(short, long)]
        prompt: String,

        /// Reference image (required for analysis)
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Save the result under this title
        #[arg(long)]
        save: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    let default_filter = if cli.verbose {
        "eduart=debug".to_string()
    } else {
        config.rust_log.clone()
    };
    eduart_app::init_tracing(&default_filter);

    if let Some(store) = cli.store {
        config.store_dir = store;
    }

    let mut session = Session::open_from_config(config).map_err(report)?;
    session.set_role(cli.role);

    if session.load_outcome().is_recovered() {
        info!("Saved items could not be read; starting with an empty folder");
    }

    match cli.command {
        Commands::List { kind } => list(&session, kind),
        Commands::Save {
            kind,
            title,
            text,
            file,
        } => save(&mut session, kind, title, text, file),
        Commands::Delete { id, yes } => delete(&mut session, &id, yes),
        Commands::Export { out } => export(&session, &out),
        Commands::Download { id, out } => download(&session, &id, &out),
        Commands::Theme { toggle } => {
            let theme = if toggle {
                session.toggle_theme().map_err(report)?
            } else {
                session.theme()
            };
            println!("{}", theme);
            Ok(())
        }
        Commands::Generate {
            kind,
            prompt,
            reference,
            save,
        } => run_generate(&mut session, kind, &prompt, reference, save).await,
    }
}

fn list(session: &Session, kind: Option<ArtifactKind>) -> Result<()> {
    let items = session.saved(kind);
    if items.is_empty() {
        println!("La carpeta està buida.");
        return Ok(());
    }

    for item in items {
        let date = chrono::DateTime::from_timestamp_millis(item.date)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{}\t{}\t{}\t{}", item.id, item.kind, date, item.title);
    }
    Ok(())
}

fn save(
    session: &mut Session,
    kind: ArtifactKind,
    title: String,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let content = match (text, file) {
        (Some(text), _) => Content::text(text),
        (None, Some(path)) if kind.is_image() => {
            let image = read_image(&path)?;
            Content::image(image.mime, image.data)
        }
        (None, Some(path)) => Content::text(
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        (None, None) => bail!("Provide --text or --file"),
    };

    let saved = session.save(kind, content, title).map_err(report)?;
    println!("{}", saved.id);
    Ok(())
}

fn delete(session: &mut Session, id: &str, confirmed: bool) -> Result<()> {
    if !confirmed {
        println!("Estàs segur que vols esborrar aquest element? Torna a executar amb --yes.");
        return Ok(());
    }
    if session.delete(id, true).map_err(report)? {
        println!("Esborrat.");
    } else {
        println!("No s'ha trobat cap element amb l'identificador {}.", id);
    }
    Ok(())
}

fn export(session: &Session, out: &Path) -> Result<()> {
    if !session.has_images() {
        println!("No hi ha imatges per exportar.");
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    match session.export_archive(today) {
        Ok(Some(download)) => write_download(out, &download),
        Ok(None) => {
            println!("No hi ha imatges per exportar.");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Archive export failed");
            bail!("No s'ha pogut crear l'arxiu ZIP.")
        }
    }
}

fn download(session: &Session, id: &str, out: &Path) -> Result<()> {
    match session.download_image(id) {
        Ok(download) => write_download(out, &download),
        Err(e) => Err(report(e)),
    }
}

async fn run_generate(
    session: &mut Session,
    kind: ArtifactKind,
    prompt: &str,
    reference: Option<PathBuf>,
    save_as: Option<String>,
) -> Result<()> {
    if !workflows_for(session.role()).contains(&kind) {
        bail!("The {} role has no {} workflow", session.role(), kind);
    }

    let reference = reference.as_deref().map(read_image).transpose()?;
    let service = GenerationServiceFactory::create(GenerationConfig::from_env()?)?;

    match render_generation(generate(service.as_ref(), kind, prompt, reference).await) {
        GenerationOutcome::Ready(content) => {
            match &content {
                Content::Text(text) => println!("{}", text),
                Content::Image { mime, data } => {
                    println!("[{} image, {} bytes]", mime, data.len())
                }
            }
            if let Some(title) = save_as {
                let saved = session.save(kind, content, title).map_err(report)?;
                info!(id = %saved.id, "Saved generated content");
                println!("Desat: {}", saved.id);
            }
        }
        GenerationOutcome::Failed(message) => println!("{}", message),
    }
    Ok(())
}

/// Log a session error at the level it deserves and tag it with its code
fn report(e: eduart_common::Error) -> anyhow::Error {
    if e.is_internal() {
        error!(code = e.error_code(), error = %e, "Session operation failed");
    } else {
        warn!(code = e.error_code(), error = %e, "Request rejected");
    }
    anyhow::anyhow!("[{}] {}", e.error_code(), e)
}

fn read_image(path: &Path) -> Result<InlineImage> {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => bail!("Unsupported image type: {}", path.display()),
    };
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(InlineImage::new(mime, data))
}

fn write_download(dir: &Path, download: &Download) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(&download.filename);
    std::fs::write(&path, &download.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}
