//! Newsdesk - render, normalize and upload article content.
//!
//! # Usage
//!
//! ```bash
//! newsdesk render article.md --page > article.html
//! newsdesk normalize article.md
//! newsdesk upload photo.png --storage-dir ./storage
//! newsdesk slug "Spring Festival 2025"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use newsdesk::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use newsdesk::content::generate_slug;
use newsdesk::document::{normalize, parse};
use newsdesk::perf;
use newsdesk::render::{RenderContext, page, render_with, to_html};
use newsdesk::storage::{AssetFile, LocalObjectStore, unix_millis, upload_asset};

/// Render, normalize and upload news article content
#[derive(Parser, Debug)]
#[command(name = "newsdesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory of the local object store
    #[arg(long, global = true, value_name = "PATH")]
    storage_dir: Option<PathBuf>,

    /// Public base URL of stored objects
    #[arg(long, global = true, value_name = "URL")]
    public_url: Option<String>,

    /// Bucket uploads are stored in
    #[arg(long, global = true, value_name = "NAME")]
    bucket: Option<String>,

    /// Largest accepted upload in bytes
    #[arg(long, global = true, value_name = "N")]
    max_upload_bytes: Option<u64>,

    /// Syntax highlighting theme
    #[arg(long, global = true, value_name = "NAME")]
    theme: Option<String>,

    /// Print timing of parse, render and upload steps
    #[arg(long, global = true)]
    perf: bool,

    /// Write debug events to a file
    #[arg(long, global = true, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render markdown to HTML
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Emit a standalone page instead of a fragment
        #[arg(long)]
        page: bool,
        /// Page title (defaults to the file name)
        #[arg(long, requires = "page")]
        title: Option<String>,
    },
    /// Print the block document as JSON
    Blocks {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print canonical markdown
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Store an image and print its public URL
    Upload {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Print the URL slug for a title
    Slug {
        #[arg(value_name = "TEXT", required = true)]
        text: Vec<String>,
    },
}

impl Cli {
    fn config_flags(&self) -> ConfigFlags {
        ConfigFlags {
            storage_dir: self.storage_dir.clone(),
            public_url: self.public_url.clone(),
            bucket: self.bucket.clone(),
            max_upload_bytes: self.max_upload_bytes,
            theme: self.theme.clone(),
            perf: self.perf,
            debug_log: self.debug_log.clone(),
        }
    }
}

fn read_markdown(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run(command: Command, config: &ConfigFlags) -> Result<()> {
    match command {
        Command::Render { file, page: full, title } => {
            let markdown = read_markdown(&file)?;
            let ctx = RenderContext::default().with_theme(config.theme.as_deref());
            let tree = render_with(&markdown, &ctx);
            if full {
                let title = title.unwrap_or_else(|| {
                    file.file_stem()
                        .map_or_else(String::new, |s| s.to_string_lossy().into_owned())
                });
                print!("{}", page(&title, &tree));
            } else {
                println!("{}", to_html(&tree));
            }
        }
        Command::Blocks { file } => {
            let markdown = read_markdown(&file)?;
            let doc = parse(&markdown);
            let json = serde_json::to_string_pretty(&doc).context("Failed to encode blocks")?;
            println!("{json}");
        }
        Command::Normalize { file } => {
            let markdown = read_markdown(&file)?;
            print!("{}", normalize(&markdown));
        }
        Command::Upload { image } => {
            let asset = AssetFile::from_path(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            let store =
                LocalObjectStore::new(config.storage_dir(), config.bucket(), config.public_url());
            let uploaded = upload_asset(&store, &asset, config.max_upload_bytes(), unix_millis())
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            println!("{}", uploaded.url);
        }
        Command::Slug { text } => {
            println!("{}", generate_slug(&text.join(" ")));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.config_flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("NEWSDESK_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        tracing::warn!(
            path = %debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            error = %err,
            "failed to open debug log"
        );
    }

    let result = run(cli.command, &effective);
    perf::report();
    result
}
