//! Flag-file configuration.
//!
//! Config files hold command-line flags, one or more per line, with `#`
//! comments. The effective configuration is global ∪ local ∪ command line,
//! later sources overriding options and OR-ing switches.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::storage::{CONTENT_BUCKET, MAX_UPLOAD_BYTES};

const APP_DIR: &str = "newsdesk";
const LOCAL_FILE: &str = ".newsdeskrc";

/// Default public base URL for the local object store.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080/storage";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub storage_dir: Option<PathBuf>,
    pub public_url: Option<String>,
    pub bucket: Option<String>,
    pub max_upload_bytes: Option<u64>,
    pub theme: Option<String>,
    pub perf: bool,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            storage_dir: other.storage_dir.clone().or_else(|| self.storage_dir.clone()),
            public_url: other.public_url.clone().or_else(|| self.public_url.clone()),
            bucket: other.bucket.clone().or_else(|| self.bucket.clone()),
            max_upload_bytes: other.max_upload_bytes.or(self.max_upload_bytes),
            theme: other.theme.clone().or_else(|| self.theme.clone()),
            perf: self.perf || other.perf,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("storage"))
    }

    pub fn public_url(&self) -> &str {
        self.public_url.as_deref().unwrap_or(DEFAULT_PUBLIC_URL)
    }

    pub fn bucket(&self) -> &str {
        self.bucket.as_deref().unwrap_or(CONTENT_BUCKET)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes.unwrap_or(MAX_UPLOAD_BYTES)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# newsdesk defaults (saved with --save)".to_string()];
    if let Some(dir) = &flags.storage_dir {
        lines.push(format!("--storage-dir {}", dir.display()));
    }
    if let Some(url) = &flags.public_url {
        lines.push(format!("--public-url {url}"));
    }
    if let Some(bucket) = &flags.bucket {
        lines.push(format!("--bucket {bucket}"));
    }
    if let Some(limit) = flags.max_upload_bytes {
        lines.push(format!("--max-upload-bytes {limit}"));
    }
    if let Some(theme) = &flags.theme {
        lines.push(format!("--theme {theme}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from `tokens`, ignoring everything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--perf" {
            flags.perf = true;
            i += 1;
            continue;
        }
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        if !is_value_flag(name) {
            i += 1;
            continue;
        }
        let value = match inline_value {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).map(String::as_str)
            }
        };
        if let Some(value) = value {
            apply_value(&mut flags, name, value);
        }
        i += 1;
    }
    flags
}

fn is_value_flag(name: &str) -> bool {
    matches!(
        name,
        "--storage-dir" | "--public-url" | "--bucket" | "--max-upload-bytes" | "--theme" | "--debug-log"
    )
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--storage-dir" => flags.storage_dir = Some(PathBuf::from(value)),
        "--public-url" => flags.public_url = Some(value.to_string()),
        "--bucket" => flags.bucket = Some(value.to_string()),
        "--max-upload-bytes" => flags.max_upload_bytes = value.parse().ok(),
        "--theme" => flags.theme = Some(value.to_string()),
        "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}
