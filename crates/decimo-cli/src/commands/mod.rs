//! Subcommands and the state they share.

pub mod batch;
pub mod check;
pub mod config;
pub mod scan;
pub mod tickets;

use std::path::{Path, PathBuf};

use tracing::debug;

use decimo_core::{DecimoConfig, TicketBook};

/// Configuration and ticket book location resolved from global flags.
pub struct Context {
    pub config: DecimoConfig,
    pub book_path: PathBuf,
}

impl Context {
    /// Resolve configuration, falling back to the default config file, then defaults.
    pub fn load(config_path: Option<&str>, book: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => DecimoConfig::from_file(Path::new(path))?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    debug!("Using config at {}", path.display());
                    DecimoConfig::from_file(&path)?
                } else {
                    DecimoConfig::default()
                }
            }
        };

        let book_path = book
            .or_else(|| config.book.path.clone())
            .unwrap_or_else(default_book_path);

        Ok(Self { config, book_path })
    }

    pub fn load_book(&self) -> anyhow::Result<TicketBook> {
        Ok(TicketBook::load(&self.book_path)?)
    }

    pub fn save_book(&self, book: &TicketBook) -> anyhow::Result<()> {
        book.save(&self.book_path)?;
        debug!("Saved {} tickets to {}", book.len(), self.book_path.display());
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("decimo")
        .join("config.json")
}

pub fn default_book_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("decimo")
        .join("tickets.json")
}

/// Lowercased file extension, empty when missing.
pub fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_image(path: &Path) -> bool {
    matches!(
        extension(path).as_str(),
        "png" | "jpg" | "jpeg" | "webp" | "tiff" | "tif" | "bmp"
    )
}
