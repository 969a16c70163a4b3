//! content-server: a small JSON backend for markdown posts
//!
//! Posts live as `<slug>.md` files with front-matter in a content directory.
//! They are re-read and rendered to HTML on every request and served under
//! `/v1/content/posts`.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main application
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Directory holding the posts
    pub content_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("config.yml");

        let config = if config_path.exists() {
            tracing::debug!("Loading configuration from {:?}", config_path);
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        Self {
            config,
            content_dir,
        }
    }

    /// Repository over the content directory
    pub fn repository(&self) -> content::PostRepository {
        let renderer = content::MarkdownRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        );
        content::PostRepository::new(&self.content_dir, renderer)
    }

    /// Serve the API until interrupted
    pub async fn serve(&self, ip: &str, port: u16) -> Result<()> {
        server::start(self, ip, port).await
    }
}
