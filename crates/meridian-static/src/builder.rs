//! Production site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use meridian_region::{Region, Rewriter};

use crate::bundle::{AssetBundler, BundledAsset, DEFAULT_ENTRIES};
use crate::copy::{copy_dir, copy_file_if_exists};
use crate::emit::{emit_pages, EmitReport};
use crate::pages::PageRegistry;
use crate::templates::TemplateEngine;

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding the HTML pages and asset sources
    pub source_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Regions to build, in order. The first is the geo-dispatch fallback.
    pub regions: Vec<Region>,

    /// Pages rendered for each region
    pub pages: PageRegistry,

    /// Bundler entry globs, relative to `source_dir`
    pub entries: Vec<String>,

    /// Folder name for bundled assets, under the output (build) or source (dev) root
    pub assets_dir: String,

    /// Directories copied verbatim into the output root
    pub static_dirs: Vec<String>,

    /// Page copied to `<output>/index.html`; a built-in one is rendered if absent
    pub redirect_page: String,

    /// Minify bundled assets
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            regions: Region::ALL.to_vec(),
            pages: PageRegistry::site_default(),
            entries: DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect(),
            assets_dir: "Assets".to_string(),
            static_dirs: vec!["img".to_string(), "fonts".to_string()],
            redirect_page: "index-redirect.html".to_string(),
            minify: true,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Bundled script and style files
    pub assets: Vec<BundledAsset>,

    /// Regional pages written and skipped
    pub pages: EmitReport,

    /// Number of static files copied
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to read source: {0}")]
    ReadError(String),

    #[error("Bundling failed ({step}): {message}")]
    BundleError { step: &'static str, message: String },

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to copy static files: {0}")]
    CopyError(String),
}

impl BuildError {
    pub(crate) fn bundle(step: &'static str, message: impl std::fmt::Display) -> Self {
        Self::BundleError {
            step,
            message: message.to_string(),
        }
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the site: bundle, emit regional pages, write root pages, copy
    /// static folders. Steps run in that order and the first error aborts.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        if self.config.regions.is_empty() {
            return Err(BuildError::ConfigError(
                "at least one region must be built".to_string(),
            ));
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        tracing::info!("Building assets...");
        let assets_dir = self.config.output_dir.join(&self.config.assets_dir);
        let assets = self.bundle_assets(&assets_dir, self.config.minify)?;

        tracing::info!("Rendering regional pages...");
        let rewriter = Rewriter::new(&self.config.regions)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;
        let pages = emit_pages(
            &self.config.pages,
            &rewriter,
            &self.config.regions,
            &self.config.source_dir,
            &self.config.output_dir,
        )?;

        self.write_root_pages()?;

        let mut copied = 0;
        for dir in &self.config.static_dirs {
            let src = self.config.source_dir.join(dir);
            if let Some(count) = copy_dir(&src, &self.config.output_dir.join(dir))? {
                tracing::info!("  Copied {} ({} files)", dir, count);
                copied += count;
            }
        }

        Ok(BuildResult {
            assets,
            pages,
            copied,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Bundle entry points into `out_dir`.
    pub fn bundle_assets(
        &self,
        out_dir: &Path,
        minify: bool,
    ) -> Result<Vec<BundledAsset>, BuildError> {
        AssetBundler::new(&self.config.source_dir, self.config.entries.clone())
            .bundle(out_dir, minify)
    }

    /// Write the geo-dispatch `index.html` and `_redirects` at the output root.
    fn write_root_pages(&self) -> Result<(), BuildError> {
        let index = self.config.output_dir.join("index.html");
        let redirect_source = self.config.source_dir.join(&self.config.redirect_page);

        if copy_file_if_exists(&redirect_source, &index)? {
            tracing::info!("  index.html (from {})", self.config.redirect_page);
        } else {
            let html = self
                .templates
                .render_geo_dispatch(&self.config.regions)
                .map_err(|e| BuildError::TemplateError(e.to_string()))?;
            fs::write(&index, html).map_err(|e| BuildError::WriteError(e.to_string()))?;
            tracing::info!("  index.html (geo dispatch)");
        }

        if copy_file_if_exists(
            &self.config.source_dir.join("_redirects"),
            &self.config.output_dir.join("_redirects"),
        )? {
            tracing::info!("  _redirects");
        }

        Ok(())
    }
}
