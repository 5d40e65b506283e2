//! `site.toml` loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use meridian_region::Region;
use meridian_server::DevServerConfig;
use meridian_static::{BuildConfig, PageRegistry};
use serde::Deserialize;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    site: SiteSection,
    /// Replaces the built-in page registry when present
    pages: Option<PagesSection>,
    #[serde(default)]
    assets: AssetsSection,
    #[serde(default)]
    dev: DevSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SiteSection {
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    regions: Option<Vec<Region>>,
    redirect_page: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct PagesSection {
    #[serde(default)]
    shared: Vec<String>,
    #[serde(default)]
    regional: BTreeMap<String, BTreeMap<Region, String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AssetsSection {
    entries: Option<Vec<String>>,
    dir_name: Option<String>,
    static_dirs: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DevSection {
    host: Option<String>,
    port: Option<u16>,
    open: Option<bool>,
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = parse(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

fn parse(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;

    if config.site.regions.as_ref().is_some_and(Vec::is_empty) {
        anyhow::bail!("[site] regions must list at least one region");
    }

    Ok(config)
}

impl ConfigFile {
    /// Settings for a production build.
    pub fn build_config(&self) -> BuildConfig {
        let defaults = BuildConfig::default();

        BuildConfig {
            source_dir: self.site.source.clone().unwrap_or(defaults.source_dir),
            output_dir: self.site.output.clone().unwrap_or(defaults.output_dir),
            regions: self.site.regions.clone().unwrap_or(defaults.regions),
            pages: self.pages.as_ref().map_or(defaults.pages, PagesSection::registry),
            entries: self.assets.entries.clone().unwrap_or(defaults.entries),
            assets_dir: self.assets.dir_name.clone().unwrap_or(defaults.assets_dir),
            static_dirs: self.assets.static_dirs.clone().unwrap_or(defaults.static_dirs),
            redirect_page: self
                .site
                .redirect_page
                .clone()
                .unwrap_or(defaults.redirect_page),
            minify: defaults.minify,
        }
    }

    /// Settings for watch mode. Assets are never minified there.
    pub fn dev_config(&self) -> DevServerConfig {
        let defaults = DevServerConfig::default();

        DevServerConfig {
            build: BuildConfig {
                minify: false,
                ..self.build_config()
            },
            host: self.dev.host.clone().unwrap_or(defaults.host),
            port: self.dev.port.unwrap_or(defaults.port),
            open: self.dev.open.unwrap_or(defaults.open),
        }
    }
}

impl PagesSection {
    fn registry(&self) -> PageRegistry {
        let registry = self
            .shared
            .iter()
            .fold(PageRegistry::new(), |registry, name| registry.shared(name));

        self.regional
            .iter()
            .fold(registry, |registry, (name, files)| {
                registry.regional(name, files.clone())
            })
    }
}
