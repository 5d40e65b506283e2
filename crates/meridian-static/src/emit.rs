//! Per-region page emission.

use std::fs;
use std::path::{Path, PathBuf};

use meridian_region::{Region, Rewriter};

use crate::builder::BuildError;
use crate::pages::PageRegistry;

/// A page written for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedPage {
    pub region: Region,
    pub page: String,
    pub path: PathBuf,
}

/// Outcome of emitting the page registry.
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Pages written, in emission order
    pub emitted: Vec<EmittedPage>,

    /// Page/region pairs with no source file
    pub skipped: Vec<(Region, String)>,
}

/// Render every registered page for every region in `regions`.
///
/// Output goes to `<output_dir>/<slug>/<page>.html`. A page whose source is
/// missing for a region is skipped and recorded, not treated as an error.
pub fn emit_pages(
    registry: &PageRegistry,
    rewriter: &Rewriter,
    regions: &[Region],
    source_dir: &Path,
    output_dir: &Path,
) -> Result<EmitReport, BuildError> {
    let mut report = EmitReport::default();

    for &region in regions {
        let region_dir = output_dir.join(region.slug());
        fs::create_dir_all(&region_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", region_dir.display(), e)))?;

        for (page, source) in registry.iter() {
            let Some(file) = source.file_for(region) else {
                tracing::debug!("No {} source for page {}", region, page);
                report.skipped.push((region, page.to_string()));
                continue;
            };

            let src = source_dir.join(file);
            if !src.is_file() {
                tracing::debug!("Skipping {}/{}.html: {} not found", region.slug(), page, file);
                report.skipped.push((region, page.to_string()));
                continue;
            }

            let content = fs::read_to_string(&src)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", src.display(), e)))?;

            let dest = region_dir.join(format!("{page}.html"));
            fs::write(&dest, rewriter.rewrite(&content, region))
                .map_err(|e| BuildError::WriteError(format!("{}: {}", dest.display(), e)))?;

            tracing::info!("  {}/{}.html", region.slug(), page);

            report.emitted.push(EmittedPage {
                region,
                page: page.to_string(),
                path: dest,
            });
        }
    }

    Ok(report)
}
