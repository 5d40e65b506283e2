//! Multi-region static site generator.
//!
//! Bundles script and style entry points, renders every registered page once
//! per region into `<output>/<slug>/`, places a geo-dispatch page at the
//! output root and copies static asset folders alongside.

pub mod builder;
pub mod bundle;
pub mod copy;
pub mod emit;
pub mod pages;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use bundle::{AssetBundler, AssetKind, BundledAsset};
pub use emit::{EmitReport, EmittedPage};
pub use meridian_region::Region;
pub use pages::{PageRegistry, PageSource};
