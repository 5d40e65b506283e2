//! Region model and HTML regionalization for meridian.
//!
//! Rewrites a page written for the site root so it can be served one
//! directory deeper, under a region's output folder, and tags it with the
//! region it was built for.

pub mod marker;
pub mod region;
pub mod rewriter;
pub mod rules;
pub mod switcher;

pub use marker::inject_region_marker;
pub use region::{ParseRegionError, Region};
pub use rewriter::{RewriteError, Rewriter};
pub use rules::{RewriteRule, RuleSet};
pub use switcher::{inject_switcher, switcher_fragment};
