//! Full regionalization pipeline: rules, marker, then switcher.

use std::collections::HashMap;

use crate::marker::inject_region_marker;
use crate::region::Region;
use crate::rules::RuleSet;
use crate::switcher::{inject_switcher, switcher_fragment};

/// Errors that can occur when preparing a rewriter.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("Failed to render region switcher: {0}")]
    Switcher(#[from] minijinja::Error),
}

/// Rewrites root-level pages for a region subfolder.
///
/// Switcher fragments are rendered once per region up front, so
/// [`Rewriter::rewrite`] itself cannot fail.
#[derive(Debug, Clone)]
pub struct Rewriter {
    rules: RuleSet,
    fragments: HashMap<Region, String>,
}

impl Rewriter {
    /// Create a rewriter for a build covering `built` regions.
    pub fn new(built: &[Region]) -> Result<Self, RewriteError> {
        Self::with_rules(RuleSet::subfolder(), built)
    }

    /// Create a rewriter with a custom rule set.
    pub fn with_rules(rules: RuleSet, built: &[Region]) -> Result<Self, RewriteError> {
        let mut fragments = HashMap::new();
        for region in Region::ALL {
            fragments.insert(region, switcher_fragment(region, built)?);
        }

        Ok(Self { rules, fragments })
    }

    /// Produce the page served from `<output>/<slug>/` for `region`.
    pub fn rewrite(&self, html: &str, region: Region) -> String {
        let out = self.rules.apply(html);
        let out = inject_region_marker(&out, region);

        match self.fragments.get(&region) {
            Some(fragment) => inject_switcher(&out, fragment),
            None => out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <link rel="stylesheet" href="Assets/base.css">
</head>
<body>
  <ul class="menu-list">
    <li><a href="/">Home</a></li>
    <li><a href="/pricing.html">Pricing</a></li>
    <li><a href="/#contact">Contact</a></li>
  </ul>
  <img src="img/hero.png">
  <script src="Assets/base.js"></script>
</body>
</html>
"##;

    #[test]
    fn rewrites_full_page() {
        let rewriter = Rewriter::new(&Region::ALL).unwrap();
        let out = rewriter.rewrite(PAGE, Region::Ca);

        assert!(out.contains(r#"<html lang="en" data-region="CA">"#));
        assert!(out.contains(r#"href="index.html""#));
        assert!(out.contains(r#"href="pricing.html""#));
        assert!(out.contains(r##"href="index.html#contact""##));
        assert!(out.contains(r#"src="../img/hero.png""#));
        assert!(out.contains(r#"href="../Assets/base.css""#));
        assert!(out.contains(r#"src="../Assets/base.js""#));
        assert!(!out.contains(r#"href="/pricing.html""#));
        assert!(!out.contains(r#"href="/#"#));
        assert!(out.contains("label:'United States'"));
    }

    #[test]
    fn switcher_sits_before_body_close() {
        let rewriter = Rewriter::new(&[Region::Us, Region::Au]).unwrap();
        let out = rewriter.rewrite(PAGE, Region::Us);

        let script = out.find("<script>").unwrap();
        let body_close = out.find("</body>").unwrap();
        assert!(script < body_close);
        assert!(out.contains("label:'Australia'"));
        assert!(!out.contains("Canada"));
    }

    #[test]
    fn output_is_deterministic() {
        let rewriter = Rewriter::new(&Region::ALL).unwrap();
        assert_eq!(
            rewriter.rewrite(PAGE, Region::Au),
            rewriter.rewrite(PAGE, Region::Au)
        );
    }
}
