//! Registry of pages rendered for each region.

use std::collections::BTreeMap;

use meridian_region::Region;

/// Where a logical page's HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    /// One source file rewritten independently for every region.
    Shared(String),

    /// A distinct source file per region.
    Regional(BTreeMap<Region, String>),
}

impl PageSource {
    /// Source file backing `region`, if the page applies to it.
    pub fn file_for(&self, region: Region) -> Option<&str> {
        match self {
            Self::Shared(file) => Some(file.as_str()),
            Self::Regional(files) => files.get(&region).map(String::as_str),
        }
    }
}

/// Ordered mapping from logical page name to its source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageRegistry {
    pages: Vec<(String, PageSource)>,
}

/// Pages shipped with the site that share one source across regions.
const SHARED_PAGES: [&str; 9] = [
    "index",
    "blogs",
    "chatbot",
    "faq",
    "insights",
    "reach",
    "dms-management",
    "website-management",
    "photo-studio-360",
];

impl PageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The marketing site's page set, with per-region pricing.
    pub fn site_default() -> Self {
        let mut registry = Self::new();
        for name in SHARED_PAGES {
            registry = registry.shared(name);
        }

        let pricing = Region::ALL
            .into_iter()
            .map(|r| (r, format!("pricing-{}.html", r.slug())))
            .collect();
        registry.regional("pricing", pricing)
    }

    /// Register a page backed by `<name>.html` for every region.
    ///
    /// A trailing `.html` on `name` is ignored.
    pub fn shared(self, name: &str) -> Self {
        let name = logical_name(name);
        let file = format!("{name}.html");
        self.with(name, PageSource::Shared(file))
    }

    /// Register a page with a distinct source file per region.
    pub fn regional(self, name: &str, files: BTreeMap<Region, String>) -> Self {
        self.with(logical_name(name), PageSource::Regional(files))
    }

    /// Insert or replace a page, keeping its original position on replace.
    fn with(mut self, name: &str, source: PageSource) -> Self {
        match self.pages.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = source,
            None => self.pages.push((name.to_string(), source)),
        }
        self
    }

    /// Pages in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PageSource)> {
        self.pages.iter().map(|(name, source)| (name.as_str(), source))
    }

    /// Look up a page by logical name.
    pub fn get(&self, name: &str) -> Option<&PageSource> {
        self.pages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, source)| source)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn logical_name(name: &str) -> &str {
    name.strip_suffix(".html").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_regional_pricing() {
        let registry = PageRegistry::site_default();

        assert_eq!(registry.len(), 10);
        assert_eq!(
            registry.get("index"),
            Some(&PageSource::Shared("index.html".to_string()))
        );

        let pricing = registry.get("pricing").unwrap();
        assert_eq!(pricing.file_for(Region::Us), Some("pricing-us.html"));
        assert_eq!(pricing.file_for(Region::Ca), Some("pricing-ca.html"));
    }

    #[test]
    fn regional_page_without_region_entry_is_absent() {
        let registry = PageRegistry::new().regional(
            "pricing",
            BTreeMap::from([(Region::Us, "pricing-us.html".to_string())]),
        );

        let pricing = registry.get("pricing").unwrap();
        assert_eq!(pricing.file_for(Region::Au), None);
    }

    #[test]
    fn shared_accepts_html_suffix_and_replaces_in_place() {
        let registry = PageRegistry::new()
            .shared("faq.html")
            .shared("index")
            .regional(
                "faq",
                BTreeMap::from([(Region::Au, "faq-au.html".to_string())]),
            );

        let names: Vec<_> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["faq", "index"]);
        assert_eq!(registry.get("faq").unwrap().file_for(Region::Au), Some("faq-au.html"));
    }
}
