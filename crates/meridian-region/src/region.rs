//! Supported market regions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A market variant of the site, served from its own output folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    Us,
    Au,
    Ca,
}

impl Region {
    /// Every region, in build order.
    pub const ALL: [Region; 3] = [Region::Us, Region::Au, Region::Ca];

    /// Identifier used in the `data-region` marker (e.g. "US").
    pub fn id(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Au => "AU",
            Self::Ca => "CA",
        }
    }

    /// Output folder name (e.g. "us").
    pub fn slug(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Au => "au",
            Self::Ca => "ca",
        }
    }

    /// Human-readable name shown in the region switcher.
    pub fn label(self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Au => "Australia",
            Self::Ca => "Canada",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a string names no known region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown region: {0} (expected one of US, AU, CA)")]
pub struct ParseRegionError(pub String);

impl FromStr for Region {
    type Err = ParseRegionError;

    /// Accepts either the identifier or the slug, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseRegionError(s.to_string()))
    }
}

impl TryFrom<String> for Region {
    type Error = ParseRegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_slugs() {
        assert_eq!("US".parse::<Region>().unwrap(), Region::Us);
        assert_eq!("au".parse::<Region>().unwrap(), Region::Au);
        assert_eq!(" Ca ".parse::<Region>().unwrap(), Region::Ca);
    }

    #[test]
    fn rejects_unknown_region() {
        let err = "NZ".parse::<Region>().unwrap_err();
        assert_eq!(err, ParseRegionError("NZ".to_string()));
    }

    #[test]
    fn slugs_are_lowercase_ids() {
        for region in Region::ALL {
            assert_eq!(region.slug(), region.id().to_lowercase());
        }
    }

    #[test]
    fn deserializes_from_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            regions: Vec<Region>,
        }

        let w: Wrapper = serde_json::from_str(r#"{"regions":["us","CA"]}"#).unwrap();
        assert_eq!(w.regions, vec![Region::Us, Region::Ca]);
        assert!(serde_json::from_str::<Wrapper>(r#"{"regions":["nz"]}"#).is_err());
    }
}
