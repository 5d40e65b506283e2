//! Built-in templates for pages the generator writes itself.

use minijinja::{context, Environment};
use serde::Serialize;

use meridian_region::Region;

/// A region as exposed to the geo-dispatch template.
#[derive(Debug, Clone, Serialize)]
pub struct RegionEntry {
    /// Identifier, e.g. "US"
    pub id: &'static str,
    /// Output folder, e.g. "us"
    pub slug: &'static str,
    /// Display name
    pub label: &'static str,
    /// IANA timezone prefixes that select this region
    pub zones: &'static [&'static str],
}

impl From<Region> for RegionEntry {
    fn from(region: Region) -> Self {
        Self {
            id: region.id(),
            slug: region.slug(),
            label: region.label(),
            zones: timezone_hints(region),
        }
    }
}

fn timezone_hints(region: Region) -> &'static [&'static str] {
    match region {
        Region::Us => &[],
        Region::Au => &["Australia/"],
        Region::Ca => &[
            "America/Toronto",
            "America/Vancouver",
            "America/Edmonton",
            "America/Winnipeg",
            "America/Halifax",
            "America/Regina",
            "America/St_Johns",
        ],
    }
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template("index-redirect", GEO_DISPATCH_TEMPLATE)
            .expect("Failed to add geo dispatch template");

        Self { env }
    }

    /// Render the root page that sends visitors to their region folder.
    ///
    /// The first region in `regions` is the fallback.
    pub fn render_geo_dispatch(&self, regions: &[Region]) -> Result<String, minijinja::Error> {
        let entries: Vec<RegionEntry> = regions.iter().copied().map(RegionEntry::from).collect();
        let fallback = regions.first().copied().unwrap_or(Region::Us).slug();

        self.env.get_template("index-redirect")?.render(context! {
            regions => entries,
            fallback => fallback,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const GEO_DISPATCH_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="robots" content="noindex">
  <title>Choose your region</title>
  <noscript><meta http-equiv="refresh" content="0; url=/{{ fallback }}/"></noscript>
  <script>
  (function(){
    var tz='';
    try{tz=Intl.DateTimeFormat().resolvedOptions().timeZone||'';}catch(e){}
    var lang=(navigator.language||'').toUpperCase();
    var regions=[{% for r in regions %}{slug:'{{ r.slug }}',id:'{{ r.id }}',zones:[{% for z in r.zones %}'{{ z }}'{% if not loop.last %},{% endif %}{% endfor %}]}{% if not loop.last %},{% endif %}{% endfor %}];
    var target='{{ fallback }}';
    var byZone=regions.filter(function(r){return r.zones.some(function(z){return tz.indexOf(z)===0;});})[0];
    var byLang=regions.filter(function(r){return lang.slice(-3)==='-'+r.id;})[0];
    var match=byZone||byLang;
    if(match){target=match.slug;}
    location.replace('/'+target+'/'+location.search+location.hash);
  })();
  </script>
</head>
<body>
  <ul>
  {% for r in regions %}
    <li><a href="/{{ r.slug }}/">{{ r.label }}</a></li>
  {% endfor %}
  </ul>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_links_for_every_region() {
        let html = TemplateEngine::new()
            .render_geo_dispatch(&Region::ALL)
            .unwrap();

        assert!(html.contains(r#"<a href="/us/">United States</a>"#));
        assert!(html.contains(r#"<a href="/au/">Australia</a>"#));
        assert!(html.contains(r#"<a href="/ca/">Canada</a>"#));
        assert!(html.contains("zones:['Australia/']"));
        assert!(html.contains("var target='us';"));
    }

    #[test]
    fn timezone_wins_over_language() {
        let html = TemplateEngine::new()
            .render_geo_dispatch(&Region::ALL)
            .unwrap();

        let by_zone = html.find("var byZone=").unwrap();
        let by_lang = html.find("var byLang=").unwrap();
        assert!(by_zone < by_lang);
        assert!(html.contains("var match=byZone||byLang;"));
    }

    #[test]
    fn falls_back_to_first_region() {
        let html = TemplateEngine::new()
            .render_geo_dispatch(&[Region::Au, Region::Ca])
            .unwrap();

        assert!(html.contains("url=/au/"));
        assert!(html.contains("var target='au';"));
        assert!(!html.contains("/us/"));
    }
}
