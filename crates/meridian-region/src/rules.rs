//! Ordered pattern/replacement rules for moving a page one folder deeper.

use std::borrow::Cow;

use regex::Regex;

/// A single text substitution applied to every match in a page.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: &'static str,
    pattern: Regex,
    replacement: String,
}

impl RewriteRule {
    /// Compile a rule. `replacement` uses `regex` expansion syntax (`${1}`).
    pub fn new(
        name: &'static str,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Short identifier used in logs and tests.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace all matches in `input`.
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(input, self.replacement.as_str())
    }
}

/// An ordered list of rewrite rules.
///
/// Rules run in insertion order and each sees the output of the previous
/// one. This is a plain text rewrite, not an HTML parse: malformed markup
/// passes through with whatever literal matches it contains.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules that make root-relative links work from a region subfolder.
    pub fn subfolder() -> Self {
        const RULES: [(&str, &str, &str); 7] = [
            ("root", r#"href="/""#, r#"href="index.html""#),
            (
                "root-page",
                r#"href="/([a-zA-Z0-9_-]+\.html)""#,
                r#"href="${1}""#,
            ),
            (
                "root-nested",
                r#"href="/([a-zA-Z0-9_-]+/[^"]+)""#,
                r#"href="${1}""#,
            ),
            ("root-anchor", r#"href="/#([^"]+)""#, r#"href="index.html#${1}""#),
            ("assets", r#"(href|src)="Assets/"#, r#"${1}="../Assets/"#),
            ("img", r#"(href|src)="img/"#, r#"${1}="../img/"#),
            ("fonts", r#"(href|src)="fonts/"#, r#"${1}="../fonts/"#),
        ];

        let rules = RULES
            .into_iter()
            .map(|(name, pattern, replacement)| {
                RewriteRule::new(name, pattern, replacement).expect("Invalid built-in rewrite rule")
            })
            .collect();

        Self { rules }
    }

    /// Append a rule to the end of the set.
    pub fn push(&mut self, rule: RewriteRule) {
        self.rules.push(rule);
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Apply every rule in order.
    pub fn apply(&self, html: &str) -> String {
        let mut out = html.to_string();

        for rule in &self.rules {
            if let Cow::Owned(changed) = rule.apply(&out) {
                out = changed;
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(html: &str) -> String {
        RuleSet::subfolder().apply(html)
    }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = RuleSet::subfolder()
            .rules()
            .iter()
            .map(RewriteRule::name)
            .collect();
        assert_eq!(
            names,
            ["root", "root-page", "root-nested", "root-anchor", "assets", "img", "fonts"]
        );
    }

    #[test]
    fn rewrites_root_link_to_index() {
        assert_eq!(rewrite(r#"<a href="/">Home</a>"#), r#"<a href="index.html">Home</a>"#);
    }

    #[test]
    fn strips_slash_from_page_links() {
        assert_eq!(
            rewrite(r#"<a href="/pricing.html">P</a><a href="/faq.html">F</a>"#),
            r#"<a href="pricing.html">P</a><a href="faq.html">F</a>"#
        );
    }

    #[test]
    fn strips_slash_from_nested_links() {
        assert_eq!(
            rewrite(r#"<a href="/blog/post-1.html">B</a>"#),
            r#"<a href="blog/post-1.html">B</a>"#
        );
    }

    #[test]
    fn rewrites_root_anchors_onto_index() {
        assert_eq!(
            rewrite(r##"<a href="/#contact">C</a>"##),
            r##"<a href="index.html#contact">C</a>"##
        );
    }

    #[test]
    fn prefixes_asset_roots_once() {
        let html = r#"<link href="Assets/base.css"><img src="img/logo.png"><link href="fonts/a.woff2">"#;
        assert_eq!(
            rewrite(html),
            r#"<link href="../Assets/base.css"><img src="../img/logo.png"><link href="../fonts/a.woff2">"#
        );
    }

    #[test]
    fn leaves_external_and_relative_links_alone() {
        let html = r#"<a href="https://example.com/a.html"></a><a href="about.html"></a><img src="../img/x.png">"#;
        assert_eq!(rewrite(html), html);
    }

    #[test]
    fn custom_rules_run_after_defaults() {
        let mut rules = RuleSet::subfolder();
        rules.push(RewriteRule::new("cdn", r#"src="\.\./img/"#, r#"src="https://cdn/img/"#).unwrap());

        assert_eq!(rules.apply(r#"<img src="img/a.png">"#), r#"<img src="https://cdn/img/a.png">"#);
    }

    #[test]
    fn each_rule_sees_previous_output() {
        let mut rules = RuleSet::new();
        rules.push(RewriteRule::new("a", "a", "b").unwrap());
        rules.push(RewriteRule::new("none", "zzz", "y").unwrap());
        rules.push(RewriteRule::new("b", "b", "c").unwrap());

        assert_eq!(rules.apply("a-x"), "c-x");
        assert_eq!(RuleSet::new().apply("a-x"), "a-x");
    }
}
