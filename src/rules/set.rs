//! Rule sets: domain-scoped, ordered groups of rules with a path predicate

use crate::rules::base::Rule;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Compliance domain a rule set covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Medical,
    Payment,
    #[serde(rename = "typescript")]
    TypeSafety,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Medical => "medical",
            Domain::Payment => "payment",
            Domain::TypeSafety => "typescript",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "medical" => Ok(Domain::Medical),
            "payment" => Ok(Domain::Payment),
            "typescript" | "ts" | "type-safety" => Ok(Domain::TypeSafety),
            other => anyhow::bail!("unknown domain '{}' (expected medical, payment, typescript)", other),
        }
    }
}

/// Path predicate deciding whether a rule set claims a file
///
/// Matching is always done against the lowercase path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Route {
    /// Claims the path if it contains any keyword
    Keywords(Vec<&'static str>),
    /// Claims the path if it ends with any suffix (extensions or exact file names)
    Suffixes(Vec<&'static str>),
}

impl Route {
    pub fn claims(&self, path_lower: &str) -> bool {
        match self {
            Route::Keywords(words) => words.iter().any(|w| path_lower.contains(w)),
            Route::Suffixes(suffixes) => suffixes.iter().any(|s| path_lower.ends_with(s)),
        }
    }

    pub fn values(&self) -> &[&'static str] {
        match self {
            Route::Keywords(v) | Route::Suffixes(v) => v,
        }
    }
}

/// Text printed around a rule set's results
#[derive(Debug, Clone, Default)]
pub struct Banner {
    /// Icon and label for the "Validating ..." header
    pub icon: &'static str,
    pub label: &'static str,
    /// Closing line when this domain blocks the edit
    pub on_block: &'static str,
    /// Closing line when this domain only has warnings
    pub on_warn: &'static str,
}

/// A named, ordered collection of rules scoped to one domain
pub struct RuleSet {
    domain: Domain,
    route: Route,
    rules: Vec<Arc<dyn Rule>>,
    banner: Banner,
    /// (path keyword, reminder) pairs; the first keyword found in the path wins
    hints: Vec<(&'static str, &'static str)>,
}

impl RuleSet {
    pub fn builder(domain: Domain) -> RuleSetBuilder {
        RuleSetBuilder::new(domain)
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    /// Whether this set applies to `path` (case-insensitive)
    pub fn claims(&self, path: &str) -> bool {
        self.route.claims(&path.to_lowercase())
    }

    /// Contextual reminder for a path, if any
    pub fn hint_for(&self, path: &str) -> Option<&'static str> {
        let lower = path.to_lowercase();
        self.hints
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, hint)| *hint)
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("domain", &self.domain)
            .field("route", &self.route)
            .field("rules", &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`RuleSet`]
pub struct RuleSetBuilder {
    domain: Domain,
    route: Option<Route>,
    rules: Vec<Arc<dyn Rule>>,
    banner: Banner,
    hints: Vec<(&'static str, &'static str)>,
}

impl RuleSetBuilder {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            route: None,
            rules: Vec::new(),
            banner: Banner::default(),
            hints: Vec::new(),
        }
    }

    /// Route by path keywords (stored lowercase)
    pub fn keywords(mut self, words: &[&'static str]) -> Self {
        self.route = Some(Route::Keywords(words.to_vec()));
        self
    }

    /// Route by path suffixes (stored lowercase)
    pub fn suffixes(mut self, suffixes: &[&'static str]) -> Self {
        self.route = Some(Route::Suffixes(suffixes.to_vec()));
        self
    }

    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn banner(mut self, banner: Banner) -> Self {
        self.banner = banner;
        self
    }

    pub fn hint(mut self, path_keyword: &'static str, hint: &'static str) -> Self {
        self.hints.push((path_keyword, hint));
        self
    }

    /// Build the set. Fails when no routing values were given, or when a
    /// routing value is not lowercase (it could never match).
    pub fn build(self) -> Result<RuleSet> {
        let Some(route) = self.route else {
            anyhow::bail!("rule set '{}' has no routing keywords", self.domain);
        };
        if route.values().is_empty() {
            anyhow::bail!("rule set '{}' has an empty keyword list", self.domain);
        }
        if let Some(bad) = route.values().iter().find(|v| v.to_lowercase() != **v) {
            anyhow::bail!("rule set '{}' has non-lowercase keyword '{}'", self.domain, bad);
        }

        Ok(RuleSet {
            domain: self.domain,
            route,
            rules: self.rules,
            banner: self.banner,
            hints: self.hints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_route_is_case_insensitive() {
        let set = RuleSet::builder(Domain::Payment)
            .keywords(&["checkout", "pix"])
            .build()
            .unwrap();
        assert!(set.claims("src/pages/CheckoutPage.jsx"));
        assert!(set.claims("src/PIX/status.js"));
        assert!(!set.claims("src/pages/Home.jsx"));
    }

    #[test]
    fn test_suffix_route() {
        let route = Route::Suffixes(vec![".ts", ".tsx", "tsconfig.json"]);
        assert!(route.claims("src/app.tsx"));
        assert!(route.claims("tsconfig.json"));
        assert!(!route.claims("src/app.ts.bak"));
        assert!(!route.claims("src/app.js"));
    }

    #[test]
    fn test_build_requires_keywords() {
        assert!(RuleSet::builder(Domain::Medical).build().is_err());
        assert!(RuleSet::builder(Domain::Medical).keywords(&[]).build().is_err());
        assert!(RuleSet::builder(Domain::Medical)
            .keywords(&["Medical"])
            .build()
            .is_err());
    }

    #[test]
    fn test_hint_first_keyword_wins() {
        let set = RuleSet::builder(Domain::Medical)
            .keywords(&["form", "profile"])
            .hint("form", "form hint")
            .hint("profile", "profile hint")
            .build()
            .unwrap();
        assert_eq!(set.hint_for("src/ProfileForm.tsx"), Some("form hint"));
        assert_eq!(set.hint_for("src/profile/view.tsx"), Some("profile hint"));
        assert_eq!(set.hint_for("src/qrcode.tsx"), None);
    }

    #[test]
    fn test_domain_parse() {
        assert_eq!("Medical".parse::<Domain>().unwrap(), Domain::Medical);
        assert_eq!("ts".parse::<Domain>().unwrap(), Domain::TypeSafety);
        assert!("billing".parse::<Domain>().is_err());
    }
}
