//! Data-driven rule tables `{pattern, weight, tag}` and the one matcher that runs them.
//!
//! Tables live next to the component that owns them; this module only knows how
//! to evaluate a table against a piece of text.

use std::sync::LazyLock;

pub use regex::Regex;

/// A lazily compiled pattern. `None` when the pattern failed to compile.
pub type LazyPattern = LazyLock<Option<Regex>>;

/// Declare a lazily compiled rule pattern.
#[macro_export]
macro_rules! rule_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: $crate::rules::LazyPattern =
            std::sync::LazyLock::new(|| $crate::rules::Regex::new($regex_str).ok());
    };
}

/// How a rule recognizes text.
#[derive(Clone, Copy)]
pub enum Matcher {
    Pattern(&'static LazyPattern),
    /// For shapes a regex cannot express (e.g. repeated words).
    Predicate(fn(&str) -> bool),
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern(p) => match p.as_ref() {
                Some(re) => write!(f, "Pattern({})", re.as_str()),
                None => f.write_str("Pattern(<invalid>)"),
            },
            Self::Predicate(_) => f.write_str("Predicate"),
        }
    }
}

/// One row of a rule table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub tag: &'static str,
    pub matcher: Matcher,
    pub weight: i32,
    /// The rule is ignored when this pattern also matches.
    pub unless: Option<&'static LazyPattern>,
}

impl Rule {
    pub const fn pattern(tag: &'static str, pattern: &'static LazyPattern, weight: i32) -> Self {
        Self {
            tag,
            matcher: Matcher::Pattern(pattern),
            weight,
            unless: None,
        }
    }

    pub const fn predicate(tag: &'static str, check: fn(&str) -> bool, weight: i32) -> Self {
        Self {
            tag,
            matcher: Matcher::Predicate(check),
            weight,
            unless: None,
        }
    }

    pub const fn unless(mut self, pattern: &'static LazyPattern) -> Self {
        self.unless = Some(pattern);
        self
    }

    /// Whether the rule fires on `text`. Rules with a broken pattern never fire.
    pub fn matches(&self, text: &str) -> bool {
        let hit = match self.matcher {
            Matcher::Pattern(p) => p.as_ref().is_some_and(|re| re.is_match(text)),
            Matcher::Predicate(check) => check(text),
        };
        if !hit {
            return false;
        }
        match self.unless {
            Some(p) => !p.as_ref().is_some_and(|re| re.is_match(text)),
            None => true,
        }
    }
}

/// A fired rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleHit {
    pub tag: &'static str,
    pub weight: i32,
}

/// Every rule in `table` that fires, in table order.
pub fn evaluate(table: &[Rule], text: &str) -> Vec<RuleHit> {
    table
        .iter()
        .filter(|r| r.matches(text))
        .map(|r| RuleHit {
            tag: r.tag,
            weight: r.weight,
        })
        .collect()
}

/// The first rule in `table` that fires.
pub fn first_match(table: &[Rule], text: &str) -> Option<RuleHit> {
    table.iter().find(|r| r.matches(text)).map(|r| RuleHit {
        tag: r.tag,
        weight: r.weight,
    })
}

/// Sum of weights of every firing rule.
pub fn total_weight(table: &[Rule], text: &str) -> i32 {
    table
        .iter()
        .filter(|r| r.matches(text))
        .map(|r| r.weight)
        .sum()
}

/// Tags whose pattern failed to compile.
pub fn broken_rules(table: &[Rule]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|r| {
            let main = matches!(r.matcher, Matcher::Pattern(p) if p.is_none());
            let guard = r.unless.is_some_and(|p| p.is_none());
            main || guard
        })
        .map(|r| r.tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    rule_pattern!(RE_DIGITS, r"\d+");
    rule_pattern!(RE_YEAR, r"\b(19|20)\d{2}\b");
    rule_pattern!(RE_BROKEN, r"(unclosed");

    fn shouty(text: &str) -> bool {
        text.len() > 3 && text.chars().all(|c| !c.is_lowercase())
    }

    static TABLE: [Rule; 3] = [
        Rule::pattern("digits", &RE_DIGITS, 2).unless(&RE_YEAR),
        Rule::predicate("shouty", shouty, 1),
        Rule::pattern("broken", &RE_BROKEN, 5),
    ];

    #[test]
    fn unless_guard_suppresses_rule() {
        assert_eq!(total_weight(&TABLE, "took 42 ms"), 2);
        assert_eq!(total_weight(&TABLE, "back in 1999 42"), 0);
    }

    #[test]
    fn predicates_and_order() {
        let hits = evaluate(&TABLE, "ERROR 500");
        assert_eq!(hits.iter().map(|h| h.tag).collect::<Vec<_>>(), vec!["digits", "shouty"]);
        assert_eq!(first_match(&TABLE, "STOP").map(|h| h.tag), Some("shouty"));
        assert_eq!(first_match(&TABLE, "calm"), None);
    }

    #[test]
    fn broken_patterns_never_fire_and_are_reported() {
        assert!(!TABLE[2].matches("(unclosed"));
        assert_eq!(broken_rules(&TABLE), vec!["broken"]);
    }
}
