//! Intent rules — the threshold → limit policy table.
//!
//! An intent file is a YAML document with a top-level `rules` list:
//!
//! ```yaml
//! rules:
//!   - threshold: 0
//!     cpu: "100m"
//!   - threshold: 50
//!     cpu: "500m"
//!   - threshold: 100
//!     cpu: "1"
//! ```
//!
//! Rules are sorted ascending by threshold at load time (stable, so
//! duplicate thresholds keep file order). The rule with the highest
//! threshold doubles as the overflow tier for loads above every threshold.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RuleError, RuleResult};

/// A single policy tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Upper bound (inclusive) of the session count this tier covers.
    pub threshold: u64,
    /// Resource quantity to apply, e.g. `"500m"` or `"1"`.
    #[serde(rename = "cpu", alias = "limit")]
    pub limit: String,
}

impl Rule {
    pub fn new(threshold: u64, limit: impl Into<String>) -> Self {
        Self {
            threshold,
            limit: limit.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentDocument {
    rules: Vec<Rule>,
}

/// Ordered, non-empty, immutable rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Load and validate an intent file.
    pub fn load(path: &Path) -> RuleResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), tiers = set.len(), "intent loaded");
        Ok(set)
    }

    /// Parse an intent document from a YAML string.
    pub fn from_yaml_str(content: &str) -> RuleResult<Self> {
        let doc: IntentDocument = serde_yaml::from_str(content)?;
        Self::from_rules(doc.rules)
    }

    /// Build a rule set from already-parsed rules.
    pub fn from_rules(mut rules: Vec<Rule>) -> RuleResult<Self> {
        if rules.is_empty() {
            return Err(RuleError::Empty);
        }
        if let Some(bad) = rules.iter().find(|r| r.limit.trim().is_empty()) {
            return Err(RuleError::EmptyLimit {
                threshold: bad.threshold,
            });
        }
        // `sort_by_key` is stable.
        rules.sort_by_key(|r| r.threshold);
        Ok(Self { rules })
    }

    /// Resolve the target limit for a session count.
    ///
    /// Returns the limit of the first tier whose threshold is at least
    /// `sessions`, or the highest tier's limit when `sessions` exceeds
    /// every threshold.
    pub fn resolve(&self, sessions: u64) -> &str {
        self.rules
            .iter()
            .find(|r| sessions <= r.threshold)
            .or_else(|| self.rules.last())
            .map(|r| r.limit.as_str())
            .unwrap_or_default()
    }

    /// Rules in ascending threshold order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tiers() -> RuleSet {
        RuleSet::from_rules(vec![
            Rule::new(0, "100m"),
            Rule::new(50, "500m"),
            Rule::new(100, "1"),
        ])
        .unwrap()
    }

    #[test]
    fn resolves_to_first_tier_covering_signal() {
        assert_eq!(tiers().resolve(30), "500m");
    }

    #[test]
    fn overflow_uses_highest_tier() {
        assert_eq!(tiers().resolve(500), "1");
    }

    #[test]
    fn zero_sessions_selects_lowest_tier() {
        assert_eq!(tiers().resolve(0), "100m");
    }

    #[test]
    fn threshold_is_inclusive() {
        let set = tiers();
        assert_eq!(set.resolve(50), "500m");
        assert_eq!(set.resolve(51), "1");
        assert_eq!(set.resolve(100), "1");
    }

    #[test]
    fn resolve_is_deterministic() {
        let set = tiers();
        for signal in [0, 1, 49, 50, 99, 100, 101, u64::MAX] {
            assert_eq!(set.resolve(signal), set.resolve(signal));
        }
        assert_eq!(set.resolve(u64::MAX), "1");
    }

    #[test]
    fn single_rule_covers_everything() {
        let set = RuleSet::from_rules(vec![Rule::new(10, "250m")]).unwrap();
        assert_eq!(set.resolve(0), "250m");
        assert_eq!(set.resolve(10_000), "250m");
    }

    #[test]
    fn unsorted_rules_are_sorted_at_load() {
        let set = RuleSet::from_rules(vec![
            Rule::new(100, "1"),
            Rule::new(0, "100m"),
            Rule::new(50, "500m"),
        ])
        .unwrap();
        let thresholds: Vec<u64> = set.rules().iter().map(|r| r.threshold).collect();
        assert_eq!(thresholds, vec![0, 50, 100]);
        assert_eq!(set.resolve(30), "500m");
    }

    #[test]
    fn duplicate_thresholds_keep_file_order() {
        let set = RuleSet::from_rules(vec![
            Rule::new(50, "first"),
            Rule::new(10, "low"),
            Rule::new(50, "second"),
        ])
        .unwrap();
        assert_eq!(set.resolve(40), "first");
        assert_eq!(set.rules()[2].limit, "second");
        // Overflow picks the last of the highest tier.
        assert_eq!(set.resolve(60), "second");
    }

    #[test]
    fn empty_rule_list_is_rejected() {
        assert!(matches!(RuleSet::from_rules(vec![]), Err(RuleError::Empty)));
    }

    #[test]
    fn blank_limit_is_rejected() {
        let err = RuleSet::from_rules(vec![Rule::new(0, "100m"), Rule::new(5, " ")]).unwrap_err();
        assert!(matches!(err, RuleError::EmptyLimit { threshold: 5 }));
    }

    #[test]
    fn parses_intent_yaml() {
        let yaml = r#"
rules:
  - threshold: 100
    cpu: "1"
  - threshold: 0
    cpu: "100m"
  - threshold: 50
    cpu: "500m"
"#;
        let set = RuleSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set, tiers());
    }

    #[test]
    fn accepts_limit_alias() {
        let yaml = "rules:\n  - threshold: 5\n    limit: \"2\"\n";
        let set = RuleSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.resolve(1), "2");
    }

    #[test]
    fn empty_rules_key_is_rejected() {
        let err = RuleSet::from_yaml_str("rules: []\n").unwrap_err();
        assert!(matches!(err, RuleError::Empty));
    }

    #[test]
    fn missing_rules_key_is_malformed() {
        let err = RuleSet::from_yaml_str("tiers: []\n").unwrap_err();
        assert!(matches!(err, RuleError::Parse(_)));
    }

    #[test]
    fn negative_threshold_is_malformed() {
        let err = RuleSet::from_yaml_str("rules:\n  - threshold: -1\n    cpu: \"1\"\n").unwrap_err();
        assert!(matches!(err, RuleError::Parse(_)));
    }

    #[test]
    fn shipped_intent_parses() {
        let set = RuleSet::from_yaml_str(include_str!("../../../deploy/intent.yaml")).unwrap();
        assert_eq!(set, tiers());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rules:\n  - threshold: 0\n    cpu: \"100m\"").unwrap();

        let set = RuleSet::load(file.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.resolve(7), "100m");
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuleSet::load(&dir.path().join("intent.yaml")).unwrap_err();
        assert!(matches!(err, RuleError::Read { .. }));
    }
}
