//! Precompiled rule snapshot.
//! Patterns are compiled once, when the snapshot is built. A rule whose pattern fails to
//! compile, or whose target folder is empty, stays in the snapshot (so it can be listed and
//! saved) but is inert: matching skips it. Problems are logged once here, never per file.

use regex::Regex;
use tracing::warn;

use super::FolderRule;
use crate::errors::RuleMoveError;

#[derive(Debug)]
struct CompiledRule {
    rule: FolderRule,
    matcher: Result<Regex, regex::Error>,
}

impl CompiledRule {
    /// An explicit `/` targets the vault root; a blank folder is treated as unset.
    fn has_target(&self) -> bool {
        !self.rule.target_folder.trim().is_empty()
    }

    fn active_matcher(&self) -> Option<&Regex> {
        match &self.matcher {
            Ok(re) if self.has_target() => Some(re),
            _ => None,
        }
    }
}

/// Ordered, immutable collection of folder rules. Earlier rules win.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile every rule; invalid ones are reported once and left inert.
    pub fn new(rules: Vec<FolderRule>) -> Self {
        let compiled: Vec<CompiledRule> = rules
            .into_iter()
            .map(|rule| {
                let matcher = Regex::new(&rule.file_regex);
                CompiledRule { rule, matcher }
            })
            .collect();

        let set = Self { rules: compiled };
        for issue in set.validate() {
            warn!(code = issue.code(), kind = issue.kind(), "{issue}; rule will be skipped");
        }
        set
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Report invalid patterns and empty target folders. Never fails.
    pub fn validate(&self) -> Vec<RuleMoveError> {
        let mut issues = Vec::new();
        for (index, compiled) in self.rules.iter().enumerate() {
            if let Err(e) = &compiled.matcher {
                issues.push(RuleMoveError::InvalidRulePattern {
                    index,
                    pattern: compiled.rule.file_regex.clone(),
                    source: e.clone(),
                });
            }
            if !compiled.has_target() {
                issues.push(RuleMoveError::EmptyTargetFolder {
                    index,
                    pattern: compiled.rule.file_regex.clone(),
                });
            }
        }
        issues
    }

    /// Active rules in order, paired with their compiled pattern. Inert rules are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (&FolderRule, &Regex)> {
        self.rules
            .iter()
            .filter_map(|c| c.active_matcher().map(|re| (&c.rule, re)))
    }

    /// Every rule in order, inert ones included.
    pub fn rules(&self) -> impl Iterator<Item = &FolderRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// Whether the rule at `index` takes part in matching.
    pub fn is_active(&self, index: usize) -> bool {
        self.rules
            .get(index)
            .is_some_and(|c| c.active_matcher().is_some())
    }

    pub fn to_rules(&self) -> Vec<FolderRule> {
        self.rules().cloned().collect()
    }
}

impl From<Vec<FolderRule>> for RuleSet {
    fn from(rules: Vec<FolderRule>) -> Self {
        Self::new(rules)
    }
}

impl FromIterator<FolderRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = FolderRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
