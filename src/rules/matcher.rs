//! First-match rule selection.

use tracing::{debug, trace};

use super::{FolderRule, RuleSet};
use crate::file::FileDescriptor;

/// Return the earliest active rule whose pattern matches the file's name or its path.
///
/// Matching is a case-sensitive, unanchored search; anchors are whatever the pattern says.
/// Inert rules (bad pattern, blank target) are skipped as if absent.
pub fn select_rule<'a>(rules: &'a RuleSet, file: &FileDescriptor) -> Option<&'a FolderRule> {
    let selected = rules
        .iter()
        .find(|(rule, re)| {
            let name_match = re.is_match(&file.name);
            let path_match = re.is_match(&file.path);
            trace!(
                pattern = %rule.file_regex,
                name_match,
                path_match,
                "rule test"
            );
            name_match || path_match
        })
        .map(|(rule, _)| rule);

    match selected {
        Some(rule) => debug!(
            path = %file.path,
            pattern = %rule.file_regex,
            target = %rule.target_folder,
            "selected rule"
        ),
        None => debug!(path = %file.path, "no applicable rule"),
    }
    selected
}
