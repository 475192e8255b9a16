//! Low-abundance groups from a mothur logfile.
//!
//! Grammar of a relevant line, after stripping `.` and line endings
//! from both ends:
//!
//! ```text
//! <group> contains <count>
//! ```
//!
//! Lines without the keyword, without the ` contains ` separator or
//! with a non-integer count are skipped.

use hashbrown::HashMap;

use crate::consts::{GROUP_SEPARATOR, LOG_KEYWORD, LOG_STRIP_CHARS};

/// Parse one logfile line into `(group, count)`.
///
/// # Example
///
/// ```rust, no_run
/// use mothulity::extract::groups::parse_count_line;
///
/// assert_eq!(parse_count_line("GroupA contains 50.\n"), Some(("GroupA", 50)));
/// assert_eq!(parse_count_line("Output File Names:"), None);
/// ```
pub fn parse_count_line(line: &str) -> Option<(&str, u64)> {
    if !line.contains(LOG_KEYWORD) {
        return None;
    }

    let line = line.trim_matches(LOG_STRIP_CHARS);
    let separator = format!(" {} ", LOG_KEYWORD);
    let mut parts = line.split(separator.as_str());

    let group = parts.next()?;
    let count = parts.next()?.trim().parse::<u64>().ok()?;

    Some((group, count))
}

/// Ordered set of group identifiers to drop from the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedGroups(Vec<String>);

impl ExcludedGroups {
    pub fn new(groups: Vec<String>) -> Self {
        Self(groups)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Groups joined with the mothur group separator.
    pub fn joined(&self) -> String {
        self.0.join(GROUP_SEPARATOR)
    }
}

/// Collect every group whose count is below `threshold`.
///
/// A group reported on several lines keeps its first position but the
/// count of its last line.
pub fn groups_below(log: &str, threshold: u64) -> ExcludedGroups {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, u64> = HashMap::new();

    for (group, count) in log.lines().filter_map(parse_count_line) {
        if counts.insert(group, count).is_none() {
            order.push(group);
        }
    }

    ExcludedGroups::new(
        order
            .into_iter()
            .filter(|group| counts[group] < threshold)
            .map(str::to_string)
            .collect(),
    )
}
