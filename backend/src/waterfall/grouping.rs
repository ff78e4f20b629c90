//! Priority grouping
//!
//! Partitions share classes into groups of equal priority (stack order),
//! highest priority first. Members of a group are paid together, never one
//! after another, so the order inside a group carries no meaning; it follows
//! cap-table order only to keep output deterministic.

use crate::models::ShareClass;
use std::collections::BTreeMap;

/// Share classes that share one priority value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityGroup {
    /// Shared priority
    pub priority: i32,

    /// Indices into the cap table
    pub members: Vec<usize>,
}

/// Group classes by priority, sorted by priority descending
///
/// # Example
/// ```
/// use waterfall_core_rs::{PreferenceType, ShareClass};
/// use waterfall_core_rs::waterfall::group_by_priority;
///
/// let classes = vec![
///     ShareClass::common("Common", 100),
///     ShareClass::preferred("B", 10, 1_000, PreferenceType::NonParticipating).with_priority(2),
///     ShareClass::preferred("A", 10, 1_000, PreferenceType::NonParticipating).with_priority(1),
///     ShareClass::preferred("B2", 10, 1_000, PreferenceType::NonParticipating).with_priority(2),
/// ];
///
/// let groups = group_by_priority(&classes);
/// assert_eq!(groups.len(), 3);
/// assert_eq!(groups[0].priority, 2);
/// assert_eq!(groups[0].members, vec![1, 3]);
/// assert_eq!(groups[2].members, vec![0]);
/// ```
pub fn group_by_priority(classes: &[ShareClass]) -> Vec<PriorityGroup> {
    let mut by_priority: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, class) in classes.iter().enumerate() {
        by_priority.entry(class.priority()).or_default().push(index);
    }

    by_priority
        .into_iter()
        .rev()
        .map(|(priority, members)| PriorityGroup { priority, members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PreferenceType;

    #[test]
    fn test_empty_input() {
        assert!(group_by_priority(&[]).is_empty());
    }

    #[test]
    fn test_single_priority_single_group() {
        let classes = vec![
            ShareClass::common("Common", 1),
            ShareClass::common("ESOP", 1),
        ];
        let groups = group_by_priority(&classes);
        assert_eq!(groups, vec![PriorityGroup { priority: 0, members: vec![0, 1] }]);
    }

    #[test]
    fn test_groups_descend() {
        let classes = vec![
            ShareClass::preferred("P1", 1, 1, PreferenceType::NonParticipating).with_priority(1),
            ShareClass::preferred("P3", 1, 1, PreferenceType::NonParticipating).with_priority(3),
            ShareClass::preferred("P2", 1, 1, PreferenceType::NonParticipating).with_priority(2),
        ];
        let priorities: Vec<i32> = group_by_priority(&classes).iter().map(|g| g.priority).collect();
        assert_eq!(priorities, vec![3, 2, 1]);
    }
}
