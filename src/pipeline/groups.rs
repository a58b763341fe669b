//! Category-group summaries.

use crate::model::CategoryGroup;
use crate::view::GroupSummary;

/// Sums each group's available balances and selects which groups to show: everything with a
/// positive total when no groups are requested, or exactly the requested groups regardless
/// of sign. Output is alphabetical by group name.
pub(super) fn summaries(groups: &[CategoryGroup], requested: &[String]) -> Vec<GroupSummary> {
    let mut summaries: Vec<GroupSummary> = groups
        .iter()
        .filter(|g| !g.deleted && !g.categories.is_empty())
        .filter_map(|group| {
            let total = group.total_available();
            let include = if requested.is_empty() {
                total.is_positive()
            } else {
                requested.contains(&group.name)
            };
            include.then(|| GroupSummary {
                name: group.name.clone(),
                total_available: total.amount(),
                category_count: group.categories.len(),
            })
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}
