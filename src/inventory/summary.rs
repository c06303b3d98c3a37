use crate::inventory::derive::{category_labels, AgeCategory, WarrantyStatus};
use crate::inventory::query::Selection;
use crate::inventory::role::SemanticRole;
use crate::inventory::Inventory;

/// Label used for blank values in breakdowns.
pub(crate) const BLANK_LABEL: &str = "(blank)";

/// Roles broken down by value in the regional summary.
/// Regional breakdowns and the metric name each one is reported under.
const BREAKDOWN_ROLES: [(SemanticRole, &str); 3] = [
    (SemanticRole::Site, "site"),
    (SemanticRole::Location, "location"),
    (SemanticRole::Department, "department"),
];

/// One line of the flattened summary: metric, label, count, share of the total in percent.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Metric {
    pub(crate) metric: &'static str,
    pub(crate) label: String,
    pub(crate) count: usize,
    pub(crate) share: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    pub(crate) total: usize,
    pub(crate) marked: usize,
    pub(crate) active: usize,
    /// Marked rows as a percentage of the total, 0 for an empty selection
    pub(crate) replacement_rate: f64,
    pub(crate) categories: Vec<(&'static str, usize)>,
    pub(crate) age_categories: Vec<(AgeCategory, usize)>,
    pub(crate) warranty_statuses: Vec<(WarrantyStatus, usize)>,
    /// One breakdown per resolved regional role
    pub(crate) breakdowns: Vec<Breakdown>,
}

/// Value counts of one role, most frequent first.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Breakdown {
    pub(crate) role: SemanticRole,
    pub(crate) metric: &'static str,
    pub(crate) counts: Vec<(String, usize)>,
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Counts values keeping first-appearance order, then sorts by count descending (stable).
fn value_counts<I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        let value = if value.is_empty() { BLANK_LABEL.to_owned() } else { value };
        match counts.iter_mut().find(|(existing, _)| *existing == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

impl Summary {
    pub(crate) fn of(inventory: &Inventory, selection: &Selection) -> Self {
        let total = selection.rows.len();
        let marked = selection.marked.len();
        let derived = || selection.rows.iter().map(|record| &inventory.derived[*record]);

        let categories = category_labels()
            .map(|label| (label, derived().filter(|derived| derived.category == label).count()))
            .collect();
        let age_categories = AgeCategory::ALL
            .into_iter()
            .map(|category| (category, derived().filter(|derived| derived.age_category == category).count()))
            .collect();
        let warranty_statuses = WarrantyStatus::ALL
            .into_iter()
            .map(|status| (status, derived().filter(|derived| derived.warranty_status == status).count()))
            .collect();
        let breakdowns = BREAKDOWN_ROLES
            .into_iter()
            .filter_map(|(role, metric)| {
                let column = inventory.column(role)?;
                let values = selection
                    .rows
                    .iter()
                    .map(|record| inventory.table.records[*record].text(column));
                Some(Breakdown {
                    role,
                    metric,
                    counts: value_counts(values),
                })
            })
            .collect();

        Self {
            total,
            marked,
            active: total - marked,
            replacement_rate: percent(marked, total),
            categories,
            age_categories,
            warranty_statuses,
            breakdowns,
        }
    }

    /// Flattens the summary into metric rows.
    pub(crate) fn metrics(&self) -> Vec<Metric> {
        let total = self.total;
        let metric = |metric: &'static str, label: &str, count: usize| Metric {
            metric,
            label: label.to_owned(),
            count,
            share: percent(count, total),
        };

        let mut metrics = vec![
            metric("total", "Total Assets", self.total),
            metric("replacement", "Marked for Replacement", self.marked),
            metric("active", "Active Assets", self.active),
        ];
        metrics.extend(self.categories.iter().map(|(label, count)| metric("category", *label, *count)));
        metrics.extend(
            self.age_categories
                .iter()
                .map(|(category, count)| metric("age_category", category.as_str(), *count)),
        );
        metrics.extend(
            self.warranty_statuses
                .iter()
                .map(|(status, count)| metric("warranty_status", status.as_str(), *count)),
        );
        for breakdown in &self.breakdowns {
            metrics.extend(
                breakdown
                    .counts
                    .iter()
                    .map(|(label, count)| metric(breakdown.metric, label.as_str(), *count)),
            );
        }
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::query::AssetQuery;
    use crate::inventory::tests::workstations;

    #[test]
    fn summary_of_whole_inventory() {
        let inventory = workstations();
        let selection = AssetQuery::default()
            .replace(["Latitude 5420", "Generic Box"])
            .apply(&inventory);
        let summary = Summary::of(&inventory, &selection);

        assert_eq!(summary.total, 5);
        assert_eq!(summary.marked, 2);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.replacement_rate, 40.0);
        assert_eq!(
            summary.categories,
            vec![
                ("Desktop", 1),
                ("Laptop Dell", 1),
                ("Laptop Acer", 1),
                ("Toughbook", 1),
                ("iPad", 0),
                ("Other", 1)
            ]
        );
        assert_eq!(
            summary.warranty_statuses,
            vec![
                (WarrantyStatus::Expired, 1),
                (WarrantyStatus::ExpiringSoon, 1),
                (WarrantyStatus::Active, 1),
                (WarrantyStatus::Unknown, 2)
            ]
        );
        assert_eq!(
            summary.age_categories,
            vec![
                (AgeCategory::New, 2),
                (AgeCategory::Active, 1),
                (AgeCategory::Aging, 1),
                (AgeCategory::Old, 1)
            ]
        );
    }

    #[test]
    fn breakdowns_sort_by_count_then_first_appearance() {
        let inventory = workstations();
        let summary = Summary::of(&inventory, &Selection::all(&inventory));
        let roles: Vec<(SemanticRole, &str)> = summary
            .breakdowns
            .iter()
            .map(|breakdown| (breakdown.role, breakdown.metric))
            .collect();
        assert_eq!(
            roles,
            vec![(SemanticRole::Location, "location"), (SemanticRole::Department, "department")]
        );
        assert_eq!(
            summary.breakdowns[0].counts,
            vec![("HQ".to_owned(), 3), ("Branch".to_owned(), 1), ("(blank)".to_owned(), 1)]
        );
        assert_eq!(
            summary.breakdowns[1].counts,
            vec![
                ("IT".to_owned(), 2),
                ("HR".to_owned(), 1),
                ("Ops".to_owned(), 1),
                ("(blank)".to_owned(), 1)
            ]
        );
    }

    #[test]
    fn empty_selection_has_zero_rate() {
        let inventory = workstations();
        let summary = Summary::of(&inventory, &Selection::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.replacement_rate, 0.0);
        assert!(summary.metrics().iter().all(|metric| metric.share == 0.0));
    }

    #[test]
    fn metrics_flatten_every_section() {
        let inventory = workstations();
        let metrics = Summary::of(&inventory, &Selection::all(&inventory)).metrics();
        assert_eq!(metrics[0], Metric { metric: "total", label: "Total Assets".to_owned(), count: 5, share: 100.0 });
        assert_eq!(metrics.iter().filter(|metric| metric.metric == "category").count(), 6);
        let hq = metrics.iter().find(|metric| metric.metric == "location" && metric.label == "HQ").unwrap();
        assert_eq!((hq.count, hq.share), (3, 60.0));
    }
}
