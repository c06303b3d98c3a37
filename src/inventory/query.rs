use crate::inventory::derive::WarrantyStatus;
use crate::inventory::normalize::normalize;
use crate::inventory::role::SemanticRole;
use crate::inventory::{Inventory, InventoryError};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt::Display;
use tracing::warn;

/// Column a filter applies to: a source role or one of the derived labels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dimension {
    Role(SemanticRole),
    Category,
    WarrantyStatus,
}

impl Dimension {
    /// Matches `category`, `warranty status` or any role name, ignoring case and punctuation.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "category" => Some(Self::Category),
            "warrantystatus" => Some(Self::WarrantyStatus),
            _ => SemanticRole::parse(name).map(Self::Role),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Role(role) => role.name(),
            Self::Category => "Category",
            Self::WarrantyStatus => "Warranty Status",
        }
    }

    /// Value of the dimension for one record, `None` when its column is unresolved.
    fn value(&self, inventory: &Inventory, record: usize) -> Option<String> {
        match self {
            Self::Role(role) => inventory.text(record, *role),
            Self::Category => Some(inventory.derived[record].category.to_owned()),
            Self::WarrantyStatus => Some(inventory.derived[record].warranty_status.as_str().to_owned()),
        }
    }

    fn is_available(&self, inventory: &Inventory) -> bool {
        match self {
            Self::Role(role) => inventory.column(*role).is_some(),
            _ => true,
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits `a|b|c` into trimmed, non-empty values.
pub(crate) fn parse_values(text: &str) -> BTreeSet<String> {
    text.split('|')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Equality filters, free-text search and the replacement selection.
#[derive(Clone, Debug, Default)]
pub(crate) struct AssetQuery {
    pub(crate) filters: Vec<(Dimension, BTreeSet<String>)>,
    pub(crate) search: Option<String>,
    pub(crate) replacement: BTreeSet<String>,
}

impl AssetQuery {
    /// Parses `"department=IT|HR; category=Desktop"`. Repeated dimensions accumulate values.
    pub(crate) fn parse_filters(text: &str) -> Result<Vec<(Dimension, BTreeSet<String>)>, InventoryError> {
        let pattern = Regex::new(r"^\s*([^=]+?)\s*=(.*)$").expect("Hardcode filter pattern");
        let mut filters: Vec<(Dimension, BTreeSet<String>)> = Vec::new();
        for clause in text.split(';').filter(|clause| !clause.trim().is_empty()) {
            let captures = pattern.captures(clause).ok_or_else(|| InventoryError::InvalidFilter {
                expression: clause.trim().to_owned(),
                message: String::from("expected 'dimension=value|value'"),
            })?;
            let name = &captures[1];
            let dimension = Dimension::parse(name).ok_or_else(|| InventoryError::InvalidFilter {
                expression: clause.trim().to_owned(),
                message: format!("unknown dimension '{name}'"),
            })?;
            let values = parse_values(&captures[2]);
            match filters.iter_mut().find(|(existing, _)| *existing == dimension) {
                Some((_, existing)) => existing.extend(values),
                None => filters.push((dimension, values)),
            }
        }
        Ok(filters)
    }

    pub(crate) fn filter<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .push((dimension, values.into_iter().map(Into::into).collect()));
        self
    }

    pub(crate) fn search(mut self, text: &str) -> Self {
        self.search = Some(text.to_owned());
        self
    }

    pub(crate) fn replace<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replacement = models.into_iter().map(Into::into).collect();
        self
    }

    fn matches_search(&self, inventory: &Inventory, record: usize, needle: &str) -> bool {
        let derived = &inventory.derived[record];
        inventory.table.records[record]
            .cells
            .iter()
            .map(|cell| cell.text())
            .chain([
                derived.category.to_owned(),
                derived.age_category.as_str().to_owned(),
                derived.warranty_status.as_str().to_owned(),
            ])
            .any(|text| text.to_lowercase().contains(needle))
    }

    /// Selects records passing every filter and the search, then marks those to replace.
    pub(crate) fn apply(&self, inventory: &Inventory) -> Selection {
        let unrestricted = self.filters.is_empty() && self.search.as_deref().unwrap_or_default().is_empty();
        if unrestricted && self.replacement.is_empty() {
            return Selection::all(inventory);
        }
        let filters: Vec<&(Dimension, BTreeSet<String>)> = self
            .filters
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .filter(|(dimension, _)| {
                let available = dimension.is_available(inventory);
                if !available {
                    warn!(dimension = dimension.name(), "filter ignored, column not found");
                }
                available
            })
            .collect();
        let needle = self
            .search
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(str::to_lowercase);

        let rows: Vec<usize> = (0..inventory.len())
            .filter(|record| {
                filters.iter().all(|(dimension, values)| {
                    dimension
                        .value(inventory, *record)
                        .map(|value| values.contains(&value))
                        .unwrap_or(true)
                })
            })
            .filter(|record| {
                needle
                    .as_deref()
                    .map(|needle| self.matches_search(inventory, *record, needle))
                    .unwrap_or(true)
            })
            .collect();
        let marked = rows
            .iter()
            .copied()
            .filter(|record| self.replacement.contains(&inventory.model(*record)))
            .collect();
        Selection { rows, marked }
    }
}

/// Records kept by a query, as indexes into the inventory.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Selection {
    pub(crate) rows: Vec<usize>,
    /// Subset of `rows` marked for replacement
    pub(crate) marked: Vec<usize>,
}

impl Selection {
    /// Every record, nothing marked.
    pub(crate) fn all(inventory: &Inventory) -> Self {
        Self {
            rows: (0..inventory.len()).collect(),
            marked: Vec::new(),
        }
    }

    pub(crate) fn is_marked(&self, record: usize) -> bool {
        self.marked.contains(&record)
    }

    /// Selected records whose warranty has expired.
    pub(crate) fn expired(&self, inventory: &Inventory) -> Vec<usize> {
        self.rows
            .iter()
            .copied()
            .filter(|record| inventory.derived[*record].warranty_status == WarrantyStatus::Expired)
            .collect()
    }
}

/// Row sets offered for export and scanning.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ExportView {
    Filtered,
    Replacement,
    Expired,
}

impl ExportView {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "filtered" => Some(Self::Filtered),
            "replacement" => Some(Self::Replacement),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Filtered => "filtered",
            Self::Replacement => "replacement",
            Self::Expired => "expired",
        }
    }

    /// Worksheet name used when exporting the view.
    pub(crate) const fn sheet_name(&self) -> &'static str {
        match self {
            Self::Filtered => "Filtered Assets",
            Self::Replacement => "Replacement",
            Self::Expired => "Expired Warranty",
        }
    }

    pub(crate) fn rows(&self, selection: &Selection, inventory: &Inventory) -> Vec<usize> {
        match self {
            Self::Filtered => selection.rows.clone(),
            Self::Replacement => selection.marked.clone(),
            Self::Expired => selection.expired(inventory),
        }
    }
}
