use crate::inventory::classify::AssetType;
use crate::inventory::role::{ColumnBinding, SemanticRole};
use crate::inventory::table::AssetTable;
use crate::spreadsheet::cell::Cell;
use chrono::{Datelike, NaiveDate};
use std::fmt::Display;
use tracing::debug;

/// Category fallback when no keyword matches.
pub(crate) const OTHER_CATEGORY: &str = "Other";

/// Category label and model fragments, in match order. A later match overrides an earlier one.
pub(crate) const CATEGORY_KEYWORDS: [(&str, &[&str]); 5] = [
    ("Desktop", &["optiplex"]),
    ("Laptop Dell", &["latitude"]),
    ("Laptop Acer", &["travelmate"]),
    ("Toughbook", &["rugged"]),
    ("iPad", &["ipad"]),
];

/// Days ahead within which a warranty counts as expiring soon.
pub(crate) const EXPIRING_SOON_DAYS: i64 = 90;

/// Every category label, fallback last.
pub(crate) fn category_labels() -> impl Iterator<Item = &'static str> {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(label, _)| *label)
        .chain(std::iter::once(OTHER_CATEGORY))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AgeCategory {
    New,
    Active,
    Aging,
    Old,
}

impl AgeCategory {
    pub(crate) const ALL: [AgeCategory; 4] = [Self::New, Self::Active, Self::Aging, Self::Old];

    pub(crate) fn of(age: i64) -> Self {
        match age {
            age if age <= 1 => Self::New,
            age if age <= 3 => Self::Active,
            age if age <= 5 => Self::Aging,
            _ => Self::Old,
        }
    }

    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Active => "Active",
            Self::Aging => "Aging",
            Self::Old => "Old",
        }
    }
}

impl Display for AgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum WarrantyStatus {
    Expired,
    ExpiringSoon,
    Active,
    Unknown,
}

impl WarrantyStatus {
    pub(crate) const ALL: [WarrantyStatus; 4] = [Self::Expired, Self::ExpiringSoon, Self::Active, Self::Unknown];

    /// Classifies the days left until expiry; `None` means no usable date.
    pub(crate) fn of(days_to_expiry: Option<i64>) -> Self {
        match days_to_expiry {
            None => Self::Unknown,
            Some(days) if days < 0 => Self::Expired,
            Some(days) if days <= EXPIRING_SOON_DAYS => Self::ExpiringSoon,
            Some(_) => Self::Active,
        }
    }

    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::ExpiringSoon => "Expiring Soon",
            Self::Active => "Active",
            Self::Unknown => "Unknown",
        }
    }
}

impl Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed columns of one record.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Derived {
    pub(crate) category: &'static str,
    pub(crate) asset_age: i64,
    pub(crate) age_category: AgeCategory,
    pub(crate) warranty_status: WarrantyStatus,
    pub(crate) days_to_expiry: Option<i64>,
}

/// Category of a model text; the last matching category in `CATEGORY_KEYWORDS` wins.
pub(crate) fn categorize(model: &str) -> &'static str {
    let model = model.to_lowercase();
    let mut category = OTHER_CATEGORY;
    for (label, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| model.contains(keyword)) {
            category = label;
        }
    }
    category
}

/// Years since purchase; 0 when the purchase year is missing or unreadable.
pub(crate) fn asset_age(purchase: Option<&Cell>, today: NaiveDate) -> i64 {
    purchase
        .and_then(Cell::parse_year)
        .map(|year| i64::from(today.year()) - i64::from(year))
        .unwrap_or(0)
}

/// Whole days from `today` until the warranty date, negative once past.
pub(crate) fn days_to_expiry(warranty: Option<&Cell>, today: NaiveDate) -> Option<i64> {
    let warranty = warranty.filter(|cell| !cell.is_blank())?;
    let Some(date) = warranty.parse_date() else {
        debug!(cell = %warranty.position(), value = %warranty, "warranty date not recognized");
        return None;
    };
    Some((date - today).num_days())
}

/// Computes the derived columns of every record in table order.
pub(crate) fn derive(
    table: &AssetTable,
    binding: &ColumnBinding,
    asset_type: AssetType,
    today: NaiveDate,
) -> Vec<Derived> {
    let model = binding.column(asset_type.model_role());
    let purchase = binding.column(SemanticRole::YearOfPurchase);
    let warranty = binding.column(SemanticRole::WarrantyExpiry);

    table
        .records
        .iter()
        .map(|record| {
            let category = model
                .map(|column| categorize(&record.text(column)))
                .unwrap_or(OTHER_CATEGORY);
            let asset_age = asset_age(purchase.and_then(|column| record.cell(column)), today);
            let days_to_expiry = days_to_expiry(warranty.and_then(|column| record.cell(column)), today);
            Derived {
                category,
                asset_age,
                age_category: AgeCategory::of(asset_age),
                warranty_status: WarrantyStatus::of(days_to_expiry),
                days_to_expiry,
            }
        })
        .collect()
}
