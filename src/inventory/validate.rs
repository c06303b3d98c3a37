use crate::inventory::classify::AssetType;
use crate::inventory::derive::WarrantyStatus;
use crate::inventory::role::SemanticRole;
use crate::inventory::Inventory;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Display;
use tracing::debug;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum IssueKind {
    DuplicateAssetTags,
    DuplicateSerialNumbers,
    DuplicateServiceTags,
    MissingUser,
    InvalidEmail,
    MissingDepartment,
    MissingLocation,
    MissingModel,
    ExpiredWarranty,
}

impl IssueKind {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::DuplicateAssetTags => "Duplicate Asset Tags",
            Self::DuplicateSerialNumbers => "Duplicate Serial Numbers",
            Self::DuplicateServiceTags => "Duplicate Service Tags",
            Self::MissingUser => "Missing User",
            Self::InvalidEmail => "Invalid Email",
            Self::MissingDepartment => "Missing Department",
            Self::MissingLocation => "Missing Location",
            Self::MissingModel => "Missing Model",
            Self::ExpiredWarranty => "Expired Warranty",
        }
    }

    pub(crate) const fn severity(&self) -> Severity {
        match self {
            Self::DuplicateAssetTags | Self::DuplicateSerialNumbers | Self::DuplicateServiceTags | Self::MissingModel => {
                Severity::High
            }
            Self::MissingUser | Self::MissingDepartment | Self::MissingLocation | Self::ExpiredWarranty => Severity::Medium,
            Self::InvalidEmail => Severity::Low,
        }
    }
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One triggered data-quality check.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ValidationIssue {
    pub(crate) kind: IssueKind,
    /// Distinct duplicated values for duplicate checks, affected rows otherwise
    pub(crate) count: usize,
    pub(crate) summary: String,
    /// Affected record indexes, in table order
    pub(crate) rows: Vec<usize>,
    /// Identifying columns shown for the affected rows
    pub(crate) columns: Vec<usize>,
}

impl ValidationIssue {
    pub(crate) fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// `Header: value` pairs of the identifying columns of one affected record.
    pub(crate) fn details(&self, inventory: &Inventory, record: usize) -> String {
        let record = &inventory.table.records[record];
        self.columns
            .iter()
            .map(|column| format!("{}: {}", inventory.table.headers[*column], record.text(*column)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

struct Validator<'a> {
    inventory: &'a Inventory,
    issues: Vec<ValidationIssue>,
}

impl<'a> Validator<'a> {
    /// Asset Tag, Serial Number, model field and User when resolved, then the checked column.
    fn identifying_columns(&self, checked: usize) -> Vec<usize> {
        let mut columns: Vec<usize> = [SemanticRole::AssetTag, SemanticRole::SerialNumber]
            .into_iter()
            .filter_map(|role| self.inventory.column(role))
            .chain(std::iter::once(self.inventory.model_column()))
            .chain(self.inventory.column(SemanticRole::User))
            .collect();
        columns.push(checked);
        let mut unique = Vec::with_capacity(columns.len());
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        unique
    }

    fn push(&mut self, kind: IssueKind, column: usize, count: usize, summary: String, rows: Vec<usize>) {
        if rows.is_empty() {
            return;
        }
        debug!(kind = kind.label(), count, rows = rows.len(), "validation issue");
        let columns = self.identifying_columns(column);
        self.issues.push(ValidationIssue {
            kind,
            count,
            summary,
            rows,
            columns,
        });
    }

    fn duplicates(&mut self, kind: IssueKind, column: Option<usize>, noun: (&str, &str)) {
        let Some(column) = column else {
            return;
        };
        let records = &self.inventory.table.records;
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let value = record.text(column);
            if value.is_empty() {
                continue;
            }
            let group = groups.entry(value.clone()).or_default();
            if group.is_empty() {
                order.push(value);
            }
            group.push(index);
        }

        let duplicated: Vec<&String> = order.iter().filter(|value| groups[*value].len() > 1).collect();
        let mut rows: Vec<usize> = duplicated.iter().flat_map(|value| groups[*value].iter().copied()).collect();
        rows.sort_unstable();
        let summary = format!(
            "{} used by more than one row: {}",
            plural(duplicated.len(), noun.0, noun.1),
            duplicated.iter().map(|value| value.as_str()).collect::<Vec<_>>().join(", ")
        );
        self.push(kind, column, duplicated.len(), summary, rows);
    }

    fn missing(&mut self, kind: IssueKind, column: Option<usize>, field: &str) {
        let Some(column) = column else {
            return;
        };
        let rows: Vec<usize> = self
            .inventory
            .table
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.text(column).is_empty())
            .map(|(index, _)| index)
            .collect();
        let summary = format!("{} without {field}", plural(rows.len(), "row", "rows"));
        self.push(kind, column, rows.len(), summary, rows);
    }

    fn invalid_emails(&mut self, column: Option<usize>) {
        let Some(column) = column else {
            return;
        };
        let pattern = Regex::new(EMAIL_PATTERN).expect("Hardcode email pattern");
        let rows: Vec<usize> = self
            .inventory
            .table
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                let email = record.text(column);
                !email.is_empty() && !pattern.is_match(&email)
            })
            .map(|(index, _)| index)
            .collect();
        let summary = format!("{} with a malformed email address", plural(rows.len(), "row", "rows"));
        self.push(IssueKind::InvalidEmail, column, rows.len(), summary, rows);
    }

    fn expired_warranties(&mut self, column: Option<usize>) {
        let Some(column) = column else {
            return;
        };
        let rows: Vec<usize> = self
            .inventory
            .derived
            .iter()
            .enumerate()
            .filter(|(_, derived)| derived.warranty_status == WarrantyStatus::Expired)
            .map(|(index, _)| index)
            .collect();
        let summary = format!(
            "{} with a warranty that ended before {}",
            plural(rows.len(), "row", "rows"),
            self.inventory.as_of
        );
        self.push(IssueKind::ExpiredWarranty, column, rows.len(), summary, rows);
    }
}

/// Runs every applicable check. Checks whose column is unresolved are skipped.
pub(crate) fn validate(inventory: &Inventory) -> Vec<ValidationIssue> {
    let workstation = inventory.asset_type == AssetType::Workstation;
    let mut validator = Validator {
        inventory,
        issues: Vec::new(),
    };

    validator.duplicates(
        IssueKind::DuplicateAssetTags,
        inventory.column(SemanticRole::AssetTag),
        ("asset tag", "asset tags"),
    );
    validator.duplicates(
        IssueKind::DuplicateSerialNumbers,
        inventory.column(SemanticRole::SerialNumber),
        ("serial number", "serial numbers"),
    );
    if workstation {
        validator.duplicates(
            IssueKind::DuplicateServiceTags,
            inventory.column(SemanticRole::ServiceTag),
            ("service tag", "service tags"),
        );
    }
    validator.missing(IssueKind::MissingUser, inventory.column(SemanticRole::User), "a user");
    validator.invalid_emails(inventory.column(SemanticRole::UserEmail));
    validator.missing(IssueKind::MissingDepartment, inventory.column(SemanticRole::Department), "a department");
    validator.missing(IssueKind::MissingLocation, inventory.column(SemanticRole::Location), "a location");
    validator.missing(IssueKind::MissingModel, Some(inventory.model_column()), "a model");
    if workstation {
        validator.expired_warranties(inventory.column(SemanticRole::WarrantyExpiry));
    }

    validator.issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::table::AssetTable;
    use crate::inventory::tests::{as_of, text, workstations};
    use calamine::Data;

    fn issue(issues: &[ValidationIssue], kind: IssueKind) -> Option<&ValidationIssue> {
        issues.iter().find(|issue| issue.kind == kind)
    }

    #[test]
    fn duplicate_tags_count_distinct_values() {
        let table = AssetTable::from_values(
            "tags.xlsx",
            &["Asset Tag", "Model"],
            vec![
                vec![text("WS001"), text("OptiPlex")],
                vec![text(" WS001 "), text("OptiPlex")],
                vec![text("WS002"), text("OptiPlex")],
            ],
        )
        .unwrap();
        let inventory = Inventory::build(table, as_of()).unwrap();
        let issues = validate(&inventory);
        let duplicates = issue(&issues, IssueKind::DuplicateAssetTags).unwrap();
        assert_eq!(duplicates.count, 1);
        assert_eq!(duplicates.severity(), Severity::High);
        assert_eq!(duplicates.rows, vec![0, 1]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn email_pattern() {
        let pattern = Regex::new(EMAIL_PATTERN).unwrap();
        assert!(pattern.is_match("john.doe@company.com"));
        assert!(pattern.is_match("a+b@mail.co.uk"));
        assert!(!pattern.is_match("john@x"));
        assert!(!pattern.is_match("john doe@company.com"));
        assert!(!pattern.is_match("@company.com"));
    }

    #[test]
    fn workstation_battery() {
        let inventory = workstations();
        let issues = validate(&inventory);
        let kinds: Vec<IssueKind> = issues.iter().map(|issue| issue.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::DuplicateAssetTags,
                IssueKind::MissingUser,
                IssueKind::InvalidEmail,
                IssueKind::MissingDepartment,
                IssueKind::MissingLocation,
                IssueKind::ExpiredWarranty,
            ]
        );

        let user = issue(&issues, IssueKind::MissingUser).unwrap();
        assert_eq!((user.count, user.rows.clone()), (1, vec![2]));
        assert_eq!(user.details(&inventory, 2), "Asset Tag: WS002, Serial Number: SN003, Model: TravelMate P2, User: ");

        let email = issue(&issues, IssueKind::InvalidEmail).unwrap();
        assert_eq!(email.rows, vec![1]);
        assert_eq!(email.severity(), Severity::Low);
        assert_eq!(email.columns, vec![0, 2, 1, 3, 4]);

        let expired = issue(&issues, IssueKind::ExpiredWarranty).unwrap();
        assert_eq!(expired.rows, vec![0]);
        assert_eq!(expired.severity(), Severity::Medium);
    }

    #[test]
    fn duplicate_serials_and_service_tags() {
        let table = AssetTable::from_values(
            "serials.xlsx",
            &["Asset Tag", "Model", "Serial Number", "Service Tag", "User"],
            vec![
                vec![text("WS1"), text("OptiPlex"), text("SN1"), text("ST1"), text("Ana")],
                vec![text("WS2"), text("OptiPlex"), text("SN1"), text("ST2"), text("Ben")],
                vec![text("WS3"), text("Latitude"), text("SN2"), text("ST1"), text("Cy")],
                vec![text("WS4"), text("Latitude"), text("SN2"), text("ST3"), text("Di")],
                vec![text("WS5"), text("Latitude"), text("SN3"), text("ST3"), text("Ed")],
            ],
        )
        .unwrap();
        let inventory = Inventory::build(table, as_of()).unwrap();
        assert_eq!(inventory.asset_type, AssetType::Workstation);
        let issues = validate(&inventory);
        let kinds: Vec<IssueKind> = issues.iter().map(|issue| issue.kind).collect();
        assert_eq!(kinds, vec![IssueKind::DuplicateSerialNumbers, IssueKind::DuplicateServiceTags]);

        let serials = issue(&issues, IssueKind::DuplicateSerialNumbers).unwrap();
        assert_eq!(serials.count, 2);
        assert_eq!(serials.severity(), Severity::High);
        assert_eq!(serials.rows, vec![0, 1, 2, 3]);
        assert_eq!(serials.summary, "2 serial numbers used by more than one row: SN1, SN2");

        let service_tags = issue(&issues, IssueKind::DuplicateServiceTags).unwrap();
        assert_eq!(service_tags.count, 2);
        assert_eq!(service_tags.severity(), Severity::High);
        assert_eq!(service_tags.rows, vec![0, 2, 3, 4]);
        assert_eq!(service_tags.columns, vec![0, 2, 1, 4, 3]);
        assert_eq!(
            service_tags.details(&inventory, 2),
            "Asset Tag: WS3, Serial Number: SN2, Model: Latitude, User: Cy, Service Tag: ST1"
        );
    }

    #[test]
    fn mobile_skips_workstation_checks() {
        let table = AssetTable::from_values(
            "phones.xlsx",
            &["Product", "Programme", "Service Tag", "Warranty"],
            vec![
                vec![text("iPad Air"), text("Field"), text("ST1"), text("2020-01-01")],
                vec![Data::Empty, text("Field"), text("ST1"), text("2020-01-01")],
            ],
        )
        .unwrap();
        let inventory = Inventory::build(table, as_of()).unwrap();
        assert_eq!(inventory.asset_type, AssetType::Mobile);
        let issues = validate(&inventory);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingModel);
        assert_eq!(issues[0].rows, vec![1]);
    }
}
