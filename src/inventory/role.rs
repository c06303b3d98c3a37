use crate::inventory::normalize::{contains_keyword, normalize};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;

/// Semantic fields a source column can play, in resolution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum SemanticRole {
    Model,
    Product,
    ProductType,
    SerialNumber,
    AssetTag,
    AssetName,
    User,
    EmployeeId,
    JobTitle,
    UserEmail,
    Department,
    Location,
    Site,
    Place,
    YearOfPurchase,
    WarrantyExpiry,
    State,
    Status,
    Programme,
    ServiceTag,
}

impl SemanticRole {
    pub(crate) const ALL: [SemanticRole; 20] = [
        Self::Model,
        Self::Product,
        Self::ProductType,
        Self::SerialNumber,
        Self::AssetTag,
        Self::AssetName,
        Self::User,
        Self::EmployeeId,
        Self::JobTitle,
        Self::UserEmail,
        Self::Department,
        Self::Location,
        Self::Site,
        Self::Place,
        Self::YearOfPurchase,
        Self::WarrantyExpiry,
        Self::State,
        Self::Status,
        Self::Programme,
        Self::ServiceTag,
    ];

    /// Human-readable name, as used in reports and filter expressions.
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Model => "Model",
            Self::Product => "Product",
            Self::ProductType => "Product Type",
            Self::SerialNumber => "Serial Number",
            Self::AssetTag => "Asset Tag",
            Self::AssetName => "Asset Name",
            Self::User => "User",
            Self::EmployeeId => "Employee ID",
            Self::JobTitle => "Job Title",
            Self::UserEmail => "User Email",
            Self::Department => "Department",
            Self::Location => "Location",
            Self::Site => "Site",
            Self::Place => "Place",
            Self::YearOfPurchase => "Year of Purchase",
            Self::WarrantyExpiry => "Warranty Expiry",
            Self::State => "State",
            Self::Status => "Status",
            Self::Programme => "Programme",
            Self::ServiceTag => "Service Tag",
        }
    }

    /// Name fragments matched against normalized headers.
    pub(crate) const fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Model => &["model"],
            Self::Product => &["product"],
            Self::ProductType => &["product type"],
            Self::SerialNumber => &["serial number", "serial no"],
            Self::AssetTag => &["asset tag"],
            Self::AssetName => &["asset name"],
            Self::User => &["user"],
            Self::EmployeeId => &["employee id"],
            Self::JobTitle => &["job title"],
            Self::UserEmail => &["user email", "email"],
            Self::Department => &["department"],
            Self::Location => &["location"],
            Self::Site => &["site"],
            Self::Place => &["place"],
            Self::YearOfPurchase => &["year of purchase", "purchase year"],
            Self::WarrantyExpiry => &["warranty expiry", "warranty end", "warranty"],
            Self::State => &["asset state", "state"],
            Self::Status => &["workstation status", "status"],
            Self::Programme => &["programme", "program"],
            Self::ServiceTag => &["service tag"],
        }
    }

    /// Looks a role up by name, ignoring case, spacing and punctuation.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        let name = normalize(name);
        Self::ALL.into_iter().find(|role| normalize(role.name()) == name)
    }
}

impl Display for SemanticRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the first header, left to right, whose normalized form contains any keyword.
pub(crate) fn resolve<'a>(headers: &'a [String], keywords: &[&str]) -> Option<&'a str> {
    headers
        .iter()
        .find(|header| {
            let header = normalize(header);
            keywords.iter().any(|keyword| contains_keyword(&header, keyword))
        })
        .map(String::as_str)
}

/// Role to column mapping of one table, resolved independently per role.
#[derive(Clone, Debug, Default)]
pub(crate) struct ColumnBinding {
    columns: BTreeMap<SemanticRole, (usize, String)>,
}

impl ColumnBinding {
    pub(crate) fn resolve(headers: &[String]) -> Self {
        let mut columns = BTreeMap::new();
        for role in SemanticRole::ALL {
            if let Some(header) = resolve(headers, role.keywords()) {
                if let Some(index) = headers.iter().position(|name| name == header) {
                    debug!(role = role.name(), column = header, "role resolved");
                    columns.insert(role, (index, header.to_owned()));
                }
            }
        }
        Self { columns }
    }

    /// Index of the column bound to the role.
    pub(crate) fn column(&self, role: SemanticRole) -> Option<usize> {
        self.columns.get(&role).map(|(index, _)| *index)
    }

    /// Header of the column bound to the role.
    pub(crate) fn header(&self, role: SemanticRole) -> Option<&str> {
        self.columns.get(&role).map(|(_, header)| header.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn resolves_first_matching_header() {
        let headers = headers(&["Asset Tag", "Serial No.", "Model Name", "Model"]);
        assert_eq!(resolve(&headers, &["model"]), Some("Model Name"));
        assert_eq!(resolve(&headers, &["serial number", "serial no"]), Some("Serial No."));
        assert_eq!(resolve(&headers, &["department"]), None);
        assert_eq!(resolve(&headers, &[""]), None);
    }

    #[test]
    fn resolved_header_is_member_of_headers() {
        let headers = headers(&["user_email", "USER", "Dept."]);
        for role in SemanticRole::ALL {
            if let Some(header) = resolve(&headers, role.keywords()) {
                assert!(headers.iter().any(|name| name == header));
            }
        }
    }

    #[test]
    fn one_column_may_serve_several_roles() {
        let binding = ColumnBinding::resolve(&headers(&["User Email", "Workstation Status"]));
        assert_eq!(binding.header(SemanticRole::User), Some("User Email"));
        assert_eq!(binding.header(SemanticRole::UserEmail), Some("User Email"));
        assert_eq!(binding.column(SemanticRole::Status), Some(1));
        assert!(binding.column(SemanticRole::Department).is_none());
    }

    #[test]
    fn warranty_and_purchase_columns() {
        let binding = ColumnBinding::resolve(&headers(&[
            "Purchase Year",
            "Warranty End Date",
            "Product Type",
            "Program",
        ]));
        assert_eq!(binding.column(SemanticRole::YearOfPurchase), Some(0));
        assert_eq!(binding.column(SemanticRole::WarrantyExpiry), Some(1));
        assert_eq!(binding.column(SemanticRole::Product), Some(2));
        assert_eq!(binding.column(SemanticRole::ProductType), Some(2));
        assert_eq!(binding.column(SemanticRole::Programme), Some(3));
    }

    #[test]
    fn parse_role_names() {
        assert_eq!(SemanticRole::parse("product_type"), Some(SemanticRole::ProductType));
        assert_eq!(SemanticRole::parse("Asset Tag"), Some(SemanticRole::AssetTag));
        assert_eq!(SemanticRole::parse("year of purchase"), Some(SemanticRole::YearOfPurchase));
        assert_eq!(SemanticRole::parse("colour"), None);
    }
}
