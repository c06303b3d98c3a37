use crate::inventory::classify::AssetType;
use crate::inventory::table::AssetTable;
use crate::spreadsheet::SpreadsheetError;
use calamine::Data;

const WORKSTATION_HEADERS: [&str; 13] = [
    "Asset Tag",
    "Workstation Type",
    "Model",
    "Serial Number",
    "Service Tag",
    "User",
    "User Email",
    "Department",
    "Location",
    "Place",
    "Year of Purchase",
    "Warranty Expiry",
    "Workstation Status",
];

const WORKSTATION_ROWS: [[&str; 13]; 5] = [
    ["WS001", "Desktop", "Dell OptiPlex 7090", "CN0F7K2", "7K2F9D3", "John Smith", "john.smith@company.com", "IT", "Head Office", "Floor 2", "2021", "2026-03-15", "In Use"],
    ["WS002", "Laptop", "Dell Latitude 5420", "CN0G8L3", "8L3G0E4", "Maria Garcia", "maria.garcia@company.com", "Finance", "Head Office", "Floor 3", "2022", "2027-06-30", "In Use"],
    ["WS003", "Laptop", "Acer TravelMate P214", "NXVPK01", "VPK01A2", "David Lee", "david.lee@company.com", "Operations", "Warehouse", "Dispatch", "2019", "2022-11-01", "In Repair"],
    ["WS004", "Rugged", "Panasonic Toughbook Rugged 55", "3KTSA04", "TSA04B5", "Sarah Johnson", "sarah.johnson@company.com", "Field Services", "Depot North", "Workshop", "2020", "2025-09-30", "In Use"],
    ["WS005", "Desktop", "Dell OptiPlex 3080", "CN0H9M4", "9M4H1F6", "", "", "IT", "Head Office", "Store Room", "2018", "2021-12-31", "Spare"],
];

const MOBILE_HEADERS: [&str; 12] = [
    "Asset Tag",
    "Product",
    "Product Type",
    "Serial Number",
    "User",
    "User Email",
    "Department",
    "Site",
    "Location",
    "Programme",
    "Year of Purchase",
    "State",
];

const MOBILE_ROWS: [[&str; 12]; 5] = [
    ["MB001", "Apple iPad Air", "Tablet", "DMPXK1Q2", "Emma Brown", "emma.brown@company.com", "Sales", "North", "Branch A", "Field Sales", "2022", "Active"],
    ["MB002", "Apple iPad 9th Gen", "Tablet", "DMPXK2R3", "Liam Wilson", "liam.wilson@company.com", "Sales", "South", "Branch B", "Field Sales", "2021", "Active"],
    ["MB003", "Samsung Galaxy Tab Active3 Rugged", "Rugged Tablet", "R52R30ABC", "Olivia Taylor", "olivia.taylor@company.com", "Logistics", "North", "Warehouse", "Delivery", "2020", "Active"],
    ["MB004", "Apple iPhone 13", "Phone", "F2LXK3S4", "Noah Davis", "noah.davis@company.com", "Management", "Central", "Head Office", "Executive", "2023", "Active"],
    ["MB005", "Zebra TC52", "Handheld", "21034520", "", "", "Logistics", "South", "Warehouse", "Delivery", "2019", "In Stock"],
];

/// Typed cell value for a template entry: years become numbers, blanks become empty cells.
fn value(header: &str, text: &str) -> Data {
    match text {
        "" => Data::Empty,
        _ if header == "Year of Purchase" => text.parse().map(Data::Int).unwrap_or_else(|_| Data::String(text.to_owned())),
        _ => Data::String(text.to_owned()),
    }
}

fn table<const N: usize>(name: &str, headers: &[&str; N], rows: &[[&str; N]]) -> Result<AssetTable, SpreadsheetError> {
    let rows = rows
        .iter()
        .map(|row| headers.iter().zip(row.iter()).map(|(header, text)| value(header, text)).collect())
        .collect();
    AssetTable::from_values(name, headers, rows)
}

/// The example dataset showing the expected columns of a profile.
pub(crate) fn template(asset_type: AssetType) -> Result<AssetTable, SpreadsheetError> {
    match asset_type {
        AssetType::Workstation => table("Workstation Template", &WORKSTATION_HEADERS, &WORKSTATION_ROWS),
        AssetType::Mobile => table("Mobile Template", &MOBILE_HEADERS, &MOBILE_ROWS),
    }
}
