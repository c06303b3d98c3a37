use crate::inventory::normalize::{contains_keyword, normalize};
use crate::inventory::role::SemanticRole;
use std::fmt::Display;
use tracing::debug;

const WORKSTATION_KEYWORDS: [&str; 4] = ["workstation", "model", "warranty", "place"];
const MOBILE_KEYWORDS: [&str; 3] = ["product", "programme", "program"];

/// Schema profile of an inventory sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AssetType {
    Workstation,
    Mobile,
}

impl AssetType {
    pub(crate) const fn as_str(&self) -> &'static str {
        match self {
            Self::Workstation => "Workstation",
            Self::Mobile => "Mobile",
        }
    }

    /// Accepts `workstation` or `mobile` in any case.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match normalize(name).as_str() {
            "workstation" => Some(Self::Workstation),
            "mobile" => Some(Self::Mobile),
            _ => None,
        }
    }

    /// Role holding the device model for this profile.
    pub(crate) const fn model_role(&self) -> SemanticRole {
        match self {
            Self::Workstation => SemanticRole::Model,
            Self::Mobile => SemanticRole::Product,
        }
    }

    /// Roles used only by this profile, skipped silently when absent.
    pub(crate) const fn optional_roles(&self) -> &'static [SemanticRole] {
        match self {
            Self::Workstation => &[SemanticRole::Place, SemanticRole::WarrantyExpiry, SemanticRole::Status],
            Self::Mobile => &[SemanticRole::Programme, SemanticRole::ProductType],
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct AssetTypeScore {
    pub(crate) workstation: usize,
    pub(crate) mobile: usize,
}

impl AssetTypeScore {
    /// Workstation only on a strict win; ties, including no evidence at all, go to Mobile.
    pub(crate) fn asset_type(&self) -> AssetType {
        if self.workstation > self.mobile {
            AssetType::Workstation
        } else {
            AssetType::Mobile
        }
    }
}

/// Counts each profile keyword at most once if any normalized header contains it.
pub(crate) fn score(headers: &[String]) -> AssetTypeScore {
    let headers: Vec<String> = headers.iter().map(|header| normalize(header)).collect();
    let hits = |keywords: &[&str]| {
        keywords
            .iter()
            .filter(|keyword| headers.iter().any(|header| contains_keyword(header, keyword)))
            .count()
    };
    AssetTypeScore {
        workstation: hits(&WORKSTATION_KEYWORDS),
        mobile: hits(&MOBILE_KEYWORDS),
    }
}

pub(crate) fn classify(headers: &[String]) -> AssetType {
    let score = score(headers);
    let asset_type = score.asset_type();
    debug!(
        workstation = score.workstation,
        mobile = score.mobile,
        asset_type = asset_type.as_str(),
        "asset type classified"
    );
    asset_type
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn workstation_headers() {
        let headers = headers(&["Workstation Type", "Model", "Serial Number"]);
        assert_eq!(score(&headers), AssetTypeScore { workstation: 2, mobile: 0 });
        assert_eq!(classify(&headers), AssetType::Workstation);
    }

    #[test]
    fn mobile_keywords_count_once() {
        let headers = headers(&["Product", "Product Type", "Programme"]);
        // "program" is part of "programme"
        assert_eq!(score(&headers), AssetTypeScore { workstation: 0, mobile: 3 });
        assert_eq!(classify(&headers), AssetType::Mobile);
    }

    #[test]
    fn ties_pick_mobile() {
        assert_eq!(classify(&[]), AssetType::Mobile);
        assert_eq!(classify(&headers(&["Model", "Product"])), AssetType::Mobile);
    }

    #[test]
    fn profile_roles() {
        assert_eq!(AssetType::Workstation.model_role(), SemanticRole::Model);
        assert_eq!(AssetType::Mobile.model_role(), SemanticRole::Product);
        assert!(AssetType::Workstation.optional_roles().contains(&SemanticRole::WarrantyExpiry));
        assert_eq!(AssetType::parse(" MOBILE "), Some(AssetType::Mobile));
        assert_eq!(AssetType::parse("tablet"), None);
    }
}
