/// Canonical form used for header and keyword matching: lowercase ASCII letters and digits only.
///
/// `"Serial No."`, `"serial_no"` and `"SERIAL NO"` all normalize to `"serialno"`.
pub(crate) fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// True when the normalized keyword is non-empty and occurs in the already normalized text.
pub(crate) fn contains_keyword(normalized: &str, keyword: &str) -> bool {
    let keyword = normalize(keyword);
    !keyword.is_empty() && normalized.contains(keyword.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_everything_but_alphanumerics() {
        assert_eq!(normalize("Serial No."), "serialno");
        assert_eq!(normalize("  User_Email "), "useremail");
        assert_eq!(normalize("Year of Purchase (YYYY)"), "yearofpurchaseyyyy");
        assert_eq!(normalize("Département"), "dpartement");
        assert_eq!(normalize("--"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for text in ["Asset Tag #", "ÜBER model", "2020.0", ""] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn keyword_containment() {
        assert!(contains_keyword("workstationstatus", "status"));
        assert!(contains_keyword("serialno", "Serial No"));
        assert!(!contains_keyword("serialno", ""));
        assert!(!contains_keyword("model", "product"));
    }
}
