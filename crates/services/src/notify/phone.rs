use tracing::warn;

/// Canonicalize a raw phone string into an E.164-like `+`-prefixed form.
///
/// `default_cc` is the bare country-code digits (no `+`) assumed for plain
/// 10-digit numbers. Malformed input never errors; a failed provider send is
/// the real validation signal.
pub fn normalize(raw: &str, default_cc: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 10 {
        return format!("+{default_cc}{digits}");
    }

    if digits.starts_with(default_cc) && digits.len() == default_cc.len() + 10 {
        return format!("+{digits}");
    }

    if digits.len() > 10 {
        return format!("+{digits}");
    }

    // Ambiguous or short; keep best effort and leave rejection to dispatch
    warn!(raw, "Unusual phone number format");
    format!("+{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digits_get_default_country_code() {
        assert_eq!(normalize("9876543210", "91"), "+919876543210");
        assert_eq!(normalize("987-654-3210", "91"), "+919876543210");
        assert_eq!(normalize("(987) 654 3210", "91"), "+919876543210");
    }

    #[test]
    fn bare_country_code_gets_plus() {
        assert_eq!(normalize("919876543210", "91"), "+919876543210");
    }

    #[test]
    fn already_prefixed_number_is_reduced_to_digits() {
        assert_eq!(normalize("+919876543210", "91"), "+919876543210");
    }

    #[test]
    fn long_number_with_unknown_country_code_keeps_digits() {
        assert_eq!(normalize("4479460123456", "91"), "+4479460123456");
    }

    #[test]
    fn short_number_falls_back_to_plus_prefix() {
        assert_eq!(normalize("12345", "91"), "+12345");
    }

    #[test]
    fn always_starts_with_plus() {
        for raw in ["", "abc", "555 0199", "+1 (212) 555-0100"] {
            assert!(normalize(raw, "91").starts_with('+'));
        }
    }

    #[test]
    fn respects_configured_country_code() {
        assert_eq!(normalize("2125550100", "1"), "+12125550100");
        assert_eq!(normalize("12125550100", "1"), "+12125550100");
    }
}
