/// Normalizes Thai phone numbers to international form.
///
/// Local `0XXXXXXXXX` numbers become `+66XXXXXXXXX`, bare-country-code
/// `66XXXXXXXXX` gains a `+`, anything already starting with `+` (or not
/// matching either shape) is returned as typed.
pub fn normalize_phone(input: &str) -> String {
    let raw = input.trim();
    if raw.is_empty() || raw.starts_with('+') {
        return raw.to_string();
    }
    if raw.len() == 10 && raw.starts_with('0') && raw.chars().all(|c| c.is_ascii_digit()) {
        return format!("+66{}", &raw[1..]);
    }
    if raw.len() == 11 && raw.starts_with("66") && raw.chars().all(|c| c.is_ascii_digit()) {
        return format!("+{}", raw);
    }
    raw.to_string()
}

/// Local registration format: exactly ten digits starting with 0.
pub fn is_local_phone(input: &str) -> bool {
    input.len() == 10 && input.starts_with('0') && input.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_number_gets_country_code() {
        assert_eq!(normalize_phone("0812345678"), "+66812345678");
    }

    #[test]
    fn bare_country_code_gains_plus() {
        assert_eq!(normalize_phone("66812345678"), "+66812345678");
    }

    #[test]
    fn international_form_is_untouched() {
        assert_eq!(normalize_phone("+66812345678"), "+66812345678");
        assert_eq!(normalize_phone("+14155550100"), "+14155550100");
    }

    #[test]
    fn unrecognized_shapes_pass_through() {
        assert_eq!(normalize_phone("12345"), "12345");
        assert_eq!(normalize_phone(" 0812345678 "), "+66812345678");
        assert_eq!(normalize_phone(""), "");
    }

    #[test]
    fn local_phone_check() {
        assert!(is_local_phone("0812345678"));
        assert!(!is_local_phone("812345678"));
        assert!(!is_local_phone("08123456789"));
        assert!(!is_local_phone("08123456a8"));
    }
}
