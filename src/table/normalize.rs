/// Key cells are taken verbatim apart from surrounding whitespace.
pub fn clean_cell(raw: &str) -> String {
    raw.trim().to_string()
}

/// Turn accounting-style cell text into a number.
///
/// `-` is a placeholder for zero, `(1,234.5)` is `-1234.5`, thousands
/// commas are dropped. Anything that still fails to parse becomes `0.0`.
pub fn normalize(raw: &str) -> f64 {
    let s = raw.trim();
    if s == "-" {
        return 0.0;
    }

    let signed;
    let s = match s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
        Some(inner) => {
            signed = format!("-{}", inner);
            signed.as_str()
        }
        None => s,
    };

    s.replace(',', "").parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parenthesised_thousands_are_negative() {
        assert_eq!(normalize("(1,234.5)"), -1234.5);
        assert_eq!(normalize(" (50) "), -50.0);
    }

    #[test]
    fn placeholders_and_garbage_are_zero() {
        assert_eq!(normalize("-"), 0.0);
        assert_eq!(normalize(" - "), 0.0);
        assert_eq!(normalize(""), 0.0);
        assert_eq!(normalize("abc"), 0.0);
        assert_eq!(normalize("()"), 0.0);
        assert_eq!(normalize("(abc)"), 0.0);
    }

    #[test]
    fn thousands_separators_are_dropped() {
        assert_eq!(normalize("1,000"), 1000.0);
        assert_eq!(normalize("12,345,678.25"), 12345678.25);
        assert_eq!(normalize("-3.5"), -3.5);
    }

    #[test]
    fn lone_open_paren_is_not_negated() {
        // only a full `(...)` wrap means negative
        assert_eq!(normalize("(12"), 0.0);
    }

    #[test]
    fn float_specials_parse_as_floats() {
        assert_eq!(normalize("inf"), f64::INFINITY);
        assert_eq!(normalize("-inf"), f64::NEG_INFINITY);
        assert!(normalize("NaN").is_nan());
    }

    #[test]
    fn clean_cell_trims() {
        assert_eq!(clean_cell("  11 Jan 2024\n"), "11 Jan 2024");
    }
}
