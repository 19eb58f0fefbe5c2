//! CLI argument validators.

use crate::constants::anomaly::MAX_CONTAMINATION;

/// Parse and validate a contamination rate in `(0, 0.5]`.
pub fn parse_contamination(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(value > 0.0 && value <= MAX_CONTAMINATION) {
        return Err(format!(
            "contamination must be in (0.0, {MAX_CONTAMINATION}], got {value}"
        ));
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contamination_valid() {
        assert_eq!(parse_contamination("0.02").ok(), Some(0.02));
        assert_eq!(parse_contamination("0.5").ok(), Some(0.5));
    }

    #[test]
    fn test_parse_contamination_invalid() {
        assert!(parse_contamination("0").is_err());
        assert!(parse_contamination("0.51").is_err());
        assert!(parse_contamination("-0.1").is_err());
        assert!(parse_contamination("NaN").is_err());
        assert!(parse_contamination("abc").unwrap_err().contains("not a valid number"));
    }
}
