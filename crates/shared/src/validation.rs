//! Common validation utilities.

use validator::ValidationError;

/// Maximum display name length.
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

/// Symbols allowed as the final character of a family join code.
pub const JOIN_CODE_SYMBOLS: &str = "#@$%&*";

/// Validates a display name: non-empty after trimming, bounded length.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_DISPLAY_NAME_LEN {
        let mut err = ValidationError::new("display_name");
        err.message = Some("Display name must be 1-50 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates the family join code format: `XXX-0000-YY` followed by one
/// symbol from [`JOIN_CODE_SYMBOLS`] (e.g. `ABC-1234-DE#`).
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    let fail = || {
        let mut err = ValidationError::new("join_code");
        err.message = Some("Invalid family code format".into());
        err
    };

    let bytes = code.as_bytes();
    if bytes.len() != 12 || bytes[3] != b'-' || bytes[8] != b'-' {
        return Err(fail());
    }

    let letters_ok = |range: std::ops::Range<usize>| {
        bytes[range].iter().all(|b| b.is_ascii_uppercase())
    };
    let digits_ok = bytes[4..8].iter().all(|b| b.is_ascii_digit());
    let symbol_ok = JOIN_CODE_SYMBOLS.as_bytes().contains(&bytes[11]);

    if letters_ok(0..3) && digits_ok && letters_ok(9..11) && symbol_ok {
        Ok(())
    } else {
        Err(fail())
    }
}

/// Validates a calendar color tag: `#RGB` or `#RRGGBB` hex notation.
pub fn validate_color_tag(color: &str) -> Result<(), ValidationError> {
    let valid = color.starts_with('#')
        && matches!(color.len(), 4 | 7)
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("color_tag");
        err.message = Some("Color must be #RGB or #RRGGBB hex notation".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_rules() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn join_code_accepts_valid_format() {
        assert!(validate_join_code("ABC-1234-DE#").is_ok());
        assert!(validate_join_code("ZZZ-0000-ZZ*").is_ok());
    }

    #[test]
    fn join_code_rejects_malformed() {
        assert!(validate_join_code("abc-1234-DE#").is_err()); // lowercase
        assert!(validate_join_code("ABC-12X4-DE#").is_err()); // letter in digits
        assert!(validate_join_code("ABC-1234-DEX").is_err()); // missing symbol
        assert!(validate_join_code("ABC-1234-DE").is_err()); // too short
        assert!(validate_join_code("ABCD-123-DE#").is_err()); // wrong dashes
    }

    #[test]
    fn color_tag_rules() {
        assert!(validate_color_tag("#fff").is_ok());
        assert!(validate_color_tag("#3B82F6").is_ok());
        assert!(validate_color_tag("3B82F6").is_err());
        assert!(validate_color_tag("#12345").is_err());
        assert!(validate_color_tag("#gggggg").is_err());
    }
}
