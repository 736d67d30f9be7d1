//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dao::models::is_accent_hex;

/// Validates that an accent color is written as `#RRGGBB`.
///
/// # Examples
///
/// ```ignore
/// validate_accent_hex("#FF9500") // Ok
/// validate_accent_hex("#ff9500") // Ok - case-insensitive
/// validate_accent_hex("FF9500")  // Err - missing '#'
/// ```
pub fn validate_accent_hex(value: &str) -> Result<(), ValidationError> {
    if !is_accent_hex(value.trim()) {
        let mut err = ValidationError::new("accent_hex_format");
        err.message = Some("Accent color must be written as #RRGGBB".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a display name has visible characters.
pub fn validate_display_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank_name");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accent_hex_valid() {
        assert!(validate_accent_hex("#FF9500").is_ok());
        assert!(validate_accent_hex("#0a84ff").is_ok());
        assert!(validate_accent_hex(" #000000 ").is_ok());
    }

    #[test]
    fn test_validate_accent_hex_invalid() {
        assert!(validate_accent_hex("FF9500").is_err()); // no hash
        assert!(validate_accent_hex("#FF950").is_err()); // too short
        assert!(validate_accent_hex("#FF95000").is_err()); // too long
        assert!(validate_accent_hex("#GG9500").is_err()); // not hex
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Alice").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name("").is_err());
    }
}
