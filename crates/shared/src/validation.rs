//! Common validation utilities.

use validator::ValidationError;

/// Lowest rating a client can give.
pub const MIN_NOTE: i32 = 1;

/// Highest rating a client can give.
pub const MAX_NOTE: i32 = 5;

/// Returns true if the value is missing or only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// Rejects strings that are empty once trimmed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Ce champ ne peut pas être vide".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a rating is an integer between 1 and 5.
pub fn validate_note(note: i32) -> Result<(), ValidationError> {
    if (MIN_NOTE..=MAX_NOTE).contains(&note) {
        Ok(())
    } else {
        let mut err = ValidationError::new("note_range");
        err.message = Some("La note doit être comprise entre 1 et 5".into());
        Err(err)
    }
}

/// Validates that a price is not negative.
pub fn validate_non_negative_price(price: &rust_decimal::Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Le prix ne peut pas être négatif".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("   \t")));
        assert!(!is_blank(Some("motif")));
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("ok").is_ok());
        assert!(validate_not_blank("  ").is_err());
    }

    #[test]
    fn test_validate_note_bounds() {
        assert!(validate_note(1).is_ok());
        assert!(validate_note(5).is_ok());
        assert!(validate_note(0).is_err());
        assert!(validate_note(6).is_err());
        assert!(validate_note(-1).is_err());
    }

    #[test]
    fn test_validate_note_message() {
        let err = validate_note(9).unwrap_err();
        assert_eq!(err.code, "note_range");
        assert!(err.message.unwrap().contains("entre 1 et 5"));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_non_negative_price(&Decimal::from(3000)).is_ok());
        assert!(validate_non_negative_price(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative_price(&Decimal::from(-1)).is_err());
    }
}
