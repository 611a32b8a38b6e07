//! Validation utilities for the Retail POS Platform
//!
//! Includes Thailand-specific validations for compliance with local
//! business registration rules.

use rust_decimal::Decimal;

// ============================================================================
// Quantity and Money Validations
// ============================================================================

/// Validate a quantity that must be strictly positive
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a quantity that may be zero but not negative (e.g. wastage)
pub fn validate_non_negative_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Validate a unit price that must be strictly positive
pub fn validate_positive_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    Ok(())
}

/// Validate a monetary amount that may be zero but not negative
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate business code format (3-10 uppercase alphanumeric)
pub fn validate_business_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Business code must be at least 3 characters");
    }
    if code.len() > 10 {
        return Err("Business code must be at most 10 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Business code must be uppercase alphanumeric only");
    }
    Ok(())
}

// ============================================================================
// Thailand-Specific Validations
// ============================================================================

/// Validate Thai phone number format
/// Accepts: 0812345678, 081-234-5678, +66812345678
pub fn validate_thai_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Thai mobile: 10 digits starting with 0 (e.g., 0812345678)
    if digits.len() == 10 && digits.starts_with('0') {
        return Ok(());
    }
    // International format without leading 0: 9 digits (e.g., 812345678)
    if digits.len() == 9 && !digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code: 11 digits starting with 66
    if digits.len() == 11 && digits.starts_with("66") {
        return Ok(());
    }

    Err("Invalid Thai phone number format")
}

/// Validate Thai Tax ID (เลขประจำตัวผู้เสียภาษี)
/// 13-digit number for businesses/individuals
pub fn validate_thai_tax_id(tax_id: &str) -> Result<(), &'static str> {
    let digits: String = tax_id.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 13 {
        return Err("Thai Tax ID must be 13 digits");
    }

    // First digit indicates type: 0=individual, 1-9=juristic person
    let first_digit = digits.chars().next().unwrap();
    if !first_digit.is_ascii_digit() {
        return Err("Invalid Thai Tax ID format");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Quantity and Money Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_positive_quantity() {
        assert!(validate_positive_quantity(Decimal::from(5)).is_ok());
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(Decimal::from(-3)).is_err());
    }

    #[test]
    fn test_validate_non_negative_quantity() {
        assert!(validate_non_negative_quantity(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_quantity(Decimal::from(10)).is_ok());
        assert!(validate_non_negative_quantity(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_positive_price() {
        assert!(validate_positive_price(Decimal::new(2550, 2)).is_ok());
        assert!(validate_positive_price(Decimal::ZERO).is_err());
        assert!(validate_positive_price(Decimal::from(-25)).is_err());
    }

    #[test]
    fn test_validate_non_negative_amount() {
        assert!(validate_non_negative_amount(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_amount(Decimal::from(1000)).is_ok());
        assert!(validate_non_negative_amount(Decimal::from(-1)).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.th").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_business_code_valid() {
        assert!(validate_business_code("SHP").is_ok());
        assert!(validate_business_code("BKK123").is_ok());
        assert!(validate_business_code("ABCDEFGHIJ").is_ok());
    }

    #[test]
    fn test_validate_business_code_invalid() {
        assert!(validate_business_code("AB").is_err()); // Too short
        assert!(validate_business_code("ABCDEFGHIJK").is_err()); // Too long
        assert!(validate_business_code("abc").is_err()); // Lowercase
        assert!(validate_business_code("AB-C").is_err()); // Special char
    }

    // ========================================================================
    // Thailand-Specific Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_thai_phone_valid() {
        // Standard Thai mobile
        assert!(validate_thai_phone("0812345678").is_ok());
        // With dashes
        assert!(validate_thai_phone("081-234-5678").is_ok());
        // Without leading zero
        assert!(validate_thai_phone("812345678").is_ok());
        // International format
        assert!(validate_thai_phone("+66812345678").is_ok());
        assert!(validate_thai_phone("66812345678").is_ok());
    }

    #[test]
    fn test_validate_thai_phone_invalid() {
        assert!(validate_thai_phone("12345").is_err());
        assert!(validate_thai_phone("123456789012").is_err());
        assert!(validate_thai_phone("abcdefghij").is_err());
    }

    #[test]
    fn test_validate_thai_tax_id_valid() {
        assert!(validate_thai_tax_id("0123456789012").is_ok());
        assert!(validate_thai_tax_id("1234567890123").is_ok());
    }

    #[test]
    fn test_validate_thai_tax_id_invalid() {
        assert!(validate_thai_tax_id("123456789").is_err());
        assert!(validate_thai_tax_id("12345678901234").is_err());
    }
}
