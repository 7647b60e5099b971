//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so every write path
//! goes through these.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity titles: service, combo, post subject lines, etc.
pub const MAX_TITLE_LEN: usize = 200;

/// Notes, descriptions, review comments
pub const MAX_NOTE_LEN: usize = 500;

/// Post bodies and chat messages
pub const MAX_CONTENT_LEN: usize = 2000;

/// Usernames
pub const MAX_USERNAME_LEN: usize = 64;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Booking quantity bounds
pub const MAX_QUANTITY: i64 = 100;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a price: finite, non-negative, below the sanity cap.
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    if value > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        )));
    }
    Ok(())
}

/// Validate a booking quantity.
pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// 邮箱形状检查：一个 '@'，两侧非空，域名带点。完整校验交给邮件侧。
pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(AppError::validation("email is too long"));
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::validation(format!("invalid email: {email}")));
    }
    Ok(())
}

/// Coupon code format: `[A-Z0-9_-]{4,32}`
pub fn validate_coupon_code(code: &str) -> Result<(), AppError> {
    if code.len() < 4 || code.len() > 32 {
        return Err(AppError::validation(
            "coupon code must be 4-32 characters long",
        ));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err(AppError::validation(
            "coupon code may only contain A-Z, 0-9, '_' and '-'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank() {
        assert!(validate_required_text("  ", "title", MAX_TITLE_LEN).is_err());
        assert!(validate_required_text("ok", "title", MAX_TITLE_LEN).is_ok());
    }

    #[test]
    fn coupon_code_format() {
        assert!(validate_coupon_code("SUMMER-2026").is_ok());
        assert!(validate_coupon_code("AB").is_err());
        assert!(validate_coupon_code("lower_case").is_err());
        assert!(validate_coupon_code("WITH SPACE").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("missing-at.com").is_err());
        assert!(validate_email("no-domain@").is_err());
        assert!(validate_email("@no-local.com").is_err());
    }

    #[test]
    fn price_bounds() {
        assert!(validate_price(10.0, "price").is_ok());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(2_000_000.0, "price").is_err());
    }
}
