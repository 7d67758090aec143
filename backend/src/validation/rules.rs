//! Common validation rules shared across request payloads.

use validator::ValidationError;

use crate::types::OrderId;

/// Longest fingerprinter script accepted, in lines.
pub const MAX_SCRIPT_LINES: usize = 1000;

/// Validates fingerprint hash format.
///
/// Requirements:
/// - Only ASCII letters, digits and `-`
pub fn validate_fingerprint_hash(fingerprint: &str) -> Result<(), ValidationError> {
    if !fingerprint
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ValidationError::new("fingerprint_invalid_characters"));
    }
    Ok(())
}

/// Validates that a fingerprinter script stays within the line budget.
pub fn validate_script_lines(script: &str) -> Result<(), ValidationError> {
    if script.split('\n').count() > MAX_SCRIPT_LINES {
        return Err(ValidationError::new("fingerprinter_js_too_long"));
    }
    Ok(())
}

/// Validates a stored asset name before it touches the filesystem.
///
/// Requirements:
/// - Only ASCII letters, digits, `_`, `-` and `.`
/// - No `..` sequences and no leading `.`
pub fn validate_asset_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.len() > 128 {
        return Err(ValidationError::new("asset_name_invalid_length"));
    }
    if name.starts_with('.') || name.contains("..") {
        return Err(ValidationError::new("asset_name_traversal"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ValidationError::new("asset_name_invalid_characters"));
    }
    Ok(())
}

/// Validates that an order id lies inside the publicly accepted range.
pub fn validate_public_order_id(order_id: &OrderId) -> Result<(), ValidationError> {
    if !order_id.is_in_public_range() {
        return Err(ValidationError::new("order_id_out_of_range"));
    }
    Ok(())
}
