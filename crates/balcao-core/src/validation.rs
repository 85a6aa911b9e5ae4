//! # Input Validation
//!
//! Field-level validators applied at the edge of every write operation, plus
//! the SKU slug helper used when variant SKUs are generated from variant
//! values. All functions are pure; uniqueness of generated SKUs is enforced
//! by the storage layer.

use crate::error::ValidationError;
use crate::money::Money;

/// Trims and requires a non-empty string field.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

/// Requires a strictly positive integer field (quantities, volumes).
pub fn require_positive(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(value)
}

/// Requires a non-negative integer field (thresholds).
pub fn require_non_negative(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        return Err(ValidationError::NonNegative { field });
    }
    Ok(value)
}

/// Requires a non-negative money field (prices, costs, fees, discounts).
pub fn require_non_negative_money(
    field: &'static str,
    value: Money,
) -> Result<Money, ValidationError> {
    if value.is_negative() {
        return Err(ValidationError::NonNegative { field });
    }
    Ok(value)
}

/// Converts a variant value into a safe SKU suffix.
///
/// Accented Latin letters are folded to ASCII, any other run of
/// non-alphanumeric characters collapses to a single `-`, and the result is
/// uppercased. An empty result falls back to `VAR`.
///
/// ## Example
/// ```
/// use balcao_core::validation::sku_slug;
///
/// assert_eq!(sku_slug("Azul Céu"), "AZUL-CEU");
/// assert_eq!(sku_slug("  ~~ "), "VAR");
/// ```
pub fn sku_slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        let folded = fold_ascii(ch);
        match folded {
            Some(c) => {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c.to_ascii_uppercase());
            }
            None => pending_dash = true,
        }
    }
    if out.is_empty() {
        "VAR".to_string()
    } else {
        out
    }
}

/// Builds the base generated SKU for a variant: `<product_sku>-<slug>`.
/// The storage layer appends `-2`, `-3`, ... on collision.
pub fn variant_sku_base(product_sku: &str, variant_value: &str) -> String {
    format!("{}-{}", product_sku.trim(), sku_slug(variant_value))
}

/// Folds a character to its ASCII alphanumeric equivalent, or None when the
/// character separates slug segments.
fn fold_ascii(ch: char) -> Option<char> {
    if ch.is_ascii_alphanumeric() {
        return Some(ch);
    }
    // Latin accents common in pt-BR product data
    let folded = match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        _ => return None,
    };
    Some(folded)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty_trims() {
        assert_eq!(require_non_empty("sku", "  CAM-01  ").unwrap(), "CAM-01");
        assert!(require_non_empty("sku", "   ").is_err());
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("qty", 3).unwrap(), 3);
        assert!(require_positive("qty", 0).is_err());
        assert!(require_positive("qty", -2).is_err());
    }

    #[test]
    fn test_require_non_negative_money() {
        assert!(require_non_negative_money("fees", Money::zero()).is_ok());
        assert!(require_non_negative_money("fees", Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_sku_slug_folds_accents() {
        assert_eq!(sku_slug("Azul Céu"), "AZUL-CEU");
        assert_eq!(sku_slug("Tamanho Único"), "TAMANHO-UNICO");
        assert_eq!(sku_slug("coração"), "CORACAO");
    }

    #[test]
    fn test_sku_slug_collapses_separators() {
        assert_eq!(sku_slug("preto / fosco"), "PRETO-FOSCO");
        assert_eq!(sku_slug("--38--"), "38");
    }

    #[test]
    fn test_sku_slug_fallback() {
        assert_eq!(sku_slug(""), "VAR");
        assert_eq!(sku_slug("  ~~ "), "VAR");
        // characters with no fold are dropped, not transliterated
        assert_eq!(sku_slug("日本"), "VAR");
    }

    #[test]
    fn test_variant_sku_base() {
        assert_eq!(variant_sku_base(" CAM-01 ", "Preto"), "CAM-01-PRETO");
    }
}
