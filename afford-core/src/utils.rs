use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error, PartialEq)]
#[error("invalid number '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and strips thousands separators and a leading `$`.
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    trimmed.replace(',', "")
}

/// Parses user-typed money or rate text.
///
/// Accepts `,` as a thousands separator (`"1,234.56"`). Blank input is zero.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    parse_optional_decimal(s).map(|d| d.unwrap_or(Decimal::ZERO))
}

/// Like [`parse_decimal`], but blank input is `None`.
pub fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized.parse().map(Some).map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}
