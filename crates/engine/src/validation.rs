//! Value validation used by typed inputs.
//!
//! Currency validation is synchronous; function-signature parsing is async so
//! implementations may consult an ABI source.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use txpanel_types::Denomination;

use crate::ValidationError;

/// Validates a currency amount and describes it.
pub trait CurrencyValidator: Send + Sync {
    fn validate_currency(
        &self,
        value: &str,
        denomination: Denomination,
        show_base_units: bool,
    ) -> Result<String, ValidationError>;
}

/// Parses a function signature and describes it.
#[async_trait]
pub trait FunctionParser: Send + Sync {
    async fn parse_function(&self, value: &str, allow_negate: bool) -> Result<String, ValidationError>;
}

/// Exact decimal amounts, converted to wei without floating point.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecimalCurrencyValidator;

impl CurrencyValidator for DecimalCurrencyValidator {
    fn validate_currency(
        &self,
        value: &str,
        denomination: Denomination,
        show_base_units: bool,
    ) -> Result<String, ValidationError> {
        let amount = value.trim();
        if amount.is_empty() {
            return Err(ValidationError::Invalid("amount is required".into()));
        }
        let wei = to_wei(amount, denomination)?;
        if show_base_units {
            Ok(format!("{amount} {} = {wei} wei", denomination.as_str()))
        } else {
            Ok(format!("{amount} {}", denomination.as_str()))
        }
    }
}

fn to_wei(amount: &str, denomination: Denomination) -> Result<u128, ValidationError> {
    let invalid = || ValidationError::Invalid(format!("{amount} is not a valid {} amount", denomination.as_str()));
    let too_large = || ValidationError::Invalid("amount is too large".into());

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|ch| ch.is_ascii_digit()) {
        return Err(invalid());
    }

    let decimals = denomination.decimals();
    if fraction.len() > decimals as usize {
        return Err(ValidationError::Invalid(format!(
            "{} supports at most {decimals} decimal places",
            denomination.as_str()
        )));
    }

    let scale = 10u128.pow(decimals);
    let whole_value = if whole.is_empty() { 0 } else { whole.parse::<u128>().map_err(|_| too_large())? };
    let fraction_value = if fraction.is_empty() {
        0
    } else {
        let padding = 10u128.pow(decimals - fraction.len() as u32);
        fraction.parse::<u128>().map_err(|_| invalid())? * padding
    };

    whole_value
        .checked_mul(scale)
        .and_then(|scaled| scaled.checked_add(fraction_value))
        .ok_or_else(too_large)
}

/// Parses `name(type,...)` signatures, optionally prefixed with `!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignatureParser;

#[async_trait]
impl FunctionParser for SignatureParser {
    async fn parse_function(&self, value: &str, allow_negate: bool) -> Result<String, ValidationError> {
        let signature = value.trim();
        if signature.is_empty() {
            return Err(ValidationError::Invalid("function signature is required".into()));
        }

        let malformed = || ValidationError::Invalid(format!("{signature} is not a function signature"));
        let captures = SIGNATURE_PATTERN.captures(signature).ok_or_else(malformed)?;
        let negated = captures.get(1).is_some();
        if negated && !allow_negate {
            return Err(ValidationError::Invalid("negation is not allowed here".into()));
        }

        let name = &captures[2];
        let params = captures[3].trim();
        let params: Vec<&str> = if params.is_empty() {
            Vec::new()
        } else {
            params.split(',').map(str::trim).collect()
        };
        if params.iter().any(|param| !TYPE_PATTERN.is_match(param)) {
            return Err(malformed());
        }

        let canonical = format!("{name}({})", params.join(","));
        Ok(if negated { format!("not {canonical}") } else { canonical })
    }
}

/// `[!] name ( params )`, capturing the negation marker, name and raw parameter list.
static SIGNATURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(!)?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(([^()]*)\)$").expect("signature pattern compiles")
});

/// Elementary type with optional array suffixes, e.g. `uint256[]` or `bytes32[2]`.
static TYPE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*(\[[0-9]*\])*$").expect("type pattern compiles"));
