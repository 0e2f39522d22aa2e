//! Derived dimension expressions
//!
//! Grammar: `term (('*' | '/') term)*` where a term is `key`, `key^n` or
//! the literal `1` (so `1/time` is valid). A `/` negates the power of the
//! term that follows it. Repeated keys merge and zero powers vanish.

use super::entry::{DefinitionId, DerivedComponent};
use crate::error::{QuantityError, Result};

/// Parse `expression`, resolving each key through `resolve`
pub(crate) fn parse_derived<F>(expression: &str, resolve: F) -> Result<Vec<DerivedComponent>>
where
    F: Fn(&str) -> Option<DefinitionId>,
{
    let invalid = |reason: &str| QuantityError::InvalidDerivation {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    if expression.trim().is_empty() {
        return Err(invalid("expression is empty"));
    }

    let mut components: Vec<DerivedComponent> = Vec::new();
    let mut sign = 1;
    let mut rest = expression;

    loop {
        let end = rest.find(['*', '/']).unwrap_or(rest.len());
        let term = rest[..end].trim();
        if term.is_empty() {
            return Err(invalid("missing term"));
        }

        if term != "1" {
            let (key, power) = split_power(term).ok_or_else(|| invalid("malformed power"))?;
            let definition =
                resolve(key).ok_or_else(|| invalid(&format!("unknown definition `{key}`")))?;
            let power = power
                .checked_mul(sign)
                .ok_or_else(|| invalid("power out of range"))?;

            match components.iter_mut().find(|c| c.definition == definition) {
                Some(existing) => {
                    existing.power = existing
                        .power
                        .checked_add(power)
                        .ok_or_else(|| invalid("power out of range"))?;
                }
                None => components.push(DerivedComponent { definition, power }),
            }
        }

        if end == rest.len() {
            break;
        }
        sign = if rest.as_bytes()[end] == b'/' { -1 } else { 1 };
        rest = &rest[end + 1..];
    }

    components.retain(|c| c.power != 0);
    Ok(components)
}

/// Split `key^n` into its key and power; a bare key has power 1
pub(crate) fn split_power(term: &str) -> Option<(&str, i32)> {
    match term.rsplit_once('^') {
        Some((key, power)) => {
            let key = key.trim();
            let power: i32 = power.trim().parse().ok()?;
            (!key.is_empty()).then_some((key, power))
        }
        None => Some((term, 1)),
    }
}
