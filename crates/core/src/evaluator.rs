//! Rule-evaluation boundary and the built-in evaluator.
//!
//! The validation walk never interprets rule names itself; it drives a
//! [`RuleEvaluator`]. [`BuiltinEvaluator`] is a default implementation
//! for hosts that do not bring their own engine.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Boundary to the synchronous rule engine.
///
/// Returns `true` when the value passes the rule. Implementations
/// receive the rule's parameter exactly as configured.
pub trait RuleEvaluator: Send + Sync {
    fn evaluate(&self, rule_name: &str, value: &str, param: &Value) -> bool;
}

/// Default evaluator covering the built-in rule set.
///
/// Mirrors common form-library behavior: `required` is the only rule
/// that fails on an empty value; every other rule treats an empty field
/// as optional and passes. Unknown rule names silently pass.
#[derive(Debug, Default)]
pub struct BuiltinEvaluator;

impl RuleEvaluator for BuiltinEvaluator {
    fn evaluate(&self, rule_name: &str, value: &str, param: &Value) -> bool {
        if rule_name == "required" {
            return evaluate_required(value);
        }
        // Optional-field behavior: nothing but `required` constrains an
        // empty value.
        if value.trim().is_empty() {
            return true;
        }
        match rule_name {
            "lettersonly" => evaluate_lettersonly(value),
            "expression" => evaluate_expression(value),
            "datecustom" => evaluate_datecustom(value),
            "phone" => evaluate_phone(value),
            "cpf" => evaluate_cpf(value),
            "minlength" => evaluate_minlength(value, param),
            "maxlength" => evaluate_maxlength(value, param),
            _ => true, // Unknown rule names silently pass
        }
    }
}

fn evaluate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

fn evaluate_lettersonly(value: &str) -> bool {
    value.chars().all(|c| c.is_alphabetic() || c == ' ')
}

/// Permissive e-mail shape: something, `@`, something, a dot, something.
fn evaluate_expression(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i).+@.+\..+").expect("valid email pattern"));
    re.is_match(value)
}

/// `dd/mm/yyyy` calendar dates, including 29/02 only in leap years.
fn evaluate_datecustom(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"^((((0?[1-9]|1\d|2[0-8])/(0?[1-9]|1[0-2]))|((29|30)/(0?[13456789]|1[0-2]))|(31/(0?[13578]|1[02])))/((19|20)?\d\d))$|^((29/0?2/)((19|20)?(0[48]|[2468][048]|[13579][26])|(20)?00))$",
        )
        .expect("valid date pattern")
    });
    re.is_match(value)
}

/// At least nine characters once the mask filler (`_`) is stripped.
fn evaluate_phone(value: &str) -> bool {
    value.chars().filter(|c| *c != '_').count() >= 9
}

/// Brazilian CPF: eleven digits, not all equal, both verifier digits
/// valid under the mod-11 checksum. Mask punctuation is ignored.
fn evaluate_cpf(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.windows(2).all(|w| w[0] == w[1]) {
        return false;
    }

    let verifier = |n: usize| -> u32 {
        let sum: u32 = digits[..n]
            .iter()
            .zip((2..=(n as u32 + 1)).rev())
            .map(|(d, w)| d * w)
            .sum();
        let rem = (sum * 10) % 11;
        if rem == 10 {
            0
        } else {
            rem
        }
    };

    verifier(9) == digits[9] && verifier(10) == digits[10]
}

fn evaluate_minlength(value: &str, param: &Value) -> bool {
    let min = param.as_u64().unwrap_or(0) as usize;
    value.chars().count() >= min
}

fn evaluate_maxlength(value: &str, param: &Value) -> bool {
    let max = param.as_u64().unwrap_or(u64::MAX) as usize;
    value.chars().count() <= max
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
