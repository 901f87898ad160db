//! Brazilian Real helpers.
//!
//! All money in the crate is a `rust_decimal::Decimal` with two decimal
//! places. Rounding is banker's rounding (half-to-even), the default of
//! `Decimal::round_dp`, and every module rounds through [`round_cents`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::{AppError, Result};

/// An amount as received from a client: either an exact decimal or the text
/// a user typed (`"1.500,00"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Exact(Decimal),
    Text(String),
}

impl AmountInput {
    pub fn resolve(&self) -> Result<Decimal> {
        match self {
            AmountInput::Exact(value) => Ok(*value),
            AmountInput::Text(text) => parse_brl(text),
        }
    }
}

/// Decimal places carried by BRL amounts
pub const SCALE: u32 = 2;

/// Rounds an amount to whole cents (half-to-even)
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp(SCALE)
}

/// Validates that an amount is positive and has at most two decimal places
pub fn validate_amount(amount: Decimal) -> std::result::Result<(), String> {
    if amount.normalize().scale() > SCALE {
        return Err(format!(
            "BRL amounts must have at most {} decimal places, got {}",
            SCALE, amount
        ));
    }

    if amount <= Decimal::ZERO {
        return Err("Valor deve ser maior que zero".to_string());
    }

    Ok(())
}

/// Formats an amount as `R$ 1.234,56`
pub fn format_brl(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {}{},{}", sign, grouped, frac_part)
}

/// Parses user-typed BRL text.
///
/// `R$` and spaces are ignored. When a comma is present the text is read in
/// Brazilian notation (`1.500,02`); otherwise it is read as a plain decimal.
pub fn parse_brl(input: &str) -> Result<Decimal> {
    let mut cleaned: String = input
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.contains(',') {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }

    if cleaned.is_empty() {
        return Err(AppError::validation("Valor é obrigatório"));
    }

    Decimal::from_str(&cleaned)
        .map_err(|_| AppError::validation(format!("Formato inválido: '{}'. Use: 1.500,00", input)))
}
