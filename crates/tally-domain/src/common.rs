//! Shared traits, money/date helpers, and enums used across billing entities.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in a book.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Rounds a monetary amount to cents.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Amounts below half a cent are treated as settled.
pub fn is_settled(balance: f64) -> bool {
    balance.abs() < 0.005
}

/// Lowercases a display name into the `[a-z0-9_]` slug used for storage keys.
pub fn canonical_slug(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "tenant".into()
    } else {
        sanitized
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// How a payment (incoming or outgoing) was settled.
pub enum PaymentMethod {
    Cash,
    #[default]
    BankTransfer,
    Card,
    Gateway,
    Other,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Card => "Card",
            PaymentMethod::Gateway => "Gateway",
            PaymentMethod::Other => "Other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Repetition cadence of a statutory obligation.
pub enum Cycle {
    Once,
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl Cycle {
    /// Number of months between two due dates, `None` for one-off obligations.
    pub fn months(self) -> Option<i32> {
        match self {
            Cycle::Once => None,
            Cycle::Monthly => Some(1),
            Cycle::Quarterly => Some(3),
            Cycle::HalfYearly => Some(6),
            Cycle::Yearly => Some(12),
        }
    }

    /// Returns the due date following `from`, or `None` when the cycle does not repeat.
    pub fn advance(self, from: NaiveDate) -> Option<NaiveDate> {
        self.months().map(|months| shift_month(from, months))
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Cycle::Once => "Once",
            Cycle::Monthly => "Monthly",
            Cycle::Quarterly => "Quarterly",
            Cycle::HalfYearly => "Half-yearly",
            Cycle::Yearly => "Yearly",
        };
        f.write_str(label)
    }
}

/// Moves `date` by `months`, clamping the day to the end of the target month.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn cycle_advance_clamps_to_month_end() {
        assert_eq!(Cycle::Monthly.advance(date(2025, 1, 31)), Some(date(2025, 2, 28)));
        assert_eq!(Cycle::Quarterly.advance(date(2025, 11, 30)), Some(date(2026, 2, 28)));
        assert_eq!(Cycle::HalfYearly.advance(date(2024, 8, 31)), Some(date(2025, 2, 28)));
        assert_eq!(Cycle::Yearly.advance(date(2024, 2, 29)), Some(date(2025, 2, 28)));
        assert_eq!(Cycle::Once.advance(date(2025, 1, 1)), None);
    }

    #[test]
    fn shift_month_handles_negative_offsets() {
        assert_eq!(shift_month(date(2025, 1, 15), -1), date(2024, 12, 15));
        assert_eq!(shift_month(date(2025, 3, 31), -13), date(2024, 2, 29));
    }

    #[test]
    fn canonical_slug_replaces_symbols() {
        assert_eq!(canonical_slug("  Acme Ltd. "), "acme_ltd_");
        assert_eq!(canonical_slug("!!!"), "tenant");
    }

    #[test]
    fn round_money_keeps_cents() {
        assert_eq!(round_money(10.005_1), 10.01);
        assert_eq!(round_money(3.333), 3.33);
        assert!(is_settled(0.004));
        assert!(!is_settled(0.01));
    }
}
