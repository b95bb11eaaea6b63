use std::fmt;

use chrono::{DateTime, Utc};

use crate::dates::days_until;
use crate::ledger::Invoice;
use crate::money::round_currency;

/// Proximity of a held retention to its release date.
///
/// Classified independently of payment status: a paid invoice can still have
/// money held against a future release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionStatus {
    Held,
    DueSoon,
    Overdue,
    Unknown,
}

impl fmt::Display for RetentionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionStatus::Held => write!(f, "Held"),
            RetentionStatus::DueSoon => write!(f, "Due Soon"),
            RetentionStatus::Overdue => write!(f, "Overdue"),
            RetentionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Classify one invoice's retention by release-date proximity.
pub fn classify(invoice: &Invoice, now: DateTime<Utc>) -> RetentionStatus {
    let Some(release) = invoice.retention_release_date else {
        return RetentionStatus::Unknown;
    };

    let days = days_until(now, release);
    if days < 0 {
        RetentionStatus::Overdue
    } else if days <= 30 {
        RetentionStatus::DueSoon
    } else {
        RetentionStatus::Held
    }
}

/// Invoices currently holding retention, regardless of payment status.
pub fn held_invoices(invoices: &[Invoice]) -> Vec<&Invoice> {
    invoices
        .iter()
        .filter(|i| i.retention_percentage > 0.0)
        .collect()
}

/// Aggregate retention exposure across the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionSummary {
    pub total_held: f64,
    pub due_soon: usize,
    pub overdue: usize,
}

pub fn summarize(invoices: &[Invoice], now: DateTime<Utc>) -> RetentionSummary {
    let held = held_invoices(invoices);
    RetentionSummary {
        total_held: round_currency(held.iter().map(|i| i.retention_amount()).sum()),
        due_soon: held
            .iter()
            .filter(|i| classify(i, now) == RetentionStatus::DueSoon)
            .count(),
        overdue: held
            .iter()
            .filter(|i| classify(i, now) == RetentionStatus::Overdue)
            .count(),
    }
}
