use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{days_overdue, days_until};
use crate::money::round_currency;

/// Payment status of an invoice.
///
/// `Paid` is only ever set by an explicit command and is sticky; the other
/// two values are re-derived from the due date at every read (see
/// [`Invoice::reconciled_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Unpaid,
    Overdue,
    Paid,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Unpaid => write!(f, "Unpaid"),
            InvoiceStatus::Overdue => write!(f, "Overdue"),
            InvoiceStatus::Paid => write!(f, "Paid"),
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "paid" => Ok(InvoiceStatus::Paid),
            _ => Err(format!(
                "Invalid status '{s}'. Use 'unpaid', 'overdue', or 'paid'."
            )),
        }
    }
}

/// Cadence of automated payment reminders for one invoice.
///
/// The actual scheduling runs in the external automation engine; the core
/// only records the chosen cadence and whether chasing is active at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderFrequency {
    Hourly,
    Daily,
    Weekly,
    Disabled,
}

impl ReminderFrequency {
    pub fn is_active(self) -> bool {
        self != ReminderFrequency::Disabled
    }
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderFrequency::Hourly => write!(f, "Hourly"),
            ReminderFrequency::Daily => write!(f, "Daily"),
            ReminderFrequency::Weekly => write!(f, "Weekly"),
            ReminderFrequency::Disabled => write!(f, "Disabled"),
        }
    }
}

impl FromStr for ReminderFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => Ok(ReminderFrequency::Hourly),
            "daily" => Ok(ReminderFrequency::Daily),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "disabled" => Ok(ReminderFrequency::Disabled),
            _ => Err(format!(
                "Invalid frequency '{s}'. Use 'hourly', 'daily', 'weekly', or 'disabled'."
            )),
        }
    }
}

/// An approved change order against an invoice's contract value.
///
/// Variations are immutable once added and never outlive their invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    pub id: String,
    pub description: String,
    /// Signed; a negative variation reduces the gross total.
    pub amount: f64,
    pub date_added: DateTime<Utc>,
}

/// Per-stage overrides for the reminder email body.
///
/// Stage 1 covers 1-7 days overdue, stage 2 covers 8-14, stage 3 covers 15+.
/// Updates merge key by key; an absent stage never clears a stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage3: Option<String>,
}

impl EmailOverrides {
    pub fn is_empty(&self) -> bool {
        self.stage1.is_none() && self.stage2.is_none() && self.stage3.is_none()
    }

    /// Merge `other` into `self`, keeping existing stages that `other` omits.
    pub fn merge(&mut self, other: EmailOverrides) {
        if other.stage1.is_some() {
            self.stage1 = other.stage1;
        }
        if other.stage2.is_some() {
            self.stage2 = other.stage2;
        }
        if other.stage3.is_some() {
            self.stage3 = other.stage3;
        }
    }
}

/// The central ledger entity.
///
/// Monetary derivations are computed on every call and never cached; the only
/// stored money field is the base `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub invoice_number: String,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default)]
    pub project_name: String,
    /// Base contract value before variations and retention.
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub status: InvoiceStatus,
    #[serde(default)]
    pub retention_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_release_date: Option<DateTime<Utc>>,
    pub reminder_frequency: ReminderFrequency,
    /// Escalation level last committed by a command. Advisory; read surfaces
    /// show the banding derived from the due date instead.
    #[serde(default)]
    pub reminder_stage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reminder_sent: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scheduled_reminder: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "EmailOverrides::is_empty")]
    pub email_overrides: EmailOverrides,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Invoice {
    /// Sum of all variation amounts. Zero when there are none.
    pub fn variations_total(&self) -> f64 {
        self.variations.iter().map(|v| v.amount).sum()
    }

    /// Base amount plus all variations.
    pub fn gross_total(&self) -> f64 {
        round_currency(self.amount + self.variations_total())
    }

    /// Retention held against the gross total. The percentage is applied as
    /// given; values outside 0-100 are an operator error, not clamped here.
    pub fn retention_amount(&self) -> f64 {
        round_currency(self.gross_total() * self.retention_percentage / 100.0)
    }

    /// Gross total minus the held retention.
    pub fn net_payable(&self) -> f64 {
        round_currency(self.gross_total() - self.retention_amount())
    }

    /// Whole days past due, clamped to zero. Feeds reminder dispatch and
    /// stage banding.
    pub fn days_overdue_at(&self, now: DateTime<Utc>) -> i64 {
        days_overdue(now, self.due_date)
    }

    /// Signed whole days until the due date, for display. Negative once the
    /// invoice is past due.
    pub fn days_until_due_at(&self, now: DateTime<Utc>) -> i64 {
        days_until(now, self.due_date)
    }

    /// The status a reader should see right now.
    ///
    /// `Paid` is authoritative. Otherwise the stored value may be stale
    /// relative to the due date, so Unpaid/Overdue is recomputed here instead
    /// of by a background job.
    pub fn reconciled_status(&self, now: DateTime<Utc>) -> InvoiceStatus {
        if self.status == InvoiceStatus::Paid {
            InvoiceStatus::Paid
        } else if now > self.due_date {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Unpaid
        }
    }
}
