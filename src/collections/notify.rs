use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{Company, User, WebhookSettings};
use crate::ledger::{Invoice, InvoiceStatus};

/// Result of one best-effort dispatch attempt. Never an error: delivery
/// failures are logged here and absorbed, so state mutation upstream cannot
/// be blocked by an unreachable collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Failed,
    Skipped,
}

/// Envelope for the reminder notification collaborator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub action: &'static str,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub company_id: String,
    pub company_name: String,
    pub data: ReminderData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderData {
    pub invoice_id: String,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: String,
    pub project_name: String,
    pub amount: f64,
    pub due_date: DateTime<Utc>,
    pub days_overdue: i64,
}

impl ReminderPayload {
    pub fn new(
        invoice: &Invoice,
        user: &User,
        company: &Company,
        days_overdue: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            action: "send_payment_reminder",
            timestamp: now,
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            user_phone: user.phone.clone().unwrap_or_default(),
            company_id: company.id.clone(),
            company_name: company.name.clone(),
            data: ReminderData {
                invoice_id: invoice.id.clone(),
                invoice_number: invoice.invoice_number.clone(),
                client_name: invoice.client_name.clone(),
                client_email: invoice.client_email.clone().unwrap_or_default(),
                project_name: invoice.project_name.clone(),
                amount: invoice.amount,
                due_date: invoice.due_date,
                days_overdue,
            },
        }
    }
}

/// Payload for the schedule-activation automation engine.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub invoice_number: String,
    pub client_name: String,
    pub gross_total: f64,
    pub net_payable: f64,
    pub due_date: DateTime<Utc>,
    pub status: InvoiceStatus,
    pub triggered_at: DateTime<Utc>,
}

impl SchedulePayload {
    pub fn new(invoice: &Invoice, now: DateTime<Utc>) -> Self {
        Self {
            invoice_number: invoice.invoice_number.clone(),
            client_name: invoice.client_name.clone(),
            gross_total: invoice.gross_total(),
            net_payable: invoice.net_payable(),
            due_date: invoice.due_date,
            status: invoice.status,
            triggered_at: now,
        }
    }
}

/// The seam between the state machine and the outside world. Production uses
/// [`WebhookDispatcher`]; tests record calls.
pub trait Dispatcher {
    fn send_reminder(&self, payload: &ReminderPayload) -> DispatchOutcome;
    fn activate_schedule(&self, payload: &SchedulePayload) -> DispatchOutcome;
}

/// Fire-and-forget webhook client with a bounded global timeout.
///
/// Transport errors and non-2xx responses are logged and reported as
/// `Failed`; an unconfigured URL short-circuits to `Skipped`. No retries.
pub struct WebhookDispatcher {
    agent: ureq::Agent,
    reminder_url: String,
    schedule_url: String,
}

impl WebhookDispatcher {
    pub fn from_settings(settings: &WebhookSettings) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            reminder_url: settings.reminder_url.clone(),
            schedule_url: settings.schedule_url.clone(),
        }
    }

    fn post_json<T: Serialize>(&self, kind: &'static str, url: &str, payload: &T) -> DispatchOutcome {
        if url.is_empty() {
            debug!(kind, "webhook URL not configured, skipping dispatch");
            return DispatchOutcome::Skipped;
        }

        match self.agent.post(url).send_json(payload) {
            Ok(_) => DispatchOutcome::Delivered,
            Err(e) => {
                warn!(kind, error = %e, "webhook dispatch failed");
                DispatchOutcome::Failed
            }
        }
    }
}

impl Dispatcher for WebhookDispatcher {
    fn send_reminder(&self, payload: &ReminderPayload) -> DispatchOutcome {
        self.post_json("reminder", &self.reminder_url, payload)
    }

    fn activate_schedule(&self, payload: &SchedulePayload) -> DispatchOutcome {
        self.post_json("schedule", &self.schedule_url, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::ledger::{EmailOverrides, ReminderFrequency};

    fn sample_invoice() -> Invoice {
        Invoice {
            id: "inv_101".to_string(),
            invoice_number: "INV-2026-001".to_string(),
            client_name: "Apex Interiors Ltd".to_string(),
            client_email: Some("accounts@apex-interiors.co.uk".to_string()),
            project_name: "Regent Street Refurb".to_string(),
            amount: 47500.0,
            due_date: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            status: InvoiceStatus::Overdue,
            retention_percentage: 5.0,
            retention_release_date: None,
            reminder_frequency: ReminderFrequency::Daily,
            reminder_stage: 1,
            last_reminder_sent: None,
            next_scheduled_reminder: None,
            email_overrides: EmailOverrides::default(),
            variations: Vec::new(),
        }
    }

    #[test]
    fn reminder_payload_uses_camel_case_wire_names() {
        let user = User {
            id: "usr_1".to_string(),
            name: "James Sterling".to_string(),
            email: "james@sterling-construct.co.uk".to_string(),
            phone: None,
            role: "admin".to_string(),
        };
        let company = Company {
            id: "cmp_1".to_string(),
            name: "Sterling Fit-Outs Ltd".to_string(),
        };
        let now = Utc.with_ymd_and_hms(2026, 3, 6, 9, 0, 0).unwrap();

        let payload = ReminderPayload::new(&sample_invoice(), &user, &company, 5, now);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["action"], "send_payment_reminder");
        assert_eq!(json["userId"], "usr_1");
        assert_eq!(json["userPhone"], "");
        assert_eq!(json["companyName"], "Sterling Fit-Outs Ltd");
        assert_eq!(json["data"]["invoiceNumber"], "INV-2026-001");
        assert_eq!(json["data"]["daysOverdue"], 5);
        assert_eq!(json["data"]["clientEmail"], "accounts@apex-interiors.co.uk");
    }

    #[test]
    fn schedule_payload_carries_derived_totals() {
        let mut invoice = sample_invoice();
        invoice.variations.push(crate::ledger::Variation {
            id: "var_1".to_string(),
            description: "Additional lighting".to_string(),
            amount: 2500.0,
            date_added: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
        });
        let now = Utc.with_ymd_and_hms(2026, 3, 6, 9, 0, 0).unwrap();

        let payload = SchedulePayload::new(&invoice, now);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["grossTotal"], 50000.0);
        assert_eq!(json["netPayable"], 47500.0);
        assert_eq!(json["status"], "Overdue");
        assert_eq!(json["invoiceNumber"], "INV-2026-001");
    }

    #[test]
    fn unconfigured_urls_skip_without_an_attempt() {
        let dispatcher = WebhookDispatcher::from_settings(&WebhookSettings::default());
        let payload = SchedulePayload::new(
            &sample_invoice(),
            Utc.with_ymd_and_hms(2026, 3, 6, 9, 0, 0).unwrap(),
        );
        assert_eq!(
            dispatcher.activate_schedule(&payload),
            DispatchOutcome::Skipped
        );
    }
}
