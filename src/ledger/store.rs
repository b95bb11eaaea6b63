use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CashbuildError, Result};
use crate::ledger::invoice::{
    EmailOverrides, Invoice, InvoiceStatus, ReminderFrequency, Variation,
};

/// Fields accepted by [`Store::create`]. The four the core requires are
/// validated there; everything else falls back to a default.
#[derive(Debug, Default, Clone)]
pub struct InvoiceDraft {
    pub invoice_number: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub project_name: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<InvoiceStatus>,
    pub retention_percentage: Option<f64>,
    pub retention_release_date: Option<DateTime<Utc>>,
}

/// Partial update applied by [`Store::update`]. Present fields overwrite;
/// absent fields are left alone. `email_overrides` merges stage by stage
/// instead of replacing the stored set.
#[derive(Debug, Default, Clone)]
pub struct InvoicePatch {
    pub invoice_number: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub project_name: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<InvoiceStatus>,
    pub retention_percentage: Option<f64>,
    pub retention_release_date: Option<DateTime<Utc>>,
    pub reminder_frequency: Option<ReminderFrequency>,
    pub reminder_stage: Option<u8>,
    pub next_scheduled_reminder: Option<DateTime<Utc>>,
    pub email_overrides: Option<EmailOverrides>,
}

/// The single mutable owner of the invoice collection.
///
/// Invoices are kept newest-first; `create` prepends. Persisted as
/// `store.toml` in the config directory and loaded whole into memory for
/// every command.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

fn new_invoice_id() -> String {
    format!("inv_{}", Uuid::new_v4().simple())
}

fn new_variation_id() -> String {
    format!("var_{}", Uuid::new_v4().simple())
}

impl Store {
    /// Create a new invoice from a draft and prepend it to the collection.
    ///
    /// Status defaults from the due date: overdue at creation time starts as
    /// `Overdue` unless the draft explicitly says `Paid`.
    pub fn create(
        &mut self,
        draft: InvoiceDraft,
        default_frequency: ReminderFrequency,
        now: DateTime<Utc>,
    ) -> Result<&Invoice> {
        let invoice_number = draft
            .invoice_number
            .ok_or(CashbuildError::MissingField("invoiceNumber"))?;
        let client_name = draft
            .client_name
            .ok_or(CashbuildError::MissingField("clientName"))?;
        let amount = draft.amount.ok_or(CashbuildError::MissingField("amount"))?;
        let due_date = draft
            .due_date
            .ok_or(CashbuildError::MissingField("dueDate"))?;

        let mut status = draft.status.unwrap_or(InvoiceStatus::Unpaid);
        if due_date < now && status != InvoiceStatus::Paid {
            status = InvoiceStatus::Overdue;
        }

        let invoice = Invoice {
            id: new_invoice_id(),
            invoice_number,
            client_name,
            client_email: draft.client_email,
            project_name: draft.project_name.unwrap_or_default(),
            amount,
            due_date,
            status,
            retention_percentage: draft.retention_percentage.unwrap_or(0.0),
            retention_release_date: draft.retention_release_date,
            reminder_frequency: default_frequency,
            reminder_stage: 0,
            last_reminder_sent: None,
            next_scheduled_reminder: None,
            email_overrides: EmailOverrides::default(),
            variations: Vec::new(),
        };

        self.invoices.insert(0, invoice);
        Ok(&self.invoices[0])
    }

    pub fn get(&self, id: &str) -> Result<&Invoice> {
        self.invoices
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| CashbuildError::InvoiceNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Invoice> {
        self.invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CashbuildError::InvoiceNotFound(id.to_string()))
    }

    /// Invoices in stored order (newest first), optionally filtered by the
    /// status a reader would see at `now`.
    pub fn list(&self, status: Option<InvoiceStatus>, now: DateTime<Utc>) -> Vec<&Invoice> {
        self.invoices
            .iter()
            .filter(|i| status.map_or(true, |s| i.reconciled_status(now) == s))
            .collect()
    }

    /// Shallow-merge a patch into an invoice. `email_overrides` deep-merges.
    pub fn update(&mut self, id: &str, patch: InvoicePatch) -> Result<&Invoice> {
        let invoice = self.get_mut(id)?;

        if let Some(number) = patch.invoice_number {
            invoice.invoice_number = number;
        }
        if let Some(name) = patch.client_name {
            invoice.client_name = name;
        }
        if let Some(email) = patch.client_email {
            invoice.client_email = Some(email);
        }
        if let Some(project) = patch.project_name {
            invoice.project_name = project;
        }
        if let Some(amount) = patch.amount {
            invoice.amount = amount;
        }
        if let Some(due) = patch.due_date {
            invoice.due_date = due;
        }
        if let Some(status) = patch.status {
            invoice.status = status;
        }
        if let Some(pct) = patch.retention_percentage {
            invoice.retention_percentage = pct;
        }
        if let Some(release) = patch.retention_release_date {
            invoice.retention_release_date = Some(release);
        }
        if let Some(frequency) = patch.reminder_frequency {
            invoice.reminder_frequency = frequency;
        }
        if let Some(stage) = patch.reminder_stage {
            invoice.reminder_stage = stage;
        }
        if let Some(next) = patch.next_scheduled_reminder {
            invoice.next_scheduled_reminder = Some(next);
        }
        if let Some(overrides) = patch.email_overrides {
            invoice.email_overrides.merge(overrides);
        }

        Ok(invoice)
    }

    /// Hard delete. No tombstone is kept.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.invoices.len();
        self.invoices.retain(|i| i.id != id);
        if self.invoices.len() == before {
            return Err(CashbuildError::InvoiceNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Append a change order to an invoice.
    pub fn add_variation(
        &mut self,
        id: &str,
        description: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<&Invoice> {
        let invoice = self.get_mut(id)?;
        invoice.variations.push(Variation {
            id: new_variation_id(),
            description: description.to_string(),
            amount,
            date_added: now,
        });
        Ok(invoice)
    }

    /// Set the retention terms. Passing `None` for the release date clears it.
    pub fn set_retention(
        &mut self,
        id: &str,
        percentage: f64,
        release_date: Option<DateTime<Utc>>,
    ) -> Result<&Invoice> {
        let invoice = self.get_mut(id)?;
        invoice.retention_percentage = percentage;
        invoice.retention_release_date = release_date;
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 12, 0, 0).unwrap()
    }

    fn draft(number: &str, amount: f64, due: DateTime<Utc>) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: Some(number.to_string()),
            client_name: Some("Apex Interiors Ltd".to_string()),
            amount: Some(amount),
            due_date: Some(due),
            ..InvoiceDraft::default()
        }
    }

    #[test]
    fn create_requires_the_four_core_fields() {
        let mut store = Store::default();
        let missing = InvoiceDraft {
            client_name: Some("Apex Interiors Ltd".to_string()),
            amount: Some(1000.0),
            due_date: Some(day(20)),
            ..InvoiceDraft::default()
        };
        let err = store
            .create(missing, ReminderFrequency::Weekly, day(10))
            .unwrap_err();
        assert!(matches!(err, CashbuildError::MissingField("invoiceNumber")));
        assert!(store.invoices.is_empty());
    }

    #[test]
    fn create_defaults_status_from_due_date() {
        let mut store = Store::default();
        let now = day(10);

        store
            .create(draft("INV-001", 1000.0, day(20)), ReminderFrequency::Weekly, now)
            .unwrap();
        assert_eq!(store.invoices[0].status, InvoiceStatus::Unpaid);

        store
            .create(draft("INV-002", 500.0, day(5)), ReminderFrequency::Weekly, now)
            .unwrap();
        assert_eq!(store.invoices[0].status, InvoiceStatus::Overdue);
    }

    #[test]
    fn create_respects_an_explicit_paid_status() {
        let mut store = Store::default();
        let mut paid = draft("INV-001", 1000.0, day(5));
        paid.status = Some(InvoiceStatus::Paid);
        store
            .create(paid, ReminderFrequency::Weekly, day(10))
            .unwrap();
        assert_eq!(store.invoices[0].status, InvoiceStatus::Paid);
    }

    #[test]
    fn create_prepends_newest_first() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 100.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        store
            .create(draft("INV-002", 200.0, day(20)), ReminderFrequency::Weekly, day(2))
            .unwrap();
        let numbers: Vec<_> = store
            .list(None, day(3))
            .iter()
            .map(|i| i.invoice_number.clone())
            .collect();
        assert_eq!(numbers, vec!["INV-002", "INV-001"]);
    }

    #[test]
    fn list_filters_on_reconciled_status() {
        let mut store = Store::default();
        // Created before its due date, but read after it has passed: the
        // stored Unpaid is stale and the filter must see Overdue.
        store
            .create(draft("INV-001", 100.0, day(5)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        store
            .create(draft("INV-002", 200.0, day(25)), ReminderFrequency::Weekly, day(1))
            .unwrap();

        let overdue = store.list(Some(InvoiceStatus::Overdue), day(10));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].invoice_number, "INV-001");
        assert!(store.list(Some(InvoiceStatus::Paid), day(10)).is_empty());
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 1000.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        let id = store.invoices[0].id.clone();

        store
            .update(
                &id,
                InvoicePatch {
                    client_name: Some("Canary Wharf Mgmt".to_string()),
                    ..InvoicePatch::default()
                },
            )
            .unwrap();

        let inv = store.get(&id).unwrap();
        assert_eq!(inv.client_name, "Canary Wharf Mgmt");
        assert_eq!(inv.invoice_number, "INV-001");
        assert_eq!(inv.amount, 1000.0);
        assert_eq!(inv.due_date, day(20));
    }

    #[test]
    fn update_deep_merges_email_overrides() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 1000.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        let id = store.invoices[0].id.clone();

        store
            .update(
                &id,
                InvoicePatch {
                    email_overrides: Some(EmailOverrides {
                        stage1: Some("Gentle nudge".to_string()),
                        ..EmailOverrides::default()
                    }),
                    ..InvoicePatch::default()
                },
            )
            .unwrap();
        store
            .update(
                &id,
                InvoicePatch {
                    email_overrides: Some(EmailOverrides {
                        stage3: Some("Final notice".to_string()),
                        ..EmailOverrides::default()
                    }),
                    ..InvoicePatch::default()
                },
            )
            .unwrap();

        let overrides = &store.get(&id).unwrap().email_overrides;
        assert_eq!(overrides.stage1.as_deref(), Some("Gentle nudge"));
        assert_eq!(overrides.stage3.as_deref(), Some("Final notice"));
    }

    #[test]
    fn delete_removes_or_reports_not_found() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 100.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        let id = store.invoices[0].id.clone();

        store.delete(&id).unwrap();
        assert!(store.invoices.is_empty());
        assert!(matches!(
            store.delete(&id),
            Err(CashbuildError::InvoiceNotFound(_))
        ));
    }

    #[test]
    fn add_variation_appends_in_order() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 1000.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        let id = store.invoices[0].id.clone();

        store
            .add_variation(&id, "Additional lighting", 250.0, day(2))
            .unwrap();
        store
            .add_variation(&id, "Weekend overtime", 120.0, day(3))
            .unwrap();

        let inv = store.get(&id).unwrap();
        assert_eq!(inv.variations.len(), 2);
        assert_eq!(inv.variations[0].description, "Additional lighting");
        assert_eq!(inv.variations[1].description, "Weekend overtime");
        assert_eq!(inv.gross_total(), 1370.0);
        assert_ne!(inv.variations[0].id, inv.variations[1].id);
    }

    #[test]
    fn set_retention_updates_terms() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 1000.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        let id = store.invoices[0].id.clone();

        store.set_retention(&id, 5.0, Some(day(28))).unwrap();
        let inv = store.get(&id).unwrap();
        assert_eq!(inv.retention_percentage, 5.0);
        assert_eq!(inv.retention_release_date, Some(day(28)));
        assert_eq!(inv.retention_amount(), 50.0);
    }

    #[test]
    fn five_days_overdue_scenario() {
        let mut store = Store::default();
        let now = day(15);
        let mut d = draft("INV-001", 1000.0, day(10));
        d.retention_percentage = Some(5.0);

        store.create(d, ReminderFrequency::Weekly, now).unwrap();
        let inv = &store.invoices[0];

        assert_eq!(inv.status, InvoiceStatus::Overdue);
        assert_eq!(inv.gross_total(), 1000.0);
        assert_eq!(inv.retention_amount(), 50.0);
        assert_eq!(inv.net_payable(), 950.0);
        assert_eq!(inv.days_overdue_at(now), 5);
    }

    #[test]
    fn store_roundtrips_through_toml() {
        let mut store = Store::default();
        store
            .create(draft("INV-001", 1000.0, day(20)), ReminderFrequency::Weekly, day(1))
            .unwrap();
        let id = store.invoices[0].id.clone();
        store
            .add_variation(&id, "Additional lighting", 250.0, day(2))
            .unwrap();

        let text = toml::to_string_pretty(&store).unwrap();
        let restored: Store = toml::from_str(&text).unwrap();
        assert_eq!(restored.invoices.len(), 1);
        assert_eq!(restored.invoices[0].invoice_number, "INV-001");
        assert_eq!(restored.invoices[0].gross_total(), 1250.0);
        assert_eq!(restored.invoices[0].due_date, day(20));
    }
}
