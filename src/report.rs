use chrono::{DateTime, Utc};

use crate::ledger::{Invoice, InvoiceStatus};
use crate::money::round_currency;

/// Headline cashflow numbers across the whole ledger.
///
/// Money buckets fold over gross totals with statuses reconciled at read
/// time, so an invoice whose due date passed since the last write counts as
/// overdue here without anything touching the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashflowSummary {
    pub total_invoiced: f64,
    pub paid_to_date: f64,
    pub outstanding: f64,
    pub overdue: f64,
    pub invoice_count: usize,
    pub active_reminder_count: usize,
}

pub fn cashflow_summary(invoices: &[Invoice], now: DateTime<Utc>) -> CashflowSummary {
    let mut total_invoiced = 0.0;
    let mut paid_to_date = 0.0;
    let mut outstanding = 0.0;
    let mut overdue = 0.0;
    let mut active_reminder_count = 0;

    for invoice in invoices {
        let gross = invoice.gross_total();
        total_invoiced += gross;

        match invoice.reconciled_status(now) {
            InvoiceStatus::Paid => paid_to_date += gross,
            InvoiceStatus::Unpaid => outstanding += gross,
            InvoiceStatus::Overdue => {
                outstanding += gross;
                overdue += gross;
            }
        }

        if invoice.status != InvoiceStatus::Paid && invoice.reminder_frequency.is_active() {
            active_reminder_count += 1;
        }
    }

    CashflowSummary {
        total_invoiced: round_currency(total_invoiced),
        paid_to_date: round_currency(paid_to_date),
        outstanding: round_currency(outstanding),
        overdue: round_currency(overdue),
        invoice_count: invoices.len(),
        active_reminder_count,
    }
}
