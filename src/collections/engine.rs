use chrono::{DateTime, Utc};

use crate::collections::notify::{Dispatcher, ReminderPayload, SchedulePayload};
use crate::config::{Company, User};
use crate::error::{CashbuildError, Result};
use crate::ledger::{Invoice, InvoiceStatus, ReminderFrequency};

/// Escalation stage for a clamped days-overdue count.
///
/// | days overdue | stage |
/// |---|---|
/// | 0 | 0 (on track) |
/// | 1-7 | 1 (polite) |
/// | 8-14 | 2 (firm) |
/// | 15+ | 3 (legal) |
pub fn stage_for(days_overdue: i64) -> u8 {
    match days_overdue {
        d if d <= 0 => 0,
        1..=7 => 1,
        8..=14 => 2,
        _ => 3,
    }
}

/// The stage a reader should see right now. Derived from the due date on
/// every read; the stored `reminder_stage` is advisory history.
pub fn current_stage(invoice: &Invoice, now: DateTime<Utc>) -> u8 {
    stage_for(invoice.days_overdue_at(now))
}

/// Settle the invoice. Terminal for collections purposes: chasing stops and
/// the escalation history is cleared. Retention stays open regardless.
/// Idempotent.
pub fn mark_paid(invoice: &mut Invoice) {
    invoice.status = InvoiceStatus::Paid;
    invoice.reminder_frequency = ReminderFrequency::Disabled;
    invoice.reminder_stage = 0;
}

/// Stop automated chasing. The stored stage is preserved for audit and the
/// derived stage keeps advancing with the calendar.
pub fn pause(invoice: &mut Invoice) {
    invoice.reminder_frequency = ReminderFrequency::Disabled;
}

/// Change the cadence without touching the automation engine.
pub fn set_frequency(invoice: &mut Invoice, frequency: ReminderFrequency) {
    invoice.reminder_frequency = frequency;
}

/// Start automated chasing at the given cadence and notify the external
/// automation engine.
///
/// The local cadence change commits unconditionally; delivery failure is
/// absorbed by the dispatcher. The stored stage is left untouched.
pub fn activate(
    invoice: &mut Invoice,
    frequency: ReminderFrequency,
    dispatcher: &dyn Dispatcher,
    now: DateTime<Utc>,
) {
    let payload = SchedulePayload::new(invoice, now);
    invoice.reminder_frequency = frequency;
    dispatcher.activate_schedule(&payload);
}

/// Send one reminder immediately.
///
/// Rejected before any side effect when the invoice is already paid. On any
/// delivery outcome the local audit trail (`last_reminder_sent`) is updated;
/// transport failure never surfaces to the caller. Returns the clamped
/// days-overdue count that was dispatched.
pub fn send_reminder_now(
    invoice: &mut Invoice,
    user: &User,
    company: &Company,
    dispatcher: &dyn Dispatcher,
    now: DateTime<Utc>,
) -> Result<i64> {
    if invoice.status == InvoiceStatus::Paid {
        return Err(CashbuildError::AlreadyPaid(invoice.invoice_number.clone()));
    }

    let days_overdue = invoice.days_overdue_at(now);
    let payload = ReminderPayload::new(invoice, user, company, days_overdue, now);
    dispatcher.send_reminder(&payload);
    invoice.last_reminder_sent = Some(now);

    Ok(days_overdue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use chrono::TimeZone;

    use crate::collections::notify::DispatchOutcome;
    use crate::ledger::EmailOverrides;

    /// Records dispatch attempts and answers with a fixed outcome.
    struct RecordingDispatcher {
        outcome: DispatchOutcome,
        reminders: RefCell<Vec<i64>>,
        activations: RefCell<usize>,
    }

    impl RecordingDispatcher {
        fn with_outcome(outcome: DispatchOutcome) -> Self {
            Self {
                outcome,
                reminders: RefCell::new(Vec::new()),
                activations: RefCell::new(0),
            }
        }
    }

    impl Dispatcher for RecordingDispatcher {
        fn send_reminder(&self, payload: &ReminderPayload) -> DispatchOutcome {
            self.reminders.borrow_mut().push(payload.data.days_overdue);
            self.outcome
        }

        fn activate_schedule(&self, _payload: &SchedulePayload) -> DispatchOutcome {
            *self.activations.borrow_mut() += 1;
            self.outcome
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 12, 0, 0).unwrap()
    }

    fn invoice(due: DateTime<Utc>) -> Invoice {
        Invoice {
            id: "inv_test".to_string(),
            invoice_number: "INV-2026-001".to_string(),
            client_name: "Apex Interiors Ltd".to_string(),
            client_email: None,
            project_name: "Regent Street Refurb".to_string(),
            amount: 1000.0,
            due_date: due,
            status: InvoiceStatus::Unpaid,
            retention_percentage: 0.0,
            retention_release_date: None,
            reminder_frequency: ReminderFrequency::Weekly,
            reminder_stage: 0,
            last_reminder_sent: None,
            next_scheduled_reminder: None,
            email_overrides: EmailOverrides::default(),
            variations: Vec::new(),
        }
    }

    fn operator() -> (User, Company) {
        (
            User {
                id: "usr_1".to_string(),
                name: "James Sterling".to_string(),
                email: "james@sterling-construct.co.uk".to_string(),
                phone: None,
                role: "admin".to_string(),
            },
            Company {
                id: "cmp_1".to_string(),
                name: "Sterling Fit-Outs Ltd".to_string(),
            },
        )
    }

    #[test]
    fn stage_banding_boundaries() {
        assert_eq!(stage_for(0), 0);
        assert_eq!(stage_for(1), 1);
        assert_eq!(stage_for(7), 1);
        assert_eq!(stage_for(8), 2);
        assert_eq!(stage_for(14), 2);
        assert_eq!(stage_for(15), 3);
        assert_eq!(stage_for(120), 3);
        assert_eq!(stage_for(-3), 0);
    }

    #[test]
    fn mark_paid_is_idempotent() {
        let mut inv = invoice(day(1));
        inv.reminder_stage = 2;

        mark_paid(&mut inv);
        mark_paid(&mut inv);

        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(inv.reminder_frequency, ReminderFrequency::Disabled);
        assert_eq!(inv.reminder_stage, 0);
    }

    #[test]
    fn pause_preserves_the_stored_stage() {
        let mut inv = invoice(day(1));
        inv.reminder_stage = 2;
        inv.reminder_frequency = ReminderFrequency::Daily;

        pause(&mut inv);

        assert_eq!(inv.reminder_frequency, ReminderFrequency::Disabled);
        assert_eq!(inv.reminder_stage, 2);
    }

    #[test]
    fn pause_then_activate_restores_cadence_without_touching_stage() {
        let dispatcher = RecordingDispatcher::with_outcome(DispatchOutcome::Delivered);
        let mut inv = invoice(day(1));
        inv.reminder_stage = 3;

        pause(&mut inv);
        activate(&mut inv, ReminderFrequency::Weekly, &dispatcher, day(20));

        assert_eq!(inv.reminder_frequency, ReminderFrequency::Weekly);
        assert_eq!(inv.reminder_stage, 3);
        assert_eq!(*dispatcher.activations.borrow(), 1);
    }

    #[test]
    fn activate_commits_locally_even_when_delivery_fails() {
        let dispatcher = RecordingDispatcher::with_outcome(DispatchOutcome::Failed);
        let mut inv = invoice(day(1));
        pause(&mut inv);

        activate(&mut inv, ReminderFrequency::Daily, &dispatcher, day(20));

        assert_eq!(inv.reminder_frequency, ReminderFrequency::Daily);
        assert_eq!(*dispatcher.activations.borrow(), 1);
    }

    #[test]
    fn reminder_records_audit_trail_on_delivery_failure() {
        let dispatcher = RecordingDispatcher::with_outcome(DispatchOutcome::Failed);
        let (user, company) = operator();
        let mut inv = invoice(day(1));
        let now = day(6);

        let days = send_reminder_now(&mut inv, &user, &company, &dispatcher, now).unwrap();

        assert_eq!(days, 5);
        assert_eq!(inv.last_reminder_sent, Some(now));
        assert_eq!(dispatcher.reminders.borrow().as_slice(), &[5]);
    }

    #[test]
    fn reminder_clamps_days_for_not_yet_due_invoices() {
        let dispatcher = RecordingDispatcher::with_outcome(DispatchOutcome::Delivered);
        let (user, company) = operator();
        let mut inv = invoice(day(20));

        let days = send_reminder_now(&mut inv, &user, &company, &dispatcher, day(10)).unwrap();

        assert_eq!(days, 0);
        assert_eq!(dispatcher.reminders.borrow().as_slice(), &[0]);
    }

    #[test]
    fn reminder_for_paid_invoice_is_rejected_before_dispatch() {
        let dispatcher = RecordingDispatcher::with_outcome(DispatchOutcome::Delivered);
        let (user, company) = operator();
        let mut inv = invoice(day(1));
        mark_paid(&mut inv);

        let err = send_reminder_now(&mut inv, &user, &company, &dispatcher, day(10)).unwrap_err();

        assert!(matches!(err, CashbuildError::AlreadyPaid(_)));
        assert!(dispatcher.reminders.borrow().is_empty());
        assert_eq!(inv.last_reminder_sent, None);
    }

    #[test]
    fn derived_stage_tracks_the_calendar_not_the_stored_field() {
        let mut inv = invoice(day(10));
        inv.reminder_stage = 1;

        assert_eq!(current_stage(&inv, day(5)), 0);
        assert_eq!(current_stage(&inv, day(13)), 1);
        assert_eq!(current_stage(&inv, day(20)), 2);
        assert_eq!(current_stage(&inv, day(26)), 3);
        assert_eq!(inv.reminder_stage, 1);
    }
}
