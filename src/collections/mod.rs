mod engine;
mod notify;

pub use engine::{
    activate, current_stage, mark_paid, pause, send_reminder_now, set_frequency, stage_for,
};
pub use notify::{
    DispatchOutcome, Dispatcher, ReminderData, ReminderPayload, SchedulePayload,
    WebhookDispatcher,
};
