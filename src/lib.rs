pub mod collections;
pub mod config;
pub mod dates;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod retention;

pub use config::{Company, Config, User};
pub use error::{CashbuildError, Result};
pub use ledger::{
    EmailOverrides, Invoice, InvoiceDraft, InvoicePatch, InvoiceStatus, ReminderFrequency, Store,
    Variation,
};
