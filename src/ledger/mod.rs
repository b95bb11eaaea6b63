mod invoice;
mod store;

pub use invoice::{
    EmailOverrides, Invoice, InvoiceStatus, ReminderFrequency, Variation,
};
pub use store::{InvoiceDraft, InvoicePatch, Store};
