mod invoice;

pub use invoice::{
    Invoice, InvoiceFilter, InvoiceForm, InvoicePatch, MaterialStatus, NewInvoice,
    ValidatedInvoice, DEFAULT_DAYS_TO_FIRST, DEFAULT_INTERVAL_DAYS, MAX_INSTALLMENTS,
};
