//! Invoicing domain module.
//!
//! Invoice data as the document renderer consumes it: parties, billable line
//! items, derived totals, VAT breakdown and the print pagination of line items.
//! Pure domain logic (no IO, no templates, no compiler).

pub mod invoice;
pub mod line_item;
pub mod pagination;
pub mod party;

pub use invoice::{DEFAULT_PAYMENT_WITHIN_DAYS, DEFAULT_TITLE, Invoice, InvoiceDraft};
pub use line_item::LineItem;
pub use pagination::paginate;
pub use party::{Address, BankDetails, Customer, Issuer};
