mod business_settings;
mod customer;
mod invoice;
mod line_item;
mod product;
mod tax_rate;

pub use business_settings::{BusinessSettings, Currency, Language};
pub use customer::{Customer, CustomerType};
pub use invoice::{InvoiceLine, InvoiceNumber, InvoiceSummary, PaymentMethod, StoredInvoice};
pub use line_item::{LineId, LineItem, ProductRef};
pub use product::{Product, StockStatus};
pub use tax_rate::{InvalidTaxRate, TaxRate};
