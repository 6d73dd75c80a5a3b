pub mod calculations;
pub mod db;
pub mod draft;
pub mod line_items;
pub mod models;
pub mod queries;
pub mod session;

pub use db::repository::{RepositoryError, SalesRepository};
pub use draft::{InvoiceDraft, SaveError};
pub use line_items::{DuplicateLineId, LineItemStore, MAX_LINE_QUANTITY, QuantityUpdate};
pub use models::*;
pub use session::{SaleSession, SessionError};
