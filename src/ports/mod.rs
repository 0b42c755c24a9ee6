pub mod book_ledger;
pub mod credentials;
pub mod ledger_error;
pub mod loan_ledger;
pub mod member_ledger;
pub mod pagination;

pub use book_ledger::*;
pub use credentials::*;
pub use ledger_error::*;
pub use loan_ledger::*;
pub use member_ledger::*;
pub use pagination::*;
