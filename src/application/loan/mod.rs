mod availability;
mod errors;
mod loan_service;

pub use availability::{
    LoanDetails, count_active_loans, list_available_books, list_book_availability,
    list_loans_with_details, list_members_with_loans,
};
pub use errors::{LoanApplicationError, Result};
pub use loan_service::{ReturnReceipt, borrow_book, return_book};
