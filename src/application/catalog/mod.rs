mod book_service;
mod errors;

pub use book_service::{
    BookInput, create_book, delete_book, get_book_by_code, list_books, update_book, update_stock,
};
pub use errors::{CatalogError, Result};
