pub mod catalog;
mod dependencies;
mod error_kind;
pub mod loan;
pub mod membership;

pub use dependencies::ServiceDependencies;
pub use error_kind::ErrorKind;
