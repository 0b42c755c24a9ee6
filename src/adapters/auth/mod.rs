mod password;
mod token;

pub use password::Argon2Hasher;
pub use token::JwtIssuer;
