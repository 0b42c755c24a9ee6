mod errors;
mod member_service;

pub use errors::{MembershipError, Result};
pub use member_service::{
    LoginSession, Registration, TokenPair, get_profile, list_members, login, refresh_token,
    register_member,
};
