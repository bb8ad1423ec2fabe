//! Application services for user accounts.

mod accounts;

pub use accounts::{AccountError, AccountResult, AccountService, SignupRequest};
