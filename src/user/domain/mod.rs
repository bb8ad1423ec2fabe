//! Domain model for user accounts.

mod error;
mod ids;
mod user;

pub use error::{ParseRoleError, UserDomainError};
pub use ids::{Email, UserId, Username};
pub use user::{PasswordHash, PersistedUserData, Role, User};
