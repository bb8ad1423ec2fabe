//! Service layer for signup, profile lookup and actor resolution.

use crate::context::{Actor, ActorContext, MissingActor};
use crate::user::{
    domain::{Email, PasswordHash, Role, User, UserDomainError, UserId, Username},
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for creating a user account.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupRequest {
    email: String,
    username: String,
    password: String,
    role: Role,
}

impl SignupRequest {
    /// Creates a staff signup request.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            role: Role::Staff,
        }
    }

    /// Sets the requested role.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Service-level errors for account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// The email address is already registered.
    #[error("Email has already been used")]
    EmailTaken,
    /// No authenticated actor is bound to the request.
    #[error(transparent)]
    Unauthenticated(#[from] MissingActor),
    /// The actor lacks the role required for the operation.
    #[error("{0}")]
    Forbidden(&'static str),
    /// The user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(UserRepositoryError),
}

impl From<UserRepositoryError> for AccountError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::DuplicateEmail(_) => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

/// Result type for account service operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Account orchestration service.
pub struct AccountService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for AccountService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> AccountService<R, C>
where
    R: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new account service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Registers a new user account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Domain`] for invalid input and
    /// [`AccountError::EmailTaken`] when the email is already registered.
    pub async fn signup(&self, request: SignupRequest) -> AccountResult<User> {
        let email = Email::new(request.email)?;
        let username = Username::new(request.username)?;
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let password_hash = PasswordHash::from_plaintext(&request.password)?;
        let user = User::new(email, username, request.role, password_hash, &*self.clock);
        self.repository.store(&user).await?;

        info!(
            event = "user.signup",
            user_id = %user.id(),
            role = %user.role(),
            "User created"
        );
        Ok(user)
    }

    /// Resolves an authenticated user identifier into an [`Actor`].
    ///
    /// Returns `Ok(None)` when the identifier does not match an account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Repository`] when lookup fails.
    pub async fn resolve_actor(&self, id: UserId) -> AccountResult<Option<Actor>> {
        let user = self.repository.find_by_id(id).await?;
        Ok(user.as_ref().map(Actor::from_user))
    }

    /// Returns the acting user's own account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Unauthenticated`] without an actor and
    /// [`AccountError::NotFound`] when the account has disappeared.
    pub async fn profile(&self, context: &ActorContext) -> AccountResult<User> {
        let actor = context.require_actor()?;
        self.repository
            .find_by_id(actor.id())
            .await?
            .ok_or(AccountError::NotFound(actor.id()))
    }

    /// Lists every account; admin only.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Forbidden`] for staff actors.
    pub async fn list_users(&self, context: &ActorContext) -> AccountResult<Vec<User>> {
        let actor = context.require_actor()?;
        if !actor.is_admin() {
            return Err(AccountError::Forbidden("Only admin users can list users."));
        }
        Ok(self.repository.list_all().await?)
    }
}
