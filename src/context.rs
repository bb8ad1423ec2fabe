//! Per-request actor context.
//!
//! Services never look up "the current user" from shared state. Instead the
//! request boundary builds an [`ActorContext`] and passes it by reference to
//! every service call. The context is owned by the request, so concurrent
//! requests cannot observe each other's actor, and dropping it at the end of
//! the request clears it on every exit path.

use crate::user::domain::{Role, User, UserId, Username};
use thiserror::Error;
use uuid::Uuid;

/// Authenticated user attributed as the author of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    username: Username,
    role: Role,
}

impl Actor {
    /// Creates an actor from its parts.
    #[must_use]
    pub const fn new(id: UserId, username: Username, role: Role) -> Self {
        Self { id, username, role }
    }

    /// Creates an actor from a stored user account.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self::new(user.id(), user.username().clone(), user.role())
    }

    /// Returns the actor's user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the actor's display name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` when the actor holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Returned when an operation requires an authenticated actor.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("authentication credentials were not provided")]
pub struct MissingActor;

/// Request-scoped context carrying the acting user.
///
/// # Example
///
/// ```
/// use tasktrail::context::{Actor, ActorContext};
/// use tasktrail::user::domain::{Role, UserId, Username};
///
/// let actor = Actor::new(UserId::new(), Username::new("ada").expect("valid"), Role::Admin);
/// let mut context = ActorContext::empty().with_actor(actor.clone());
/// assert_eq!(context.actor(), Some(&actor));
///
/// context.clear();
/// assert!(context.actor().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorContext {
    actor: Option<Actor>,
    correlation_id: Option<Uuid>,
}

impl ActorContext {
    /// Creates a context with no actor and no correlation identifier.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            actor: None,
            correlation_id: None,
        }
    }

    /// Binds the acting user to this context.
    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Sets the correlation identifier used in log events.
    #[must_use]
    pub const fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Returns the bound actor, if any.
    #[must_use]
    pub const fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Returns the bound actor's identifier, if any.
    #[must_use]
    pub fn actor_id(&self) -> Option<UserId> {
        self.actor.as_ref().map(Actor::id)
    }

    /// Returns the bound actor or [`MissingActor`].
    ///
    /// # Errors
    ///
    /// Returns [`MissingActor`] when no actor is bound.
    pub fn require_actor(&self) -> Result<&Actor, MissingActor> {
        self.actor.as_ref().ok_or(MissingActor)
    }

    /// Returns the correlation identifier, if any.
    #[must_use]
    pub const fn correlation_id(&self) -> Option<Uuid> {
        self.correlation_id
    }

    /// Removes the bound actor and correlation identifier.
    pub fn clear(&mut self) {
        self.actor = None;
        self.correlation_id = None;
    }
}
