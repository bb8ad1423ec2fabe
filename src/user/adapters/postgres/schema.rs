//! Diesel schema for user persistence.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Normalised login email, unique.
        #[max_length = 80]
        email -> Varchar,
        /// Display name.
        #[max_length = 45]
        username -> Varchar,
        /// Authorisation role.
        #[max_length = 10]
        role -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
