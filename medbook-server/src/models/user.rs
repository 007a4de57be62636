//! Users and their sessions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entity;

entity! {
    /// An account; the password hash is accepted on create and patch but never
    /// serialized, filtered on or overwritten by a full update
    User as "user" in "users",
    id: Uuid => Uuid (Client) {
        first_name: String => Text,
        last_name: String => Text,
        email: String => Text,
        #[serde(skip_serializing, default)]
        password_hash: String => Text [write_only],
        phone_number: Option<String> => Text,
        role: String => Text,
        is_verified: bool => Boolean,
    }
}

entity! {
    Session as "session" in "sessions",
    id: Uuid => Uuid (Client) {
        user_id: Uuid => Uuid,
        ip_address: Option<String> => Text,
        user_agent: Option<String> => Text,
        is_active: bool => Boolean,
        expires_at: DateTime<Utc> => Timestamp,
    }
}
