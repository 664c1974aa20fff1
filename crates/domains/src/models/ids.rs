//! Typed identifiers.
//!
//! Every entity and embedded child record carries its own id type so a
//! `CommentId` can never be passed where an `ApplicationId` is expected.
//! Ids are UUID v7 (time-ordered) and are generated explicitly when the
//! record is created, never by the storage backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh, time-ordered id.
            pub fn generate() -> Self {
                Self(Uuid::now_v7())
            }

            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifies a [`crate::User`].
    UserId
);
entity_id!(
    /// Identifies a [`crate::Pet`].
    PetId
);
entity_id!(
    /// Identifies a [`crate::Post`].
    PostId
);
entity_id!(
    /// Identifies an adoption application, scoped to its pet.
    ApplicationId
);
entity_id!(
    /// Identifies a comment, scoped to its post.
    CommentId
);
entity_id!(
    /// Identifies a reply, scoped to its comment.
    ReplyId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_strings() {
        let id = PetId::generate();
        let parsed: PetId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = UserId::generate();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }
}
