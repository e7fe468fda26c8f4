//! User identity types.

use serde::{Deserialize, Serialize};

use digivault_core::{Email, UserId};

/// The authenticated user as reported by the session service.
///
/// Minimal identity data; profile details live behind the catalog/session
/// collaborators and are not needed by the purchase pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's ID in the marketplace.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_serde() {
        let user = CurrentUser {
            id: UserId::new(7),
            email: Email::parse("buyer@example.com").unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "buyer@example.com");
    }
}
