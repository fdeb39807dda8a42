//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JWT claims for access tokens.
///
/// Carries everything the admin endpoints need for authorization, so a
/// request with a valid token never re-reads roles from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    pub username: String,
    pub email: String,
    /// Active role IDs at sign-in time
    pub role_ids: Vec<Uuid>,
    /// Permission codes granted through active roles
    pub permissions: Vec<String>,
    pub is_super_admin: bool,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// Super admins pass every permission check.
    pub fn has_permission(&self, code: &str) -> bool {
        self.is_super_admin || self.permissions.iter().any(|p| p == code)
    }

    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(is_super_admin: bool, permissions: &[&str]) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            username: "registrar".to_string(),
            email: "registrar@example.com".to_string(),
            role_ids: vec![],
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            is_super_admin,
            exp: 1234567890,
            iat: 1234567800,
        }
    }

    #[test]
    fn test_claims_serialize() {
        let claims = claims(false, &["users:read"]);
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""username":"registrar""#));
        assert!(serialized.contains(r#""is_super_admin":false"#));
    }

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"user-id-456","username":"bob","email":"bob@test.com","role_ids":[],"permissions":[],"is_super_admin":true,"exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "user-id-456");
        assert!(claims.is_super_admin);
        assert_eq!(claims.exp, 9999999999);
        assert!(claims.user_id().is_none());
    }

    #[test]
    fn test_has_permission() {
        let claims = claims(false, &["users:read", "roles:read"]);
        assert!(claims.has_permission("roles:read"));
        assert!(!claims.has_permission("users:delete"));
    }

    #[test]
    fn test_super_admin_bypasses_permission_checks() {
        assert!(claims(true, &[]).has_permission("users:delete"));
    }
}
