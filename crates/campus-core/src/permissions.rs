//! Permission codes checked by the identity service's admin endpoints.
//!
//! Codes follow the `module:action` convention. Super-admin accounts bypass
//! these checks entirely.

// =============================================================================
// Users permissions
// =============================================================================

/// Permission to read account profiles
pub const USERS_READ: &str = "users:read";
/// Permission to change an account's status (active, inactive, blocked)
pub const USERS_UPDATE_STATUS: &str = "users:update_status";
/// Permission to soft-delete accounts
pub const USERS_DELETE: &str = "users:delete";

// =============================================================================
// Roles permissions
// =============================================================================

/// Permission to create roles
pub const ROLES_CREATE: &str = "roles:create";
/// Permission to read roles
pub const ROLES_READ: &str = "roles:read";
/// Permission to grant permissions to roles
pub const ROLES_UPDATE: &str = "roles:update";
/// Permission to assign roles to users
pub const ROLES_ASSIGN: &str = "roles:assign";

// =============================================================================
// Permissions permissions
// =============================================================================

/// Permission to register new permission codes
pub const PERMISSIONS_CREATE: &str = "permissions:create";

/// Every code above, in declaration order.
pub fn all() -> Vec<&'static str> {
    vec![
        USERS_READ,
        USERS_UPDATE_STATUS,
        USERS_DELETE,
        ROLES_CREATE,
        ROLES_READ,
        ROLES_UPDATE,
        ROLES_ASSIGN,
        PERMISSIONS_CREATE,
    ]
}

/// Module tag of a code, i.e. the part before the colon.
pub fn module_of(code: &str) -> &str {
    code.split(':').next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let codes = all();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len());
    }

    #[test]
    fn test_module_of() {
        assert_eq!(module_of(USERS_DELETE), "users");
        assert_eq!(module_of(ROLES_ASSIGN), "roles");
        assert_eq!(module_of("plain"), "plain");
    }
}
