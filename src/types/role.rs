use std::fmt;

use serde::{Deserialize, Serialize};

/// RoleName is the typed form of the seeded role reference data.
/// SuperAdmin > Admin > User: admins manage users/sections/shifts,
/// only superadmins may delete reference data or reassign roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleName {
    SuperAdmin,
    Admin,
    User,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::SuperAdmin, RoleName::Admin, RoleName::User];

    /// Converts a stored role name to its typed value.
    pub fn parse(s: &str) -> Option<RoleName> {
        match s {
            "SuperAdmin" => Some(RoleName::SuperAdmin),
            "Admin" => Some(RoleName::Admin),
            "User" => Some(RoleName::User),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleName::SuperAdmin => "SuperAdmin",
            RoleName::Admin => "Admin",
            RoleName::User => "User",
        }
    }

    /// Returns true for roles allowed on Admin-gated routes.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, RoleName::SuperAdmin | RoleName::Admin)
    }

    /// Returns true for roles allowed on SuperAdmin-gated routes.
    #[must_use]
    pub const fn is_super_admin(self) -> bool {
        matches!(self, RoleName::SuperAdmin)
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(RoleName::parse("SuperAdmin"), Some(RoleName::SuperAdmin));
        assert_eq!(RoleName::parse("Admin"), Some(RoleName::Admin));
        assert_eq!(RoleName::parse("User"), Some(RoleName::User));
        assert_eq!(RoleName::parse("user"), None);
        assert_eq!(RoleName::parse(""), None);
    }

    #[test]
    fn test_role_gating() {
        assert!(RoleName::SuperAdmin.is_admin());
        assert!(RoleName::Admin.is_admin());
        assert!(!RoleName::User.is_admin());

        assert!(RoleName::SuperAdmin.is_super_admin());
        assert!(!RoleName::Admin.is_super_admin());
    }
}
