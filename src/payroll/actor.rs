use serde::{Deserialize, Serialize};

use crate::entity::sea_orm_active_enums::RoleType;

use super::error::WorkflowError;

/// The authenticated identity performing an operation, supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub display_name: String,
    pub role: RoleType,
}

impl Actor {
    /// Capability check used at every workflow entry point.
    ///
    /// Roles are matched exactly, `SUPER_ADMIN` does not stand in for either side of the protocol.
    pub fn require(&self, role: RoleType) -> Result<&Self, WorkflowError> {
        if self.role != role {
            return Err(WorkflowError::Forbidden {
                required: role,
                actual: self.role,
            });
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_exact_role() {
        let admin = Actor { id: 1, display_name: "Awa".to_string(), role: RoleType::Admin };
        let super_admin = Actor { id: 2, display_name: "Moussa".to_string(), role: RoleType::SuperAdmin };

        assert!(admin.require(RoleType::Admin).is_ok());
        assert!(matches!(
            admin.require(RoleType::Caissier),
            Err(WorkflowError::Forbidden { required: RoleType::Caissier, actual: RoleType::Admin })
        ));
        assert!(super_admin.require(RoleType::Admin).is_err());
    }
}
