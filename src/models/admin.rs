use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Editor,
    #[default]
    Writer,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super admin",
            Role::Admin => "Admin",
            Role::Editor => "Editor",
            Role::Writer => "Writer",
        }
    }

    /// Taxonomy changes affect every brand page, so they are kept to admins.
    pub fn can_manage_sections(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    pub fn can_delete_content(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin | Role::Editor)
    }
}

/// The signed-in staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_snake_case() {
        let admin: Admin =
            serde_json::from_str(r#"{"name":"Ama","email":"ama@example.com","role":"super_admin"}"#)
                .unwrap();
        assert_eq!(admin.role, Role::SuperAdmin);
        assert!(admin.role.can_manage_sections());
        assert!(!Role::Writer.can_delete_content());
    }
}
