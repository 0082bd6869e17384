use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::common::EntityMetadata;

crate::uuid_aggregate_id!(
    /// Identifier of a user record
    UserId
);

// ============================================================================
// Role
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Parent,
    SchoolAdmin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
            Role::SchoolAdmin => "school_admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Roles a school admin may create; these count against the account quota
    pub fn is_provisionable(&self) -> bool {
        match self {
            Role::Student | Role::Teacher | Role::Parent => true,
            Role::SchoolAdmin | Role::SuperAdmin => false,
        }
    }

    /// Local-part prefix used when a student is added without an email
    pub fn placeholder_prefix(&self) -> &'static str {
        match self {
            Role::Student => "siswa",
            Role::Teacher => "guru",
            Role::Parent => "ortu",
            Role::SchoolAdmin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    /// Indonesian label for messages shown in the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Siswa",
            Role::Teacher => "Guru",
            Role::Parent => "Orang Tua",
            Role::SchoolAdmin => "Admin Sekolah",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            "school_admin" => Ok(Role::SchoolAdmin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(format!("Unknown role: '{}'", other)),
        }
    }
}

// ============================================================================
// Role-specific profile
// ============================================================================

/// Fields that only make sense for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Profile {
    Student {
        nis: Option<String>,
        #[serde(rename = "parentEmail")]
        parent_email: Option<String>,
    },
    Teacher {
        nip: Option<String>,
    },
    Parent {
        phone: Option<String>,
        #[serde(rename = "childNis")]
        child_nis: Option<String>,
    },
    SchoolAdmin,
    SuperAdmin,
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Student { .. } => Role::Student,
            Profile::Teacher { .. } => Role::Teacher,
            Profile::Parent { .. } => Role::Parent,
            Profile::SchoolAdmin => Role::SchoolAdmin,
            Profile::SuperAdmin => Role::SuperAdmin,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    /// None only for super admins
    pub school_name: Option<String>,
    pub name: String,
    pub email: String,
    /// Class name for students (enrolled class) and teachers (homeroom)
    pub class_ref: Option<String>,
    pub profile: Profile,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl UserRecord {
    pub fn new_for_insert(
        school_name: Option<String>,
        name: String,
        email: String,
        class_ref: Option<String>,
        profile: Profile,
    ) -> Self {
        Self {
            id: UserId::new_v4(),
            school_name,
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            class_ref: class_ref
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            profile,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Name must not be empty".into());
        }
        if !self.email.contains('@') {
            return Err("Invalid email format".into());
        }
        match self.role() {
            Role::Student | Role::Teacher => {}
            Role::Parent | Role::SchoolAdmin | Role::SuperAdmin => {
                if self.class_ref.is_some() {
                    return Err(format!("Role {} cannot reference a class", self.role()));
                }
            }
        }
        match self.role() {
            Role::SuperAdmin => {
                if self.school_name.is_some() {
                    return Err("Super admin does not belong to a school".into());
                }
            }
            _ => {
                if self.school_name.is_none() {
                    return Err("User must belong to a school".into());
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Dashboard form for adding a student, teacher or parent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    pub role: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub class_ref: Option<String>,
    #[serde(default)]
    pub nis: Option<String>,
    #[serde(default)]
    pub parent_email: Option<String>,
    #[serde(default)]
    pub nip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub child_nis: Option<String>,
}

impl CreateUserDto {
    /// Builds the profile for `role`, dropping fields that belong to other roles
    pub fn profile_for(&self, role: Role) -> Profile {
        fn clean(v: &Option<String>) -> Option<String> {
            v.as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        match role {
            Role::Student => Profile::Student {
                nis: clean(&self.nis),
                parent_email: clean(&self.parent_email),
            },
            Role::Teacher => Profile::Teacher {
                nip: clean(&self.nip),
            },
            Role::Parent => Profile::Parent {
                phone: clean(&self.phone),
                child_nis: clean(&self.child_nis),
            },
            Role::SchoolAdmin => Profile::SchoolAdmin,
            Role::SuperAdmin => Profile::SuperAdmin,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in [
            Role::Student,
            Role::Teacher,
            Role::Parent,
            Role::SchoolAdmin,
            Role::SuperAdmin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
        assert!("child".parse::<Role>().is_err());
        assert!("Teacher".parse::<Role>().is_err());
    }

    #[test]
    fn test_only_members_are_provisionable() {
        assert!(Role::Student.is_provisionable());
        assert!(Role::Teacher.is_provisionable());
        assert!(Role::Parent.is_provisionable());
        assert!(!Role::SchoolAdmin.is_provisionable());
        assert!(!Role::SuperAdmin.is_provisionable());
    }

    #[test]
    fn test_profile_for_drops_foreign_fields() {
        let dto = CreateUserDto {
            role: "parent".into(),
            name: "Ibu Sari".into(),
            nis: Some("123".into()),
            phone: Some(" 0812 ".into()),
            child_nis: Some("".into()),
            ..Default::default()
        };
        assert_eq!(
            dto.profile_for(Role::Parent),
            Profile::Parent {
                phone: Some("0812".into()),
                child_nis: None
            }
        );
    }

    #[test]
    fn test_parent_cannot_reference_class() {
        let user = UserRecord::new_for_insert(
            Some("SD 1".into()),
            "Pak Budi".into(),
            "budi@ortu.id".into(),
            Some("1A".into()),
            Profile::Parent {
                phone: None,
                child_nis: None,
            },
        );
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_blank_class_ref_is_none() {
        let user = UserRecord::new_for_insert(
            Some("SD 1".into()),
            "Ani".into(),
            "ANI@Siswa.id".into(),
            Some("  ".into()),
            Profile::Student {
                nis: None,
                parent_email: None,
            },
        );
        assert_eq!(user.class_ref, None);
        assert_eq!(user.email, "ani@siswa.id");
        assert!(user.validate().is_ok());
    }
}
