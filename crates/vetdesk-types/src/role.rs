//! Collaborator roles and permissions
//!
//! Roles are stored as comma-separated text (`"admin,veterinarian"`).
//! [`RoleSet`] parses that text once, so call sites work with a typed set
//! and a fixed priority order instead of splitting strings themselves.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::VetDeskError;

/// Collaborator role.
///
/// Declaration order is priority order: `Owner` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Clinic owner, full control including billing
    Owner,
    /// Clinic administrator
    Admin,
    /// Veterinarian
    Veterinarian,
    /// Veterinary assistant / nurse
    Assistant,
    /// Front desk
    Receptionist,
}

/// Every role, highest priority first
pub const ALL_ROLES: [Role; 5] = [
    Role::Owner,
    Role::Admin,
    Role::Veterinarian,
    Role::Assistant,
    Role::Receptionist,
];

impl Role {
    /// Storage representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Veterinarian => "veterinarian",
            Self::Assistant => "assistant",
            Self::Receptionist => "receptionist",
        }
    }

    /// Permissions granted by this role
    pub const fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Self::Owner => &[
                ManageClinic,
                ManageBilling,
                ManageCollaborators,
                ManageInvoices,
                ManageAppointments,
                EditMedicalRecords,
                ViewRecords,
            ],
            Self::Admin => &[
                ManageCollaborators,
                ManageInvoices,
                ManageAppointments,
                EditMedicalRecords,
                ViewRecords,
            ],
            Self::Veterinarian => &[ManageAppointments, EditMedicalRecords, ViewRecords],
            Self::Assistant => &[ManageAppointments, ViewRecords],
            Self::Receptionist => &[ManageInvoices, ManageAppointments, ViewRecords],
        }
    }

    /// Whether this role grants a permission
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = VetDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" | "administrator" => Ok(Self::Admin),
            "veterinarian" | "vet" => Ok(Self::Veterinarian),
            "assistant" => Ok(Self::Assistant),
            "receptionist" => Ok(Self::Receptionist),
            _ => Err(VetDeskError::InvalidRole(s.to_string())),
        }
    }
}

/// Action a collaborator may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Edit clinic settings
    ManageClinic,
    /// Activate or change the subscription
    ManageBilling,
    /// Invite collaborators and assign roles
    ManageCollaborators,
    /// Issue invoices
    ManageInvoices,
    /// Book and edit appointments
    ManageAppointments,
    /// Write to animal medical records
    EditMedicalRecords,
    /// Read clients, animals and invoices
    ViewRecords,
}

impl Permission {
    /// Permission name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ManageClinic => "manage_clinic",
            Self::ManageBilling => "manage_billing",
            Self::ManageCollaborators => "manage_collaborators",
            Self::ManageInvoices => "manage_invoices",
            Self::ManageAppointments => "manage_appointments",
            Self::EditMedicalRecords => "edit_medical_records",
            Self::ViewRecords => "view_records",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of roles held by one collaborator in one clinic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Empty role set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse stored comma-separated role text.
    ///
    /// Tokens are trimmed and matched case-insensitively. Empty and unknown
    /// tokens are skipped so a stale role name never grants anything.
    pub fn parse(text: &str) -> Self {
        Self(
            text.split(',')
                .filter_map(|token| token.parse::<Role>().ok())
                .collect(),
        )
    }

    /// Parse role text, rejecting unknown role names
    pub fn parse_strict(text: &str) -> Result<Self, VetDeskError> {
        text.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse::<Role>)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Add a role
    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    /// Whether the set holds a role
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Whether no role is held
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Roles in priority order, highest first
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Highest-priority role, used when one role must be displayed or acted on
    pub fn effective_role(&self) -> Option<Role> {
        self.0.first().copied()
    }

    /// Whether any held role grants the permission
    pub fn can(&self, permission: Permission) -> bool {
        self.0.iter().any(|role| role.grants(permission))
    }

    /// Canonical storage text, priority order, no spaces
    pub fn to_storage(&self) -> String {
        self.0
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_storage())
    }
}
