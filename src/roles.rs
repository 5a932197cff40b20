use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// RoleKind
///
/// The stable, locale-independent identity of a permission class.
/// Display strings (Arabic labels stored in the `roles` table, or canonical
/// English slugs) are mapped onto this enum once, at the data boundary, so the
/// access rules never compare raw strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RoleKind {
    Storekeeper,
    SalesStaff,
    Accountant,
    BranchManager,
    /// Any role the application does not special-case (owner, admin, ...).
    Other,
}

impl RoleKind {
    /// Every special-cased role, in landing-route priority order.
    pub const NAMED: [RoleKind; 4] = [
        RoleKind::Storekeeper,
        RoleKind::SalesStaff,
        RoleKind::Accountant,
        RoleKind::BranchManager,
    ];

    /// named
    ///
    /// Resolves a display or canonical role string to one of the named kinds.
    /// Returns `None` for anything unrecognised; used by configuration parsing,
    /// where an unknown name is a typo rather than a legitimate role.
    pub fn named(key: &str) -> Option<RoleKind> {
        match key.trim() {
            "موظف مخزن" | "storekeeper" => Some(RoleKind::Storekeeper),
            "موظف مبيعات" | "sales_staff" => Some(RoleKind::SalesStaff),
            "محاسب" | "accountant" => Some(RoleKind::Accountant),
            "مدير فرع" | "branch_manager" => Some(RoleKind::BranchManager),
            _ => None,
        }
    }

    /// from_key
    ///
    /// Resolves a user's role key. Unlisted roles fall into `Other`.
    pub fn from_key(key: &str) -> RoleKind {
        Self::named(key).unwrap_or(RoleKind::Other)
    }

    /// The canonical slug, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Storekeeper => "storekeeper",
            RoleKind::SalesStaff => "sales_staff",
            RoleKind::Accountant => "accountant",
            RoleKind::BranchManager => "branch_manager",
            RoleKind::Other => "other",
        }
    }

    /// The label shown to staff in the UI.
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            RoleKind::Storekeeper => Some("موظف مخزن"),
            RoleKind::SalesStaff => Some("موظف مبيعات"),
            RoleKind::Accountant => Some("محاسب"),
            RoleKind::BranchManager => Some("مدير فرع"),
            RoleKind::Other => None,
        }
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role
///
/// A row of the `roles` table as nested under the user profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Role {
    pub id: Uuid,
    // Canonical name.
    pub name: Option<String>,
    // Localized (Arabic) display name; takes precedence when set.
    pub name_ar: Option<String>,
}

impl Role {
    /// role_key
    ///
    /// The string the role is identified by: the localized name when present,
    /// otherwise the canonical name. Blank strings count as absent.
    pub fn role_key(&self) -> Option<&str> {
        fn non_blank(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }
        non_blank(&self.name_ar).or_else(|| non_blank(&self.name))
    }

    pub fn kind(&self) -> Option<RoleKind> {
        self.role_key().map(RoleKind::from_key)
    }
}
