#![allow(dead_code)]

use async_trait::async_trait;
use pos_access_gate::{
    AppConfig, AppState, MockIdentityProvider, RouteTable,
    models::CurrentUser,
    repository::Repository,
    roles::Role,
};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

// --- In-memory Repository ---

/// Profiles keyed by user id; anything missing resolves to `None` like a
/// deleted or never-provisioned profile.
#[derive(Default, Clone)]
pub struct MockUserRepo {
    pub users: HashMap<Uuid, CurrentUser>,
}

impl MockUserRepo {
    pub fn with(users: impl IntoIterator<Item = CurrentUser>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

#[async_trait]
impl Repository for MockUserRepo {
    async fn get_current_user(&self, id: Uuid) -> Option<CurrentUser> {
        self.users.get(&id).cloned()
    }
}

// --- Fixtures ---

pub const STOREKEEPER: &str = "موظف مخزن";
pub const SALES_STAFF: &str = "موظف مبيعات";
pub const ACCOUNTANT: &str = "محاسب";
pub const BRANCH_MANAGER: &str = "مدير فرع";

pub fn staff(name_ar: Option<&str>) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        full_name: "Staff Member".to_string(),
        branch_id: Some(Uuid::new_v4()),
        role: name_ar.map(|name| Role {
            id: Uuid::new_v4(),
            name: None,
            name_ar: Some(name.to_string()),
        }),
    }
}

pub fn app_state(repo: MockUserRepo, identity: MockIdentityProvider, config: AppConfig) -> AppState {
    AppState {
        repo: Arc::new(repo),
        identity: Arc::new(identity),
        config,
        routes: Arc::new(RouteTable::builtin().expect("builtin route table")),
    }
}
