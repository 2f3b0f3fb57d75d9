use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Profile, UserRecord};

#[derive(Debug, Default)]
pub struct Store {
    pub users: HashMap<Uuid, UserRecord>,
    /// Creation order; deleted profiles stay with `is_active == false`.
    pub profiles: Vec<Profile>,
}

impl Store {
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.email == email)
    }

    pub fn active_profiles(&self, parent_id: Uuid) -> impl Iterator<Item = &Profile> {
        self.profiles
            .iter()
            .filter(move |p| p.is_active && p.parent_id == parent_id)
    }

    pub fn active_profile_mut(&mut self, parent_id: Uuid, id: Uuid) -> Option<&mut Profile> {
        self.profiles
            .iter_mut()
            .find(|p| p.is_active && p.parent_id == parent_id && p.id == id)
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            db: Arc::new(RwLock::new(Store::default())),
            config: Arc::new(config),
        }
    }
}
