//! In-memory user store.
//!
//! One store per worker process. Records keep insertion order.

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::model::{User, UserFields};

#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }

    pub async fn create(&self, fields: UserFields) -> User {
        let user = User::new(fields);
        self.users.write().await.push(user.clone());
        user
    }

    /// Replace all fields of an existing user. `None` if the id is unknown.
    pub async fn update(&self, id: Uuid, fields: UserFields) -> Option<User> {
        let mut users = self.users.write().await;
        let slot = users.iter_mut().find(|u| u.id == id)?;
        *slot = User::with_id(id, fields);
        Some(slot.clone())
    }

    /// Remove a user. Returns whether it existed.
    pub async fn delete(&self, id: Uuid) -> bool {
        let mut users = self.users.write().await;
        match users.iter().position(|u| u.id == id) {
            Some(index) => {
                users.remove(index);
                true
            }
            None => false,
        }
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.users.read().await.iter().any(|u| u.id == id)
    }
}
