use std::sync::{Arc, Mutex, PoisonError};

use shared::domain::User;
use tracing::info;

/// Holder for the signed-in user, shared by every view-model of a session.
#[derive(Clone, Default)]
pub struct CurrentUser {
    user: Arc<Mutex<Option<User>>>,
}

impl CurrentUser {
    pub fn logged_in(user: User) -> Self {
        let current = Self::default();
        current.refresh(user);
        current
    }

    pub fn refresh(&self, user: User) {
        info!(user_id = user.id.0, "current user refreshed");
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn get(&self) -> Option<User> {
        self.user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.get().is_some()
    }
}
