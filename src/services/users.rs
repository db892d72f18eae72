use crate::models::{User, UserId};
use crate::store::{StoreError, UserStore};

pub struct UserService<S> {
    store: S,
}

impl<S: UserStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self) -> Result<User, StoreError> {
        self.store.create_user().await
    }

    pub async fn exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        self.store.user_exists(user_id).await
    }
}
