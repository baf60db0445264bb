//! In-process [`Store`] with the same uniqueness rules as the MySQL schema.

use super::{ContactMessage, Store, StoreError, User};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    contact_messages: Vec<ContactMessage>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `users`.
    pub async fn users(&self) -> Vec<User> {
        self.tables.lock().await.users.clone()
    }

    /// Snapshot of `contact_messages`.
    pub async fn contact_messages(&self) -> Vec<ContactMessage> {
        self.tables.lock().await.contact_messages.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        // MySQL's default collation compares case-insensitively
        if tables
            .users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(email))
        {
            return Err(StoreError::Duplicate);
        }
        tables.users.push(User {
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
        });
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_contact_message(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<(), StoreError> {
        self.tables
            .lock()
            .await
            .contact_messages
            .push(ContactMessage {
                name: name.to_string(),
                email: email.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
