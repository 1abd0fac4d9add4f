//! User directory port

use crate::user::{User, UserId};
use async_trait::async_trait;
use dashmap::DashMap;

/// Directory lookup result type
pub type DirResult<T> = Result<T, DirectoryError>;

/// Directory backend errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory backend error: {0}")]
    Backend(String),
}

/// User directory lookup port.
///
/// Backed by whatever identity store the deployment uses; the engine only
/// ever resolves ids to users when validating relationship slots.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Get user by id, `None` when the id does not resolve.
    async fn find_by_id(&self, id: UserId) -> DirResult<Option<User>>;
}

/// In-memory user directory (for testing and development)
#[derive(Default)]
pub struct InMemoryDirectory {
    users: DashMap<UserId, User>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Deactivate a user without removing the entry.
    pub fn deactivate(&self, id: UserId) {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.active = false;
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserLookup for InMemoryDirectory {
    async fn find_by_id(&self, id: UserId) -> DirResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;

    #[tokio::test]
    async fn test_directory_lookup() {
        let dir = InMemoryDirectory::new();
        dir.insert(User::new(1, "ana@example.com", "Ana", Role::Agent));

        let found = dir.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.role, Role::Agent);
        assert!(dir.find_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivate() {
        let dir = InMemoryDirectory::new();
        dir.insert(User::new(7, "leo@example.com", "Leo", Role::User));
        dir.deactivate(7);

        let found = dir.find_by_id(7).await.unwrap().unwrap();
        assert!(!found.active);
    }
}
