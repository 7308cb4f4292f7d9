use std::sync::Arc;

use tracing::{info, instrument};

use models::user;

use crate::dto::{to_user_dto, UserDto, UserInputDto};
use crate::errors::ServiceError;
use crate::repository::{Repositories, UserRepository};

/// User registration and profile maintenance.
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repos: &Repositories) -> Self { Self { users: repos.users.clone() } }

    /// Create a user. A taken name or email is reported by the store, not pre-checked.
    ///
    /// # Examples
    /// ```
    /// use service::{dto::UserInputDto, Repositories, UserService};
    /// let svc = UserService::new(&Repositories::memory());
    /// let input = UserInputDto { name: Some("Alice".into()), email: Some("alice@example.com".into()) };
    /// let user = tokio_test::block_on(svc.create_user(input.clone())).unwrap();
    /// assert_eq!(user.email, "alice@example.com");
    /// assert!(tokio_test::block_on(svc.create_user(input)).is_err());
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: UserInputDto) -> Result<UserDto, ServiceError> {
        let name = input.name.unwrap_or_default();
        let email = input.email.unwrap_or_default();
        let created = match self.users.create(&name, &email).await {
            Err(ServiceError::Conflict(_)) => return Err(self.describe_conflict(None, &name, &email).await),
            other => other?,
        };
        info!(user_id = created.id, "user_created");
        Ok(to_user_dto(&created))
    }

    /// Apply the non-null fields of `input`. Changing to a name or email held
    /// by someone else is a conflict; re-sending the current email is a no-op.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i64, input: UserInputDto) -> Result<UserDto, ServiceError> {
        let mut current = self.users.find(id).await?.ok_or_else(|| ServiceError::not_found("user", id))?;

        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            current.name = name;
        }
        if let Some(email) = input.email.filter(|e| *e != current.email) {
            user::validate_email(&email)?;
            if let Some(holder) = self.users.find_by_email(&email).await? {
                if holder.id != current.id {
                    return Err(ServiceError::Conflict(format!("user with email {} already exists", email)));
                }
            }
            current.email = email;
        }

        let (own_id, name, email) = (current.id, current.name.clone(), current.email.clone());
        let saved = match self.users.save(current).await {
            Err(ServiceError::Conflict(_)) => return Err(self.describe_conflict(Some(own_id), &name, &email).await),
            other => other?,
        };
        info!(user_id = saved.id, "user_updated");
        Ok(to_user_dto(&saved))
    }

    /// Name the field behind a uniqueness conflict the store reported.
    async fn describe_conflict(&self, own_id: Option<i64>, name: &str, email: &str) -> ServiceError {
        match self.users.find_by_email(email).await {
            Ok(Some(holder)) if Some(holder.id) != own_id => ServiceError::Conflict(format!("user with email {} already exists", email)),
            _ => ServiceError::Conflict(format!("user with name {} already exists", name)),
        }
    }

    pub async fn get_user(&self, id: i64) -> Result<UserDto, ServiceError> {
        let found = self.users.find(id).await?.ok_or_else(|| ServiceError::not_found("user", id))?;
        Ok(to_user_dto(&found))
    }

    pub async fn list_users(&self) -> Result<Vec<UserDto>, ServiceError> {
        Ok(self.users.list().await?.iter().map(to_user_dto).collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<(), ServiceError> {
        if !self.users.delete(id).await? {
            return Err(ServiceError::not_found("user", id));
        }
        info!(user_id = id, "user_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: Option<&str>, email: Option<&str>) -> UserInputDto {
        UserInputDto { name: name.map(Into::into), email: email.map(Into::into) }
    }

    fn svc() -> UserService {
        UserService::new(&Repositories::memory())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() -> anyhow::Result<()> {
        let svc = svc();
        svc.create_user(input(Some("A"), Some("a@example.com"))).await?;
        let err = svc.create_user(input(Some("B"), Some("a@example.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.list_users().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() -> anyhow::Result<()> {
        let svc = svc();
        svc.create_user(input(Some("A"), Some("a@example.com"))).await?;
        let b = svc.create_user(input(Some("B"), Some("b@example.com"))).await?;

        let err = svc.create_user(input(Some("A"), Some("other@example.com"))).await.unwrap_err();
        assert_eq!(err, ServiceError::Conflict("user with name A already exists".into()));

        let err = svc.update_user(b.id, input(Some("A"), None)).await.unwrap_err();
        assert_eq!(err, ServiceError::Conflict("user with name A already exists".into()));
        assert_eq!(svc.get_user(b.id).await?.name, "B");
        Ok(())
    }

    #[tokio::test]
    async fn create_requires_name_and_wellformed_email() {
        let svc = svc();
        let err = svc.create_user(input(None, Some("a@example.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = svc.create_user(input(Some("A"), Some("not-an-email"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_applies_only_present_fields() -> anyhow::Result<()> {
        let svc = svc();
        let a = svc.create_user(input(Some("A"), Some("a@example.com"))).await?;

        let renamed = svc.update_user(a.id, input(Some("Alice"), None)).await?;
        assert_eq!((renamed.name.as_str(), renamed.email.as_str()), ("Alice", "a@example.com"));

        let moved = svc.update_user(a.id, input(None, Some("alice@example.com"))).await?;
        assert_eq!(moved.name, "Alice");
        assert_eq!(moved.email, "alice@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn update_email_conflicts_only_with_other_users() -> anyhow::Result<()> {
        let svc = svc();
        let a = svc.create_user(input(Some("A"), Some("a@example.com"))).await?;
        let b = svc.create_user(input(Some("B"), Some("b@example.com"))).await?;

        let err = svc.update_user(b.id, input(None, Some("a@example.com"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let same = svc.update_user(a.id, input(None, Some("a@example.com"))).await?;
        assert_eq!(same, a);
        Ok(())
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let svc = svc();
        assert!(matches!(svc.get_user(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete_user(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.update_user(42, UserInputDto::default()).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> anyhow::Result<()> {
        let svc = svc();
        let a = svc.create_user(input(Some("A"), Some("a@example.com"))).await?;
        svc.delete_user(a.id).await?;
        assert!(matches!(svc.get_user(a.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
