use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use models::item::NewItem;

use crate::dto::{
    to_comment_dto, to_item_dto, to_item_with_comments_dto, CommentDto, CommentInputDto, ItemDto, ItemInputDto,
    ItemWithCommentsDto,
};
use crate::errors::ServiceError;
use crate::repository::{
    BookingRepository, CommentRepository, ItemRepository, Repositories, RequestRepository, UserRepository,
};

/// Item listing, search, and booking-gated comments.
pub struct ItemService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
    bookings: Arc<dyn BookingRepository>,
    comments: Arc<dyn CommentRepository>,
    requests: Arc<dyn RequestRepository>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ItemService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            users: repos.users.clone(),
            items: repos.items.clone(),
            bookings: repos.bookings.clone(),
            comments: repos.comments.clone(),
            requests: repos.requests.clone(),
        }
    }

    /// List a new item for `owner_id`, optionally answering a request.
    ///
    /// Checks run in order: field presence, request existence, owner existence.
    #[instrument(skip(self, input))]
    pub async fn add_item(&self, owner_id: i64, input: ItemInputDto) -> Result<ItemDto, ServiceError> {
        let (Some(name), Some(description), Some(available)) =
            (non_empty(input.name), non_empty(input.description), input.available)
        else {
            return Err(ServiceError::validation("name, description and available are required"));
        };
        if let Some(request_id) = input.request_id {
            self.requests.find(request_id).await?.ok_or_else(|| ServiceError::not_found("request", request_id))?;
        }
        self.users.find(owner_id).await?.ok_or_else(|| ServiceError::not_found("user", owner_id))?;

        let created = self.items.create(NewItem { name, description, available, owner_id, request_id: input.request_id }).await?;
        info!(item_id = created.id, owner_id, request_id = ?created.request_id, "item_created");
        Ok(to_item_dto(&created))
    }

    /// Owner-only patch; null or empty fields keep their stored value.
    #[instrument(skip(self, patch))]
    pub async fn update_item(&self, owner_id: i64, item_id: i64, patch: ItemInputDto) -> Result<ItemDto, ServiceError> {
        self.users.find(owner_id).await?.ok_or_else(|| ServiceError::not_found("user", owner_id))?;
        let mut current = self.items.find(item_id).await?.ok_or_else(|| ServiceError::not_found("item", item_id))?;
        if current.owner_id != owner_id {
            warn!(item_id, owner_id, actual_owner = current.owner_id, "item_update_by_non_owner");
            return Err(ServiceError::NotFound(format!("item {} does not belong to user {}", item_id, owner_id)));
        }

        if let Some(name) = non_empty(patch.name) {
            current.name = name;
        }
        if let Some(description) = non_empty(patch.description) {
            current.description = description;
        }
        if let Some(available) = patch.available {
            current.available = available;
        }

        let saved = self.items.save(current).await?;
        info!(item_id = saved.id, "item_updated");
        Ok(to_item_dto(&saved))
    }

    pub async fn get_item(&self, item_id: i64) -> Result<ItemWithCommentsDto, ServiceError> {
        let found = self.items.find(item_id).await?.ok_or_else(|| ServiceError::not_found("item", item_id))?;
        let comments = self.comment_dtos(item_id).await?;
        Ok(to_item_with_comments_dto(&found, comments))
    }

    pub async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<ItemDto>, ServiceError> {
        let mut items = self.items.list_by_owner(owner_id).await?;
        items.sort_by_key(|i| i.id);
        Ok(items.iter().map(to_item_dto).collect())
    }

    /// Available items matching `text` in name or description. Blank text matches nothing.
    pub async fn search(&self, text: Option<&str>) -> Result<Vec<ItemDto>, ServiceError> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Ok(Vec::new());
        };
        let found = self.items.search_available(text).await?;
        Ok(found.iter().filter(|i| i.available).map(to_item_dto).collect())
    }

    /// Comment on an item the user has rented and returned.
    #[instrument(skip(self, input))]
    pub async fn create_comment(&self, user_id: i64, item_id: i64, input: CommentInputDto) -> Result<CommentDto, ServiceError> {
        let author = self
            .users
            .find(user_id)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("author with id = {} does not exist", user_id)))?;
        self.items.find(item_id).await?.ok_or_else(|| ServiceError::not_found("item", item_id))?;

        let now = Utc::now().naive_utc();
        if self.bookings.find_finished_approved(user_id, item_id, now).await?.is_none() {
            return Err(ServiceError::Validation(format!(
                "user {} has no completed approved booking of item {}",
                user_id, item_id
            )));
        }

        let created = self.comments.create(item_id, author.id, &input.text, now).await?;
        info!(comment_id = created.id, item_id, author_id = author.id, "comment_created");
        Ok(to_comment_dto(&created, &author.name))
    }

    async fn comment_dtos(&self, item_id: i64) -> Result<Vec<CommentDto>, ServiceError> {
        let comments = self.comments.list_by_item(item_id).await?;
        let mut out = Vec::with_capacity(comments.len());
        for c in &comments {
            let author = self.users.find(c.author_id).await?.map(|u| u.name).unwrap_or_default();
            out.push(to_comment_dto(c, &author));
        }
        Ok(out)
    }
}
