use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use models::item;

use crate::dto::{
    to_item_request_dto, to_item_request_with_items_dto, ItemRequestDto, ItemRequestInputDto, ItemRequestWithItemsDto,
};
use crate::errors::ServiceError;
use crate::repository::{ItemRepository, Repositories, RequestRepository, UserRepository};

/// Requests for items nobody has listed yet, and the items posted in answer.
pub struct RequestService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
    requests: Arc<dyn RequestRepository>,
}

impl RequestService {
    pub fn new(repos: &Repositories) -> Self {
        Self { users: repos.users.clone(), items: repos.items.clone(), requests: repos.requests.clone() }
    }

    #[instrument(skip(self, input))]
    pub async fn add_request(&self, user_id: i64, input: ItemRequestInputDto) -> Result<ItemRequestDto, ServiceError> {
        self.users.find(user_id).await?.ok_or_else(|| ServiceError::not_found("user", user_id))?;
        let description = input.description.unwrap_or_default();
        let created = self.requests.create(user_id, &description, Utc::now().naive_utc()).await?;
        info!(request_id = created.id, requester_id = user_id, "item_request_created");
        Ok(to_item_request_dto(&created))
    }

    /// One request with the items that answer it.
    pub async fn get(&self, request_id: i64) -> Result<ItemRequestWithItemsDto, ServiceError> {
        let found = self.requests.find(request_id).await?.ok_or_else(|| ServiceError::not_found("request", request_id))?;
        let items = self.items.list_by_requests(&[found.id]).await?;
        Ok(to_item_request_with_items_dto(&found, &items))
    }

    /// The caller's own requests, newest first, each with its answering items.
    pub async fn list_for_requester(&self, user_id: i64) -> Result<Vec<ItemRequestWithItemsDto>, ServiceError> {
        let mut requests = self.requests.list_by_requester(user_id).await?;
        requests.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));

        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
        let mut by_request: HashMap<i64, Vec<item::Model>> = HashMap::new();
        for i in self.items.list_by_requests(&ids).await? {
            if let Some(request_id) = i.request_id {
                by_request.entry(request_id).or_default().push(i);
            }
        }

        Ok(requests
            .iter()
            .map(|r| to_item_request_with_items_dto(r, by_request.get(&r.id).map(Vec::as_slice).unwrap_or_default()))
            .collect())
    }

    /// Everyone else's requests, newest first, without items.
    pub async fn list_excluding_requester(&self, user_id: i64) -> Result<Vec<ItemRequestDto>, ServiceError> {
        let mut requests = self.requests.list_excluding_requester(user_id).await?;
        requests.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(requests.iter().map(to_item_request_dto).collect())
    }
}
