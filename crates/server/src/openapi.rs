//! OpenAPI document. The schemas below mirror the camelCase wire shapes of
//! `service::dto` and exist only for documentation.

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub message: Option<String>,
}

#[derive(ToSchema)]
pub struct UserDoc { pub id: i64, pub name: String, pub email: String }

#[derive(ToSchema)]
pub struct UserInputDoc { pub name: Option<String>, pub email: Option<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ItemDoc {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ItemInputDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
    pub request_id: Option<i64>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CommentDoc {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_name: String,
    pub created: chrono::NaiveDateTime,
}

#[derive(ToSchema)]
pub struct CommentInputDoc { pub text: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ItemWithCommentsDoc {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub comments: Vec<CommentDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BookingInputDoc {
    pub item_id: i64,
    pub start: chrono::NaiveDateTime,
    pub end: chrono::NaiveDateTime,
}

#[derive(ToSchema)]
pub enum BookingStatusDoc {
    #[schema(rename = "WAITING")]
    Waiting,
    #[schema(rename = "APPROVED")]
    Approved,
    #[schema(rename = "REJECTED")]
    Rejected,
}

#[derive(ToSchema)]
pub struct BookingDoc {
    pub id: i64,
    pub start: chrono::NaiveDateTime,
    pub end: chrono::NaiveDateTime,
    pub status: BookingStatusDoc,
    pub booker: UserDoc,
    pub item: ItemDoc,
}

#[derive(ToSchema)]
pub struct ItemRequestInputDoc { pub description: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ItemRequestDoc {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: chrono::NaiveDateTime,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ItemShortDoc { pub id: i64, pub name: String, pub owner_id: i64 }

#[derive(ToSchema)]
pub struct ItemRequestWithItemsDoc {
    pub id: i64,
    pub description: String,
    pub created: chrono::NaiveDateTime,
    pub items: Vec<ItemShortDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::create,
        crate::routes::users::update,
        crate::routes::users::get,
        crate::routes::users::list,
        crate::routes::users::delete,
        crate::routes::items::create,
        crate::routes::items::update,
        crate::routes::items::get,
        crate::routes::items::list_own,
        crate::routes::items::search,
        crate::routes::items::comment,
        crate::routes::bookings::create,
        crate::routes::bookings::decide,
        crate::routes::bookings::get,
        crate::routes::bookings::list_for_booker,
        crate::routes::bookings::list_for_owner,
        crate::routes::requests::create,
        crate::routes::requests::list_own,
        crate::routes::requests::list_others,
        crate::routes::requests::get,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            UserDoc,
            UserInputDoc,
            ItemDoc,
            ItemInputDoc,
            CommentDoc,
            CommentInputDoc,
            ItemWithCommentsDoc,
            BookingInputDoc,
            BookingStatusDoc,
            BookingDoc,
            ItemRequestInputDoc,
            ItemRequestDoc,
            ItemShortDoc,
            ItemRequestWithItemsDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "items"),
        (name = "bookings"),
        (name = "requests")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/users/{id}", "/items/search", "/items/{id}/comment", "/bookings/owner", "/requests/all"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
