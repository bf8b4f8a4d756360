//! Subscription endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::subscription::Subscription, AppState};

use super::{parse_id, AuthenticatedUser, MessageResponse};

/// Follow a user to be alerted about their new books
#[utoipa::path(
    post,
    path = "/users/subscribe/{user_id}",
    tag = "subscriptions",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = String, Path, description = "User to follow")
    ),
    responses(
        (status = 201, description = "Subscribed", body = Subscription),
        (status = 400, description = "Invalid id, self subscription or already subscribed"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Concurrent duplicate subscription")
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<(StatusCode, Json<Subscription>)> {
    let user_id = parse_id(&user_id, "user")?;
    let subscription = state
        .services
        .subscriptions
        .subscribe(user_id, caller.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// Stop following a user
#[utoipa::path(
    delete,
    path = "/users/unsubscribe/{user_id}",
    tag = "subscriptions",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = String, Path, description = "User to stop following")
    ),
    responses(
        (status = 200, description = "Unsubscribed", body = MessageResponse),
        (status = 404, description = "Not subscribed")
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = parse_id(&user_id, "user")?;
    state
        .services
        .subscriptions
        .unsubscribe(user_id, caller.user_id)
        .await?;
    Ok(Json(MessageResponse::new("unsubscribed")))
}

/// Users following the caller
#[utoipa::path(
    get,
    path = "/users/subscribers",
    tag = "subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscriptions where the caller is followed", body = Vec<Subscription>)
    )
)]
pub async fn list_subscribers(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<Json<Vec<Subscription>>> {
    let subscribers = state
        .services
        .subscriptions
        .list_subscribers(caller.user_id)
        .await?;
    Ok(Json(subscribers))
}

/// Users the caller follows
#[utoipa::path(
    get,
    path = "/users/subscriptions",
    tag = "subscriptions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Subscriptions where the caller is the follower", body = Vec<Subscription>)
    )
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<Json<Vec<Subscription>>> {
    let subscriptions = state
        .services
        .subscriptions
        .list_subscriptions(caller.user_id)
        .await?;
    Ok(Json(subscriptions))
}
