//! Review API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{booking, review};
use crate::utils::validation::{self, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{
    BookingItem, BookingStatus, NotificationKind, ReviewCreate, ReviewDetail, ReviewSummary,
};

/// 路径段 → 条目：`/item/service/5` / `/item/combo/7`
fn parse_item(kind: &str, id: i64) -> AppResult<BookingItem> {
    match kind {
        "service" => Ok(BookingItem::Service(id)),
        "combo" => Ok(BookingItem::Combo(id)),
        other => Err(AppError::validation(format!("Invalid item kind: {other}"))),
    }
}

/// GET /api/reviews/item/:kind/:id - 条目的全部评价
pub async fn list_for_item(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<Vec<ReviewDetail>>> {
    let item = parse_item(&kind, id)?;
    let reviews = review::find_by_item(&state.pool, item).await?;
    Ok(Json(reviews))
}

/// GET /api/reviews/item/:kind/:id/summary - 评分聚合
pub async fn item_summary(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<ReviewSummary>> {
    let item = parse_item(&kind, id)?;
    let summary = review::summary(&state.pool, item).await?;
    Ok(Json(summary))
}

/// POST /api/reviews - 评价一个已完成的预订 (一单一评)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<Json<ReviewDetail>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::validation("rating must be between 1 and 5"));
    }
    validation::validate_optional_text(&payload.comment, "comment", MAX_NOTE_LEN)?;

    let target = booking::find_by_id(&state.pool, payload.booking_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Booking {}", payload.booking_id)))?;
    if target.user_id != current_user.id {
        return Err(AppError::forbidden("Not the owner of this booking"));
    }
    if target.status != BookingStatus::Completed {
        return Err(AppError::business("Only completed bookings can be reviewed"));
    }

    let created = review::create(
        &state.pool,
        payload.booking_id,
        current_user.id,
        target.item,
        payload.rating,
        payload.comment.as_deref(),
    )
    .await
    .map_err(|e| match e {
        crate::db::repository::RepoError::Duplicate(msg) => AppError::business(msg),
        other => other.into(),
    })?;

    tracing::info!(
        review_id = created.review.id,
        booking_id = payload.booking_id,
        rating = payload.rating,
        "Review created"
    );

    // 通知条目属主
    let host_id = match target.item {
        BookingItem::Service(id) => crate::db::repository::service::find_by_id(&state.pool, id)
            .await?
            .map(|s| s.host_id),
        BookingItem::Combo(id) => crate::db::repository::combo::find_by_id(&state.pool, id)
            .await?
            .map(|c| c.host_id),
    };
    if let Some(host_id) = host_id {
        state
            .notifier
            .notify(
                host_id,
                NotificationKind::ReviewReceived,
                "New review",
                format!("{} rated {}/5", current_user.username, payload.rating),
                Some(created.review.id),
            )
            .await;
    }

    Ok(Json(created))
}

/// DELETE /api/reviews/:id - 删除自己的评价 (admin 可删任意)
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let existing = review::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Review {id}")))?;
    if existing.review.user_id != current_user.id && !current_user.is_admin() {
        return Err(AppError::forbidden("Not the author of this review"));
    }

    let result = review::delete(&state.pool, id).await?;
    Ok(Json(result))
}
