//! Chat API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{chat, user};
use crate::utils::validation::{self, MAX_CONTENT_LEN};
use crate::utils::{AppError, AppResult};
use shared::models::{
    ChatMessage, Conversation, ConversationDetail, HistoryQuery, NotificationKind,
    SendMessageRequest,
};

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 200;

/// 会话成员校验
fn ensure_member(conversation: &Conversation, user_id: i64) -> AppResult<()> {
    if conversation.user_a != user_id && conversation.user_b != user_id {
        return Err(AppError::forbidden("Not a member of this conversation"));
    }
    Ok(())
}

async fn find_conversation(state: &ServerState, id: i64) -> AppResult<Conversation> {
    chat::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Conversation {id}")))
}

/// POST /api/chat/with/:user_id - 打开 (或取回) 与某用户的会话
pub async fn open(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(peer_id): Path<i64>,
) -> AppResult<Json<Conversation>> {
    if peer_id == current_user.id {
        return Err(AppError::validation("Cannot open a conversation with yourself"));
    }
    let peer = user::find_by_id(&state.pool, peer_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::not_found(format!("User {peer_id}")))?;

    let conversation = chat::open(&state.pool, current_user.id, peer.id).await?;
    Ok(Json(conversation))
}

/// GET /api/chat/conversations - 我的会话列表
pub async fn list_conversations(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ConversationDetail>>> {
    let conversations = chat::list_for_user(&state.pool, current_user.id).await?;
    Ok(Json(conversations))
}

/// GET /api/chat/conversations/:id/messages?before=&limit= - 历史消息
pub async fn history(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let conversation = find_conversation(&state, id).await?;
    ensure_member(&conversation, current_user.id)?;

    let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let messages = chat::history(&state.pool, id, query.before, limit).await?;
    Ok(Json(messages))
}

/// POST /api/chat/conversations/:id/messages - 发送消息
pub async fn send(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ChatMessage>> {
    validation::validate_required_text(&payload.content, "content", MAX_CONTENT_LEN)?;

    let conversation = find_conversation(&state, id).await?;
    ensure_member(&conversation, current_user.id)?;

    let message = chat::send(&state.pool, id, current_user.id, &payload.content).await?;

    let peer_id = if conversation.user_a == current_user.id {
        conversation.user_b
    } else {
        conversation.user_a
    };
    state
        .notifier
        .notify(
            peer_id,
            NotificationKind::ChatMessage,
            "New message",
            format!("{} sent you a message", current_user.username),
            Some(id),
        )
        .await;

    Ok(Json(message))
}

/// POST /api/chat/conversations/:id/read - 全部标记已读
pub async fn mark_read(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<i64>> {
    let conversation = find_conversation(&state, id).await?;
    ensure_member(&conversation, current_user.id)?;

    let marked = chat::mark_read(&state.pool, id, current_user.id).await?;
    Ok(Json(marked))
}
