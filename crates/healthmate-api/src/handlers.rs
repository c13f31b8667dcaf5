//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/body parameters via axum extractors, calls
//! into the conversation service or a repository, and returns JSON
//! responses. Bodies arrive as `serde_json::Value` where field presence and
//! type must be validated by hand to produce the documented 400 messages.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use healthmate_core::types::{
    Conversation, ConversationSummary, Frequency, Message, Reminder, Role,
};
use healthmate_storage::ReminderUpdate;

use crate::error::ApiError;
use crate::faqs;
use crate::state::AppState;

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SymptomCheckResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub chats: DashboardChats,
    pub reminders: DashboardReminders,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardChats {
    pub count: u64,
    pub total_messages: u64,
    pub recent: Vec<ConversationSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReminders {
    pub count: u64,
    pub active_count: u64,
    pub items: Vec<Reminder>,
}

#[derive(Debug, Deserialize)]
pub struct FaqSearchParams {
    pub q: Option<String>,
}

/// A prior turn supplied inline with a symptom check.
#[derive(Debug, Deserialize)]
struct ContextEntry {
    role: String,
    content: String,
}

// =============================================================================
// Validation helpers
// =============================================================================

/// Extract a required non-empty string field from a JSON body.
fn require_string<'a>(body: &'a Value, field: &str, message: &str) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

// =============================================================================
// Health
// =============================================================================

/// GET /health - liveness and uptime.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// =============================================================================
// Conversations
// =============================================================================

/// GET /conversations/{user_id} - summaries, newest-updated first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    Ok(Json(state.chat.list_conversations(&user_id)?))
}

/// GET /conversations/{user_id}/{id} - full conversation with messages.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(state.chat.get_conversation(&user_id, id)?))
}

/// POST /conversations/{user_id} - start a conversation from one message.
pub async fn start_conversation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Conversation>, ApiError> {
    let message = require_string(
        &body,
        "message",
        "Message is required and must be a string",
    )?;
    let conversation = state.chat.start_conversation(&user_id, message).await?;
    Ok(Json(conversation))
}

/// POST /conversations/{user_id}/{id}/message - append one turn.
pub async fn continue_conversation(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
    Json(body): Json<Value>,
) -> Result<Json<Conversation>, ApiError> {
    let message = require_string(
        &body,
        "message",
        "Message is required and must be a string",
    )?;
    let conversation = state
        .chat
        .continue_conversation(&user_id, id, message)
        .await?;
    Ok(Json(conversation))
}

/// DELETE /conversations/{user_id}/{id} - idempotent delete.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    state.chat.delete_conversation(&user_id, id)?;
    Ok(Json(serde_json::json!({ "message": "deleted" })))
}

// =============================================================================
// Dashboard
// =============================================================================

/// Recent conversations and reminder items shown on the dashboard.
const DASHBOARD_ITEMS: usize = 5;

/// GET /dashboard/{user_id}/summary - counts plus the newest few records.
pub async fn dashboard_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let count = state.conversations.count(&user_id)?;
    let total_messages = state.conversations.message_count(&user_id)?;
    let mut recent = state.conversations.list_summaries(&user_id)?;
    recent.truncate(DASHBOARD_ITEMS);

    let mut items = state.reminders.list(&user_id)?;
    let reminder_count = items.len() as u64;
    let active_count = items.iter().filter(|r| r.is_active).count() as u64;
    items.truncate(DASHBOARD_ITEMS);

    Ok(Json(DashboardSummary {
        chats: DashboardChats {
            count,
            total_messages,
            recent,
        },
        reminders: DashboardReminders {
            count: reminder_count,
            active_count,
            items,
        },
    }))
}

// =============================================================================
// Symptom check
// =============================================================================

/// POST /symptom-check - one-off triage call, nothing persisted.
pub async fn symptom_check(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SymptomCheckResponse>, ApiError> {
    let description = require_string(&body, "description", "description is required")?;

    let context = match body.get("context") {
        None | Some(Value::Null) => Vec::new(),
        Some(raw) => {
            let entries: Vec<ContextEntry> = serde_json::from_value(raw.clone())
                .map_err(|_| {
                    ApiError::BadRequest("context must be an array of messages".to_string())
                })?;
            let now = Utc::now();
            entries
                .into_iter()
                .map(|e| Message::new(Role::from_wire(&e.role), e.content, now))
                .collect()
        }
    };

    let result = state.chat.symptom_check(description, &context).await?;
    Ok(Json(SymptomCheckResponse { result }))
}

// =============================================================================
// FAQs
// =============================================================================

fn faq_body(entries: Vec<&'static faqs::Faq>) -> Json<Value> {
    Json(serde_json::json!({ "faqs": entries }))
}

/// GET /faqs - the full verified catalogue.
pub async fn list_faqs() -> Json<Value> {
    faq_body(faqs::search(""))
}

/// GET /faqs/search?q= - case-insensitive substring match.
pub async fn search_faqs(Query(params): Query<FaqSearchParams>) -> Json<Value> {
    faq_body(faqs::search(params.q.as_deref().unwrap_or("")))
}

// =============================================================================
// Reminders
// =============================================================================

/// GET /reminders/{user_id} - newest-updated first.
pub async fn list_reminders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Reminder>>, ApiError> {
    Ok(Json(state.reminders.list(&user_id)?))
}

/// POST /reminders/{user_id} - create; `title` and `timeOfDay` are required.
pub async fn create_reminder(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let required = "title and timeOfDay are required";
    let title = require_string(&body, "title", required)?;
    let time_of_day = require_string(&body, "timeOfDay", required)?;

    let now = Utc::now();
    let reminder = Reminder {
        id: Uuid::new_v4(),
        user_id,
        title: title.to_string(),
        notes: body
            .get("notes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        time_of_day: time_of_day.to_string(),
        frequency: body
            .get("frequency")
            .and_then(Value::as_str)
            .map(Frequency::from_wire)
            .unwrap_or(Frequency::Daily),
        weekday: body
            .get("weekday")
            .and_then(Value::as_u64)
            .map(|w| w.min(6) as u8),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.reminders.insert(&reminder)?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// PUT /reminders/{user_id}/{id} - partial update.
pub async fn update_reminder(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
    Json(body): Json<Value>,
) -> Result<Json<Reminder>, ApiError> {
    let update = ReminderUpdate {
        title: body
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string),
        notes: body
            .get("notes")
            .and_then(Value::as_str)
            .map(str::to_string),
        time_of_day: body
            .get("timeOfDay")
            .and_then(Value::as_str)
            .map(str::to_string),
        frequency: body
            .get("frequency")
            .and_then(Value::as_str)
            .map(Frequency::from_wire),
        weekday: body
            .get("weekday")
            .and_then(Value::as_u64)
            .map(|w| w.min(6) as u8),
        is_active: body.get("isActive").and_then(Value::as_bool),
    };

    let reminder = state
        .reminders
        .update(&user_id, id, &update, Utc::now())?
        .ok_or_else(|| ApiError::NotFound("Reminder not found".to_string()))?;
    Ok(Json(reminder))
}

/// DELETE /reminders/{user_id}/{id} - idempotent delete.
pub async fn delete_reminder(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    state.reminders.delete(&user_id, id)?;
    Ok(Json(serde_json::json!({ "message": "deleted" })))
}
