use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use services::{
    AppServices, ProgressError, RecordAnswer, SelectOutcome, SessionError, SharedSession,
};
use thiserror::Error;
use trivia_core::model::{
    BookId, OptionLabel, Player, ProfileStats, QuestionError, SessionId, UserId,
};

use crate::api::{
    AnswerRequest, AnswerResponse, BookSummary, MasteredResponse, ProgressResponse,
    SessionView, StartSessionRequest,
};
use crate::sessions::SessionStore;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Failures surfaced to API clients as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownBook(_) => Self::NotFound(err.to_string()),
            SessionError::Completed | SessionError::Unanswered | SessionError::Empty => {
                Self::Conflict(err.to_string())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct AppState {
    services: AppServices,
    sessions: Arc<SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(services: AppServices) -> Self {
        Self {
            services,
            sessions: Arc::new(SessionStore::new()),
        }
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionStore> {
        Arc::clone(&self.sessions)
    }

    async fn session(&self, raw_id: &str) -> Result<SharedSession, ApiError> {
        let not_found = || ApiError::NotFound(format!("no session {raw_id}"));
        let id: SessionId = raw_id.parse().map_err(|_| not_found())?;
        self.sessions.get(id).await.ok_or_else(not_found)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/books", get(list_books))
        .route("/api/books/{book}/sessions", post(start_session))
        .route("/api/sessions/{id}", get(get_session).delete(discard_session))
        .route("/api/sessions/{id}/answer", post(answer))
        .route("/api/sessions/{id}/advance", post(advance))
        .route("/api/progress", post(record_progress))
        .route("/api/users/{user_id}/books/{book}/mastered", get(mastered))
        .route("/api/users/{user_id}/stats", get(stats))
        .with_state(state)
}

//
// ─── HANDLERS ──────────────────────────────────────────────────────────────────
//

fn parse_book(raw: &str) -> Result<BookId, ApiError> {
    BookId::new(raw).map_err(|_| ApiError::NotFound(format!("no question bank for book {raw}")))
}

fn parse_user(raw: &str) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|err| ApiError::BadRequest(err.to_string()))
}

async fn list_books(State(state): State<AppState>) -> Json<Vec<BookSummary>> {
    let catalog = state.services.catalog();
    Json(catalog.banks().map(|bank| BookSummary::from(bank.as_ref())).collect())
}

async fn start_session(
    State(state): State<AppState>,
    Path(book): Path<String>,
    body: Result<Option<Json<StartSessionRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let book = parse_book(&book)?;
    let request = body?.map(|Json(request)| request).unwrap_or_default();
    let player = match request.user_id {
        Some(user_id) => Some(Player::new(
            parse_user(&user_id)?,
            request.username.unwrap_or_default(),
        )),
        None => None,
    };

    let session = state.services.quiz_loop().start_session(&book, player).await?;
    let view = SessionView::from(&session);
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionView> {
    let shared = state.session(&id).await?;
    let session = shared.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

async fn answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> ApiResult<AnswerResponse> {
    let Json(request) = body?;
    let label: OptionLabel = request
        .label
        .parse()
        .map_err(|err: QuestionError| ApiError::BadRequest(err.to_string()))?;

    let shared = state.session(&id).await?;
    let outcome = state.services.quiz_loop().answer(&shared, label).await?;
    let session = shared.lock().await;
    Ok(Json(AnswerResponse {
        recorded: matches!(outcome, SelectOutcome::Recorded(_)),
        session: SessionView::from(&*session),
    }))
}

/// Move past an answered question. Answer first: an unanswered question is a 409.
async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionView> {
    let shared = state.session(&id).await?;
    let mut session = shared.lock().await;
    state.services.quiz_loop().advance(&mut session)?;
    Ok(Json(SessionView::from(&*session)))
}

async fn discard_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let not_found = || ApiError::NotFound(format!("no session {id}"));
    let session_id: SessionId = id.parse().map_err(|_| not_found())?;
    if !state.sessions.remove(session_id).await {
        return Err(not_found());
    }
    tracing::debug!(%session_id, "discarded quiz session");
    Ok(StatusCode::NO_CONTENT)
}

async fn record_progress(
    State(state): State<AppState>,
    body: Result<Json<RecordAnswer>, JsonRejection>,
) -> ApiResult<ProgressResponse> {
    let Json(answer) = body?;
    let bank = state
        .services
        .catalog()
        .get(&answer.book)
        .ok_or_else(|| ApiError::NotFound(format!("no question bank for book {}", answer.book)))?;
    if !bank.contains(&answer.question_id) {
        return Err(ApiError::BadRequest(format!(
            "question {} is not in book {}",
            answer.question_id, answer.book
        )));
    }

    let questions_answered = state.services.progress().record_answer(&answer).await?;
    Ok(Json(ProgressResponse { questions_answered }))
}

async fn mastered(
    State(state): State<AppState>,
    Path((user_id, book)): Path<(String, String)>,
) -> ApiResult<MasteredResponse> {
    let user_id = parse_user(&user_id)?;
    let book = parse_book(&book)?;
    if state.services.catalog().get(&book).is_none() {
        return Err(SessionError::UnknownBook(book).into());
    }

    let mut question_ids: Vec<_> = state
        .services
        .progress()
        .fetch_answered_correctly(&user_id, &book)
        .await
        .into_iter()
        .collect();
    question_ids.sort();
    Ok(Json(MasteredResponse {
        user_id,
        book,
        question_ids,
    }))
}

async fn stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ProfileStats> {
    let user_id = parse_user(&user_id)?;
    state
        .services
        .progress()
        .stats(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no stats for user {user_id}")))
}
