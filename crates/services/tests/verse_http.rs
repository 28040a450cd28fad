use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use services::verse::fetch_verse_text_or_empty;
use services::{
    Clock, ProgressSync, QuizLoopService, VerseClient, VerseConfig, VerseError, VerseSource,
};
use storage::assets::BankCatalog;
use storage::repository::InMemoryRepository;
use trivia_core::model::{AnswerOption, BookId, OptionLabel, QuestionBank, QuestionDraft};
use trivia_core::time::fixed_now;
use url::Url;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn echo_verse(Path(reference): Path<String>) -> Json<Value> {
    Json(json!({
        "reference": reference,
        "text": format!("  text of {reference}\n"),
    }))
}

fn client(addr: SocketAddr) -> VerseClient {
    let base = Url::parse(&format!("http://{addr}")).unwrap();
    VerseClient::new(VerseConfig::new(base).with_timeout(Duration::from_secs(2))).unwrap()
}

#[tokio::test]
async fn fetches_first_reference_and_trims_text() {
    let addr = serve(Router::new().route("/{reference}", get(echo_verse))).await;

    let text = client(addr)
        .fetch_text("Genesis 25:34; Hebrews 12:16")
        .await
        .unwrap();
    assert_eq!(text, "text of Genesis 25:34");
}

#[tokio::test]
async fn server_error_is_reported_and_becomes_empty() {
    let addr = serve(Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR })).await;
    let verses = client(addr);

    let err = verses.fetch_text("Ruth 1:16").await.unwrap_err();
    assert!(matches!(err, VerseError::HttpStatus(status) if status.as_u16() == 500));
    assert_eq!(fetch_verse_text_or_empty(&verses, "Ruth 1:16").await, "");
}

#[tokio::test]
async fn missing_text_field_is_an_error() {
    let addr = serve(Router::new().fallback(|| async { Json(json!({ "verses": [] })) })).await;

    let err = client(addr).fetch_text("Jonah 1:17").await.unwrap_err();
    assert!(matches!(err, VerseError::EmptyText));
}

#[tokio::test]
async fn session_completes_when_verse_service_is_down() {
    let addr = serve(Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR })).await;

    let questions = (1..=3)
        .map(|i| {
            QuestionDraft {
                id: format!("jonah-{i}"),
                prompt: format!("Question {i}?"),
                options: OptionLabel::ALL
                    .into_iter()
                    .map(|label| AnswerOption {
                        label,
                        text: format!("{label}{i}"),
                    })
                    .collect(),
                correct_label: OptionLabel::A,
                source_reference: format!("Jonah {i}:1"),
                verse_text: None,
                explanation: String::new(),
            }
            .validate()
            .unwrap()
        })
        .collect();
    let bank = QuestionBank::new(BookId::new("jonah").unwrap(), "Jonah", questions).unwrap();
    let repo = InMemoryRepository::new();
    let svc = QuizLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(BankCatalog::from_banks([bank]).unwrap()),
        Arc::new(ProgressSync::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        )),
        Arc::new(client(addr)),
    );

    let session = svc
        .start_session(&BookId::new("jonah").unwrap(), None)
        .await
        .unwrap();
    let shared = Arc::new(tokio::sync::Mutex::new(session));
    loop {
        svc.answer(&shared, OptionLabel::A).await.unwrap();
        let mut guard = shared.lock().await;
        svc.advance(&mut guard).unwrap();
        if guard.is_complete() {
            break;
        }
    }
    svc.wait_for_background().await;

    let session = shared.lock().await;
    assert!(session.is_complete());
    assert_eq!(session.correct_count(), 3);
    assert!(
        session
            .questions()
            .iter()
            .all(|q| q.cached_verse_text().is_none())
    );
}
