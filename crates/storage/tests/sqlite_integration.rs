use std::collections::HashSet;
use std::path::Path;

use chrono::Duration;
use storage::assets::BankCatalog;
use storage::repository::{ProfileStatsRepository, ProgressRepository, Storage};
use storage::sqlite::SqliteRepository;
use trivia_core::model::{BookId, ProgressRecord, QuestionId, UserId};
use trivia_core::time::fixed_now;

fn record(user: &str, question: &str, is_correct: bool) -> ProgressRecord {
    ProgressRecord {
        user_id: UserId::new(user).unwrap(),
        book: BookId::new("genesis").unwrap(),
        question_id: QuestionId::new(question).unwrap(),
        is_correct,
        answered_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_tracks_mastered_questions_per_user_and_book() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Running migrations twice is a no-op.
    repo.migrate().await.expect("migrate again");

    let first = repo.append_progress(&record("u1", "gen-1", true)).await.unwrap();
    let second = repo.append_progress(&record("u1", "gen-1", true)).await.unwrap();
    assert!(second > first);
    repo.append_progress(&record("u1", "gen-2", false)).await.unwrap();
    repo.append_progress(&record("u2", "gen-3", true)).await.unwrap();

    let mut other_book = record("u1", "exo-1", true);
    other_book.book = BookId::new("exodus").unwrap();
    repo.append_progress(&other_book).await.unwrap();

    let mastered = repo
        .answered_correctly(&UserId::new("u1").unwrap(), &BookId::new("genesis").unwrap())
        .await
        .unwrap();
    assert_eq!(mastered, HashSet::from([QuestionId::new("gen-1").unwrap()]));

    let nobody = repo
        .answered_correctly(&UserId::new("u9").unwrap(), &BookId::new("genesis").unwrap())
        .await
        .unwrap();
    assert!(nobody.is_empty());
}

#[tokio::test]
async fn sqlite_increments_profile_stats_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("stats.sqlite3").display());
    let storage = Storage::sqlite(&url).await.expect("connect");
    let user = UserId::new("u1").unwrap();

    assert!(storage.stats.get_stats(&user).await.unwrap().is_none());

    let mut handles = Vec::new();
    for i in 0..20 {
        let stats = std::sync::Arc::clone(&storage.stats);
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            stats
                .increment_answered(&user, "psalmist", fixed_now() + Duration::seconds(i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stats = storage.stats.get_stats(&user).await.unwrap().unwrap();
    assert_eq!(stats.questions_answered, 20);
    assert_eq!(stats.username, "psalmist");
}

#[test]
fn shipped_banks_are_valid() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/banks");
    let catalog = BankCatalog::load_dir(&dir).expect("shipped banks load");
    assert!(!catalog.is_empty());
    for bank in catalog.banks() {
        assert!(bank.len() >= 10, "{} should fill a full session", bank.book());
    }
}
