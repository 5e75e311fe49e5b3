use chrono::Duration;
use literacy_core::accumulator::{CompleteLesson, apply_completion};
use literacy_core::model::{
    BadgeId, LeaderboardEntry, LearnerId, LearnerProgress, LessonId, NewUser, PartResult,
    RecordingId, RecordingLink, Role, Score, ScorePart, UserId, Username,
};
use literacy_core::time::fixed_now;
use storage::repository::{
    LeaderboardRepository, ProgressRepository, RecordingRepository, Storage, StorageError,
    UserRepository,
};
use storage::sqlite::SqliteRepository;

fn memory_url(name: &str) -> String {
    format!("sqlite:file:{name}?mode=memory&cache=shared")
}

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&memory_url(name)).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

/// Writes a raw progress document next to the repository's own pool.
async fn insert_document(name: &str, learner_id: &str, document: &str) {
    let pool = sqlx::SqlitePool::connect(&memory_url(name)).await.expect("raw connect");
    sqlx::query(
        "INSERT INTO learner_progress (learner_id, document, points, updated_at) VALUES (?1, ?2, 0, '2024-09-05T00:00:00Z')",
    )
    .bind(learner_id)
    .bind(document)
    .execute(&pool)
    .await
    .expect("raw insert");
}

fn learner(id: &str) -> LearnerId {
    LearnerId::parse(id).unwrap()
}

fn student(username: &str, full_name: &str, class_id: &str) -> literacy_core::model::User {
    NewUser {
        username: username.into(),
        full_name: full_name.into(),
        class_id: Some(class_id.into()),
        ..NewUser::default()
    }
    .validate(UserId::random())
    .unwrap()
}

#[tokio::test]
async fn sqlite_progress_document_roundtrip() {
    let repo = connect("memdb_progress").await;
    let id = learner("learner-1");

    assert!(repo.load_progress(&id).await.unwrap().is_none());

    let start = LearnerProgress::new(Username::placeholder(42), fixed_now());
    let event = CompleteLesson::scored(
        LessonId::parse("bai1").unwrap(),
        PartResult::new(ScorePart::Example(2), Score::new(100).unwrap()),
    );
    let applied = apply_completion(&start, &event, fixed_now() + Duration::minutes(3));
    repo.save_progress(&id, &applied.progress).await.unwrap();

    let loaded = repo.load_progress(&id).await.unwrap().expect("stored");
    assert_eq!(loaded, applied.progress);
    assert!(loaded.has_badge(BadgeId::StarStudent));
    assert_eq!(loaded.points(), 300);

    // Saving again replaces the document.
    let mut renamed = loaded.clone();
    renamed.set_username(Username::parse("Minh").unwrap());
    repo.save_progress(&id, &renamed).await.unwrap();
    let reloaded = repo.load_progress(&id).await.unwrap().unwrap();
    assert_eq!(reloaded.username(), "Minh");
}

#[tokio::test]
async fn sqlite_rejects_malformed_progress_documents() {
    let repo = connect("memdb_bad_doc").await;
    insert_document("memdb_bad_doc", "x", "{").await;

    let err = repo.load_progress(&learner("x")).await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn sqlite_loads_sparse_progress_documents() {
    let repo = connect("memdb_sparse_doc").await;
    insert_document("memdb_sparse_doc", "old", r#"{"points":0,"completedLessons":[]}"#).await;

    let loaded = repo.load_progress(&learner("old")).await.unwrap().expect("stored");
    assert_eq!(loaded.points(), 0);
    assert_eq!(loaded.username(), "");
    assert_eq!(loaded.badges().len(), 4);
}

#[tokio::test]
async fn sqlite_leaderboard_upsert_keeps_maxima() {
    let repo = connect("memdb_leaderboard").await;
    let row = |id: &str, name: &str, points, lessons| LeaderboardEntry {
        learner_id: learner(id),
        username: name.into(),
        points,
        lessons_completed: lessons,
    };

    repo.upsert_max(&row("a", "Bé Na", 500, 5), fixed_now()).await.unwrap();
    repo.upsert_max(&row("b", "Bé Tí", 500, 3), fixed_now()).await.unwrap();
    repo.upsert_max(&row("c", "Bé Gấu", 900, 9), fixed_now()).await.unwrap();
    // A stale push never lowers the counters but still renames.
    repo.upsert_max(&row("a", "Na", 200, 6), fixed_now()).await.unwrap();

    assert_eq!(repo.count().await.unwrap(), 3);

    let top = repo.top(10).await.unwrap();
    let ids: Vec<&str> = top.iter().map(|e| e.learner_id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
    assert_eq!(top[1].username, "Na");
    assert_eq!(top[1].points, 500);
    assert_eq!(top[1].lessons_completed, 6);

    assert_eq!(repo.top(2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn sqlite_users_unique_and_listed_by_class() {
    let repo = connect("memdb_users").await;

    repo.insert_users(&[
        student("hs02", "Vũ Ngọc Khánh An", "1A3"),
        student("hs01", "Hà Tâm An", "1A3"),
        student("hs50", "Lớp Khác", "2B1"),
    ])
    .await
    .unwrap();

    let dup = student("hs01", "Someone", "1A3");
    assert!(matches!(
        repo.insert_user(&dup).await,
        Err(StorageError::Conflict)
    ));

    // A batch with a taken username writes nothing.
    let batch = [student("hs03", "Hoàng Diệu Anh", "1A3"), dup];
    assert!(matches!(
        repo.insert_users(&batch).await,
        Err(StorageError::Conflict)
    ));
    assert!(repo.find_by_username("hs03").await.unwrap().is_none());

    let found = repo.find_by_username("hs01").await.unwrap().expect("user");
    assert_eq!(found.full_name(), "Hà Tâm An");
    assert_eq!(found.role(), Role::Student);

    let listed = repo.list_class("1A3", Role::Student, 50).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|u| u.username()).collect();
    assert_eq!(names, vec!["hs01", "hs02"]);
    assert!(repo.list_class("1A3", Role::Teacher, 50).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_recording_links_are_replaced() {
    let repo = connect("memdb_recordings").await;
    let id = RecordingId::parse("lesson1/main").unwrap();

    assert!(repo.get_link(&id).await.unwrap().is_none());

    let first = RecordingLink::new(id.clone(), "https://cdn.example.com/a.mp3").unwrap();
    repo.save_link(&first).await.unwrap();
    let second = RecordingLink::new(id.clone(), "https://cdn.example.com/b.mp3").unwrap();
    repo.save_link(&second).await.unwrap();

    let stored = repo.get_link(&id).await.unwrap().expect("link");
    assert_eq!(stored.url().as_str(), "https://cdn.example.com/b.mp3");

    repo.delete_link(&id).await.unwrap();
    assert!(repo.get_link(&id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_link(&id).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn storage_sqlite_runs_migrations_once() {
    let url = "sqlite:file:memdb_storage?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("first open");
    storage
        .leaderboard
        .upsert_max(
            &LeaderboardEntry {
                learner_id: learner("z"),
                username: "Bé Thỏ".into(),
                points: 600,
                lessons_completed: 8,
            },
            fixed_now(),
        )
        .await
        .unwrap();

    let reopened = Storage::sqlite(url).await.expect("second open");
    assert_eq!(reopened.leaderboard.count().await.unwrap(), 1);
}
