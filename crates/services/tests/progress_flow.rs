use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use literacy_core::accumulator::CompleteLesson;
use literacy_core::model::{
    BadgeId, LeaderboardEntry, LearnerId, LearnerProgress, LessonId, PartResult, Score, ScorePart,
};
use literacy_core::time::fixed_now;
use services::{Clock, LeaderboardService, ProgressService, ProgressServiceError};
use storage::repository::{
    InMemoryRepository, LeaderboardRepository, ProgressRepository, StorageError,
};

fn learner(id: &str) -> LearnerId {
    LearnerId::parse(id).unwrap()
}

fn scored(lesson: &str, part: ScorePart, score: i64) -> CompleteLesson {
    CompleteLesson::scored(
        LessonId::parse(lesson).unwrap(),
        PartResult::new(part, Score::new(score).unwrap()),
    )
}

fn service(repo: &InMemoryRepository) -> ProgressService {
    let clock = Clock::fixed(fixed_now());
    let leaderboard = LeaderboardService::new(clock, Arc::new(repo.clone()));
    ProgressService::new(clock, Arc::new(repo.clone()), leaderboard)
}

async fn wait_for_row<F>(repo: &InMemoryRepository, done: F) -> LeaderboardEntry
where
    F: Fn(&LeaderboardEntry) -> bool,
{
    for _ in 0..100 {
        if let Some(row) = repo.top(10).await.unwrap().into_iter().find(|r| done(r)) {
            return row;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("leaderboard row never appeared");
}

#[tokio::test]
async fn completion_is_saved_and_pushed_to_leaderboard() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let id = learner("learner-1");

    let applied = svc
        .complete_lesson(&id, &scored("bai1", ScorePart::Main, 90))
        .await
        .unwrap();
    assert!(applied.is_new_lesson);
    assert_eq!(applied.progress.points(), 240);
    assert_eq!(applied.newly_unlocked, vec![BadgeId::FirstStep]);

    let stored = repo.load_progress(&id).await.unwrap().expect("saved");
    assert_eq!(stored.points(), 240);
    assert_eq!(stored.last_activity(), fixed_now());

    let row = wait_for_row(&repo, |r| r.learner_id == id).await;
    assert_eq!(row.points, 240);
    assert_eq!(row.lessons_completed, 1);
    assert_eq!(row.username, stored.username());
}

#[tokio::test]
async fn first_access_creates_a_stable_placeholder_name() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let id = learner("new-learner");

    let first = svc.load(&id).await.unwrap();
    assert!(first.username().starts_with("Bé "));
    assert_eq!(first.points(), 0);
    assert!(first.badges().iter().all(|b| !b.is_unlocked()));

    let second = svc.load(&id).await.unwrap();
    assert_eq!(first.username(), second.username());
}

#[tokio::test]
async fn repeated_events_accumulate_across_requests() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let id = learner("learner-2");

    for i in 1..=5 {
        svc.complete_lesson(&id, &CompleteLesson::new(LessonId::parse(format!("bai{i}")).unwrap(), None))
            .await
            .unwrap();
    }
    let progress = svc.load(&id).await.unwrap();
    assert!(progress.has_badge(BadgeId::Dedicated));
    // 5 lessons, first_step and dedicated
    assert_eq!(progress.points(), 5 * 100 + 2 * 50);

    let lower = svc
        .complete_lesson(&id, &scored("bai1", ScorePart::Main, 40))
        .await
        .unwrap();
    assert_eq!(lower.points.improvement, 40);
    let same = svc
        .complete_lesson(&id, &scored("bai1", ScorePart::Main, 40))
        .await
        .unwrap();
    assert_eq!(same.points.total(), 0);
}

#[tokio::test]
async fn rename_is_validated_and_reaches_the_leaderboard() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);
    let id = learner("learner-3");

    svc.complete_lesson(&id, &scored("bai1", ScorePart::Passage, 100))
        .await
        .unwrap();
    wait_for_row(&repo, |r| r.learner_id == id).await;

    assert!(matches!(
        svc.set_username(&id, "   ").await,
        Err(ProgressServiceError::Username(_))
    ));

    let renamed = svc.set_username(&id, "  Minh ").await.unwrap();
    assert_eq!(renamed.username(), "Minh");
    assert_eq!(renamed.points(), 300);

    let row = wait_for_row(&repo, |r| r.learner_id == id && r.username == "Minh").await;
    assert_eq!(row.points, 300);
}

#[tokio::test]
async fn renaming_a_learner_without_points_skips_the_leaderboard() {
    let repo = InMemoryRepository::new();
    let svc = service(&repo);

    let renamed = svc.set_username(&learner("quiet"), "Bé Mới").await.unwrap();
    assert_eq!(renamed.points(), 0);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn stored_progress_without_a_name_gets_a_stable_placeholder() {
    let repo = InMemoryRepository::new();
    let id = learner("legacy");
    let legacy: LearnerProgress =
        serde_json::from_value(serde_json::json!({ "points": 0, "completedLessons": [] }))
            .unwrap();
    repo.save_progress(&id, &legacy).await.unwrap();

    let svc = service(&repo);
    let loaded = svc.load(&id).await.unwrap();
    assert!(loaded.username().starts_with("Bé "));
    let stored = repo.load_progress(&id).await.unwrap().unwrap();
    assert_eq!(stored.username(), loaded.username());

    let applied = svc
        .complete_lesson(&id, &scored("bai1", ScorePart::Main, 90))
        .await
        .unwrap();
    assert_eq!(applied.progress.points(), 240);
    assert_eq!(applied.progress.username(), loaded.username());
}

struct FailingSaves;

#[async_trait]
impl ProgressRepository for FailingSaves {
    async fn load_progress(
        &self,
        _learner: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StorageError> {
        Ok(None)
    }

    async fn save_progress(
        &self,
        _learner: &LearnerId,
        _progress: &LearnerProgress,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }
}

#[tokio::test]
async fn save_failures_do_not_fail_the_request() {
    let repo = InMemoryRepository::new();
    let clock = Clock::fixed(fixed_now());
    let svc = ProgressService::new(
        clock,
        Arc::new(FailingSaves),
        LeaderboardService::new(clock, Arc::new(repo.clone())),
    );

    let applied = svc
        .complete_lesson(&learner("x"), &scored("bai1", ScorePart::Main, 90))
        .await
        .unwrap();
    assert_eq!(applied.progress.points(), 240);
}

struct BrokenStore;

#[async_trait]
impl ProgressRepository for BrokenStore {
    async fn load_progress(
        &self,
        _learner: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StorageError> {
        Err(StorageError::Serialization("bad document".into()))
    }

    async fn save_progress(
        &self,
        _learner: &LearnerId,
        _progress: &LearnerProgress,
    ) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test]
async fn load_failures_are_surfaced() {
    let clock = Clock::fixed(fixed_now());
    let svc = ProgressService::new(
        clock,
        Arc::new(BrokenStore),
        LeaderboardService::new(clock, Arc::new(InMemoryRepository::new())),
    );

    assert!(matches!(
        svc.complete_lesson(&learner("x"), &scored("bai1", ScorePart::Main, 90))
            .await,
        Err(ProgressServiceError::Storage(_))
    ));
}
