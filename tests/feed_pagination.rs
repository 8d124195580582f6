//! Backward pagination of the log feed: cursor advancement, the
//! loading/has-more guard, and scroll anchoring across prepends.

mod common;

use common::{entity_id, log_at, InMemoryJobBoard, RecordingNotifier};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use shukatsu_lib::application::services::ApplicationService;
use shukatsu_lib::domain::entities::ApplicationLog;
use std::sync::Arc;

const PAGE_SIZE: u32 = 20;

fn seeded_logs(count: usize) -> Vec<ApplicationLog> {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("timestamp");
    (0..count)
        .map(|i| {
            log_at(
                &format!("log-{i:03}"),
                &format!("note {i}"),
                start + ChronoDuration::days(i as i64),
            )
        })
        .collect()
}

async fn setup(count: usize) -> (Arc<ApplicationService>, Arc<InMemoryJobBoard>) {
    let board = Arc::new(InMemoryJobBoard::new());
    board.seed_logs(seeded_logs(count));
    let notifier = Arc::new(RecordingNotifier::new());
    let service = Arc::new(ApplicationService::new(
        board.clone(),
        notifier,
        1000,
        PAGE_SIZE,
    ));
    service
        .select_application(entity_id("app-1"))
        .await
        .expect("select application");
    (service, board)
}

#[tokio::test]
async fn selection_loads_the_newest_page() {
    let (service, _board) = setup(50).await;

    let logs = service.rendered_logs();
    assert_eq!(logs.len(), PAGE_SIZE as usize);
    assert!(service.has_more_logs());
    // Oldest-at-top ordering: the newest seeded log is the last element.
    assert_eq!(logs.last().expect("newest").id.as_str(), "log-049");
    assert_eq!(logs.first().expect("oldest loaded").id.as_str(), "log-030");
}

#[tokio::test]
async fn load_older_prepends_and_anchors_the_previous_top() {
    let (service, _board) = setup(50).await;

    let outcome = service
        .load_older_logs()
        .await
        .expect("load older")
        .expect("a page was due");

    assert_eq!(outcome.inserted, PAGE_SIZE as usize);
    assert_eq!(
        outcome.anchor.as_ref().map(|id| id.as_str()),
        Some("log-030"),
        "the shell scrolls back to the entry that was topmost before"
    );

    let logs = service.rendered_logs();
    assert_eq!(logs.len(), 40);
    assert_eq!(logs.first().expect("new top").id.as_str(), "log-010");
}

#[tokio::test]
async fn pagination_walks_to_exhaustion_without_overlap() {
    let (service, _board) = setup(50).await;

    let mut seen: Vec<String> = service
        .rendered_logs()
        .iter()
        .map(|log| log.id.to_string())
        .collect();

    while let Some(_outcome) = service.load_older_logs().await.expect("load older") {
        let ids: Vec<String> = service
            .rendered_logs()
            .iter()
            .map(|log| log.id.to_string())
            .collect();
        seen = ids;
        if !service.has_more_logs() {
            break;
        }
    }

    assert_eq!(seen.len(), 50, "every log loaded exactly once");
    let mut deduped = seen.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), 50, "no page was loaded twice");

    // Exhausted: further calls are no-ops.
    assert!(service
        .load_older_logs()
        .await
        .expect("load older")
        .is_none());
}

#[tokio::test]
async fn month_collapse_only_affects_presentation() {
    let (service, _board) = setup(50).await;

    let groups = service.log_groups();
    assert!(groups.len() >= 2, "seed spans multiple months");
    let (first_month, collapsed, count_before) = groups[0];
    assert!(!collapsed);

    assert!(service.toggle_month(first_month));
    let groups = service.log_groups();
    assert!(groups[0].1, "group reports collapsed");
    assert_eq!(groups[0].2, count_before, "entries are hidden, not dropped");
    assert_eq!(
        service.rendered_logs().len(),
        PAGE_SIZE as usize,
        "collapse is presentation state only"
    );
}
