//! 访问统计与访问历史测试

use std::sync::{Arc, Once};

use chrono::{TimeDelta, Utc};
use tempfile::TempDir;

use shortener::analytics::{VisitDetail, VisitSink};
use shortener::config::init_config;
use shortener::services::VisitService;
use shortener::storage::{
    NewUrl, Pagination, SeaOrmStorage, UrlRecord, UrlRepository, UserRepository, VisitRepository,
};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn setup() -> (TempDir, Arc<SeaOrmStorage>, UrlRecord) {
    init_static_config();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("visit_stats.db").display()
    );
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let user = storage.create_user("stats@example.com", "h").await.unwrap();
    let record = storage
        .insert_url(NewUrl {
            destination: "https://example.com".to_string(),
            slug: "stats1".to_string(),
            owner_id: user.id,
        })
        .await
        .unwrap();
    (temp_dir, storage, record)
}

async fn add_visit(storage: &SeaOrmStorage, url_id: i64, ip: Option<&str>, days_ago: i64) {
    let mut detail = VisitDetail::new(url_id).with_visitor(ip.map(str::to_string), None, None);
    detail.visited_at = Utc::now() - TimeDelta::days(days_ago);
    storage.insert_visit(&detail).await.unwrap();
}

#[tokio::test]
async fn test_stats_window_and_unique_ips() {
    let (_dir, storage, record) = setup().await;

    add_visit(&storage, record.id, Some("1.1.1.1"), 1).await;
    add_visit(&storage, record.id, Some("1.1.1.1"), 2).await;
    add_visit(&storage, record.id, Some("2.2.2.2"), 3).await;
    add_visit(&storage, record.id, None, 4).await;
    // 窗口外
    add_visit(&storage, record.id, Some("3.3.3.3"), 31).await;
    add_visit(&storage, record.id, Some("3.3.3.3"), 45).await;

    let service = VisitService::new(storage.clone());
    let stats = service.stats(record.id).await.unwrap();

    assert_eq!(stats.total_visits, 6);
    assert_eq!(stats.recent_visits, 4);
    assert_eq!(stats.unique_visitors, 2);
}

#[tokio::test]
async fn test_stats_for_unvisited_url() {
    let (_dir, storage, record) = setup().await;
    let stats = VisitService::new(storage.clone())
        .stats(record.id)
        .await
        .unwrap();
    assert_eq!(stats.total_visits, 0);
    assert_eq!(stats.recent_visits, 0);
    assert_eq!(stats.unique_visitors, 0);
}

#[tokio::test]
async fn test_history_newest_first_with_paging() {
    let (_dir, storage, record) = setup().await;
    for days_ago in [5, 1, 3, 2, 4] {
        add_visit(&storage, record.id, Some("9.9.9.9"), days_ago).await;
    }

    let service = VisitService::new(storage.clone());
    let page = service
        .history(record.id, Pagination::new(2, 0))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert!(page[0].visited_at > page[1].visited_at);

    let all = service
        .history(record.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].visited_at >= w[1].visited_at));

    let tail = service
        .history(record.id, Pagination::new(2, 4))
        .await
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].id, all[4].id);
}

#[tokio::test]
async fn test_all_visits_carries_slug() {
    let (_dir, storage, record) = setup().await;
    let other = storage
        .insert_url(NewUrl {
            destination: "https://example.org".to_string(),
            slug: "stats2".to_string(),
            owner_id: record.owner_id,
        })
        .await
        .unwrap();

    add_visit(&storage, record.id, Some("1.1.1.1"), 2).await;
    add_visit(&storage, other.id, Some("2.2.2.2"), 1).await;

    let visits = VisitService::new(storage.clone())
        .all_visits(Pagination::default())
        .await
        .unwrap();
    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].slug, "stats2");
    assert_eq!(visits[1].slug, "stats1");
}

#[tokio::test]
async fn test_deleting_url_removes_visits() {
    let (_dir, storage, record) = setup().await;
    add_visit(&storage, record.id, Some("1.1.1.1"), 0).await;
    add_visit(&storage, record.id, Some("2.2.2.2"), 0).await;
    assert_eq!(storage.count_visits(record.id).await.unwrap(), 2);

    assert_eq!(
        storage
            .delete_owned(record.id, record.owner_id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(storage.count_visits(record.id).await.unwrap(), 0);
    assert!(
        storage
            .list_all_visits(Pagination::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_increment_unknown_url_is_error() {
    let (_dir, storage, record) = setup().await;
    storage.increment_visit_count(record.id).await.unwrap();
    assert!(storage.increment_visit_count(record.id + 100).await.is_err());

    let updated = storage.find_by_slug("stats1").await.unwrap().unwrap();
    assert_eq!(updated.visit_count, 1);
}
