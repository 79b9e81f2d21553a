//! Redirect endpoint tests
//!
//! slug → 302，访问记录异步落库。

use std::sync::{Arc, Once};
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use tempfile::TempDir;

use shortener::analytics::{VisitDetail, VisitRecorder, VisitSink};
use shortener::api::services::redirect_routes;
use shortener::config::{RedirectConfig, init_config};
use shortener::services::RedirectResolver;
use shortener::storage::{
    NewUrl, Pagination, SeaOrmStorage, UrlRecord, UrlRepository, UserRepository, VisitRepository,
};
use shortener::utils::ip::TrustedProxies;

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
        temp_dir.path().join("redirect_test.db").display()
    );
    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite")
            .await
            .expect("Failed to create storage"),
    );

    let user = storage
        .create_user("redirect@example.com", "h")
        .await
        .unwrap();
    let record = storage
        .insert_url(NewUrl {
            destination: "https://example.com/target?x=1".to_string(),
            slug: "go1234".to_string(),
            owner_id: user.id,
        })
        .await
        .unwrap();

    (temp_dir, storage, record)
}

/// 写访问记录总是失败，计数照常
struct FailingInsertSink(Arc<SeaOrmStorage>);

#[async_trait]
impl VisitSink for FailingInsertSink {
    async fn insert_visit(&self, _detail: &VisitDetail) -> anyhow::Result<()> {
        anyhow::bail!("simulated insert failure")
    }

    async fn increment_visit_count(&self, url_id: i64) -> anyhow::Result<()> {
        self.0.increment_visit_count(url_id).await
    }
}

macro_rules! redirect_app {
    ($storage:expr, $recorder:expr, $trusted:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::new(RedirectResolver::new(
                    $storage.clone(),
                    $recorder.clone(),
                ))))
                .app_data(web::Data::new($trusted))
                .app_data(web::Data::new(RedirectConfig::default()))
                .service(redirect_routes()),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_redirect_hit_records_visit() {
    let (_dir, storage, record) = setup().await;
    let recorder = Arc::new(VisitRecorder::start(storage.as_visit_sink(), 16));
    let app = redirect_app!(storage, recorder, TrustedProxies::default());

    let req = TestRequest::get()
        .uri("/go1234")
        .peer_addr("203.0.113.9:40000".parse().unwrap())
        .insert_header(("User-Agent", "curl/8.0"))
        .insert_header(("Referer", "https://news.example.org/"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(LOCATION).unwrap(),
        "https://example.com/target?x=1"
    );

    assert!(recorder.wait_idle(Duration::from_secs(5)).await);

    let updated = storage.find_by_slug("go1234").await.unwrap().unwrap();
    assert_eq!(updated.visit_count, 1);

    let visits = storage
        .list_visits(record.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(visits[0].user_agent.as_deref(), Some("curl/8.0"));
    assert_eq!(
        visits[0].referer.as_deref(),
        Some("https://news.example.org/")
    );
}

#[actix_rt::test]
async fn test_head_request_redirects() {
    let (_dir, storage, _record) = setup().await;
    let recorder = Arc::new(VisitRecorder::start(storage.as_visit_sink(), 16));
    let app = redirect_app!(storage, recorder, TrustedProxies::default());

    let req = TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/go1234")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_rt::test]
async fn test_unknown_slug_goes_to_not_found_page() {
    let (_dir, storage, _record) = setup().await;
    let recorder = Arc::new(VisitRecorder::start(storage.as_visit_sink(), 16));
    let app = redirect_app!(storage, recorder, TrustedProxies::default());

    for uri in ["/nothere", "/x", "/bad%20slug"] {
        let resp = test::call_service(&app, TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/_/not-found");
    }

    let resp = test::call_service(
        &app,
        TestRequest::get().uri("/_/not-found").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(recorder.wait_idle(Duration::from_secs(1)).await);
    assert_eq!(recorder.pending(), 0);
}

#[actix_rt::test]
async fn test_failed_visit_insert_still_counts() {
    let (_dir, storage, record) = setup().await;
    let recorder = Arc::new(VisitRecorder::start(
        Arc::new(FailingInsertSink(storage.clone())),
        16,
    ));
    let app = redirect_app!(storage, recorder, TrustedProxies::default());

    for _ in 0..2 {
        let resp = test::call_service(&app, TestRequest::get().uri("/go1234").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }
    assert!(recorder.wait_idle(Duration::from_secs(5)).await);

    let updated = storage.find_by_slug("go1234").await.unwrap().unwrap();
    assert_eq!(updated.visit_count, 2);
    assert_eq!(storage.count_visits(record.id).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_forwarded_ip_behind_trusted_proxy() {
    let (_dir, storage, record) = setup().await;
    let recorder = Arc::new(VisitRecorder::start(storage.as_visit_sink(), 16));
    let trusted = TrustedProxies::from_config(&["10.0.0.0/8".to_string()]);
    let app = redirect_app!(storage, recorder, trusted);

    let req = TestRequest::get()
        .uri("/go1234")
        .peer_addr("10.1.2.3:8000".parse().unwrap())
        .insert_header(("X-Forwarded-For", "198.51.100.7, 10.1.2.3"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(recorder.wait_idle(Duration::from_secs(5)).await);

    let visits = storage
        .list_visits(record.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(visits[0].ip_address.as_deref(), Some("198.51.100.7"));
}
