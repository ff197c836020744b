//! Contract tests for HttpService against a mock of the remote API.
//!
//! Each test mounts the endpoints it needs on a wiremock server and checks
//! the request shape, response parsing and error mapping.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use dayplan_core::item::{CreateItem, UpdateItem};
use dayplan_core::user::Registration;
use dayplan_core::{ItemKey, ItemKind};
use dayplan_service::{HttpService, ServiceError, TrackerService};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> HttpService {
    HttpService::new(&server.uri()).with_retry_delay(Duration::from_millis(10))
}

// ---- Reads ----

#[tokio::test]
async fn list_tasks_parses_wire_objects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "title": "Call mom", "is_completed": false, "date": "2024-03-15"},
            {"id": 1, "title": "Buy milk", "is_completed": true, "date": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = service(&server).list_tasks(42, None).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].date, NaiveDate::from_ymd_opt(2024, 3, 15));
    assert!(tasks[1].is_completed);
}

#[tokio::test]
async fn list_tasks_sends_iso_date_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/42"))
        .and(query_param("date", "2024-03-05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2024, 3, 5);
    let tasks = service(&server).list_tasks(42, date).await.unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn list_habits_reads_completed_today() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/habits/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "title": "Stretch", "is_completed_today": true}
        ])))
        .mount(&server)
        .await;

    let habits = service(&server).list_habits(42).await.unwrap();
    assert_eq!(habits.len(), 1);
    assert!(habits[0].is_completed_today);
}

#[tokio::test]
async fn malformed_list_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/habits/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = service(&server).list_habits(42).await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode(_)));
}

// ---- Mutations ----

#[tokio::test]
async fn register_posts_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_json(json!({"tg_id": 42, "name": "ann"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    service(&server)
        .register(&Registration {
            tg_id: 42,
            name: "ann".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn add_task_includes_date_only_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/add"))
        .and(body_json(json!({"user_id": 42, "title": "Buy milk", "date": "2024-03-15"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/habits/add"))
        .and(body_json(json!({"user_id": 42, "title": "Stretch"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service(&server);
    let date = NaiveDate::from_ymd_opt(2024, 3, 15);
    let task = CreateItem::new(ItemKind::Task, 42, "Buy milk", date).unwrap();
    svc.add_item(ItemKind::Task, &task).await.unwrap();
    let habit = CreateItem::new(ItemKind::Habit, 42, "Stretch", date).unwrap();
    svc.add_item(ItemKind::Habit, &habit).await.unwrap();
}

#[tokio::test]
async fn toggle_update_delete_hit_kind_specific_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/habits/toggle/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/update/3"))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let svc = service(&server);
    svc.toggle_item(ItemKey::habit(7)).await.unwrap();
    svc.update_item(ItemKey::task(3), &UpdateItem::new("Renamed").unwrap())
        .await
        .unwrap();
    svc.delete_item(ItemKey::task(3)).await.unwrap();
}

// ---- Errors ----

#[tokio::test]
async fn server_error_is_not_retried_and_keeps_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/toggle/1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db locked"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = service(&server)
        .toggle_item(ItemKey::task(1))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ServiceError::Api {
            status: 500,
            detail: "db locked".into()
        }
    );
    assert!(!err.is_transient());
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/habits/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .mount(&server)
        .await;

    let err = service(&server)
        .delete_item(ItemKey::habit(9))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::NotFound("Not Found".into()));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Grab a free port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let svc = HttpService::new(&format!("http://127.0.0.1:{port}"))
        .with_retry_delay(Duration::from_millis(10));
    let err = svc.list_habits(1).await.unwrap_err();
    assert!(err.is_transient(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn truncated_body_after_status_is_not_resent() {
    // Answers every request with a 200 whose body stops short of its
    // declared length, then hangs up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"ok\"")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    let svc = HttpService::new(&format!("http://127.0.0.1:{port}"))
        .with_retry_delay(Duration::from_millis(10));
    let err = svc.toggle_item(ItemKey::task(1)).await.unwrap_err();

    assert!(matches!(err, ServiceError::Decode(_)), "got {err:?}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
