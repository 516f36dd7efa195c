//! End-to-end: messages flow through the ingestion listener into the store
//! and come back out of the query surface.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use sqlx::SqlitePool;
use vitals_db::repositories::ReadingRepo;
use vitals_ingest::listener::IngestListener;
use vitals_ingest::source::{channel, InboundMessage};
use vitals_ingest::status::ListenerHandle;

const TOPIC: &str = "health/data";

#[sqlx::test(migrations = "../../db/migrations")]
async fn published_reading_is_served_and_bad_input_is_not_stored(pool: SqlitePool) {
    let (tx, source) = channel(8);
    let status = ListenerHandle::new();
    let listener = IngestListener::spawn(source, TOPIC.to_string(), pool.clone(), status.clone());

    // A valid reading lands in the store and is served by /latest.
    tx.send(InboundMessage::new(
        TOPIC,
        r#"{"heartRate":72,"spo2":98,"temperatureC":36.5,"steps":120}"#,
    ))
    .await
    .unwrap();
    // An implausible heart rate is dropped.
    tx.send(InboundMessage::new(
        TOPIC,
        r#"{"heartRate":5,"spo2":98,"temperatureC":36.5}"#,
    ))
    .await
    .unwrap();
    drop(tx);
    listener.join().await;

    assert_eq!(ReadingRepo::count(&pool).await.unwrap(), 1);

    let app = common::build_test_app_with_listener(pool.clone(), status.clone());
    let response = get(app, "/latest").await;
    assert_eq!(response.status(), StatusCode::OK);
    let latest = body_json(response).await;
    assert_eq!(latest["heartRate"], 72.0);
    assert_eq!(latest["spo2"], 98.0);
    assert_eq!(latest["temperatureC"], 36.5);
    assert_eq!(latest["steps"], 120);

    // A direct write missing heartRate is refused.
    let app = common::build_test_app_with_listener(pool.clone(), status.clone());
    let response = post_json(app, "/upload", r#"{"spo2":98,"temperatureC":36.5}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ReadingRepo::count(&pool).await.unwrap(), 1);

    // Health reflects what the listener saw.
    let app = common::build_test_app_with_listener(pool, status);
    let health = body_json(get(app, "/health").await).await;
    assert_eq!(health["readings"], 1);
    assert_eq!(health["ingest"]["received"], 2);
    assert_eq!(health["ingest"]["stored"], 1);
    assert_eq!(health["ingest"]["rejected"], 1);
    assert_eq!(health["listener"], "disconnected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listener_and_direct_writes_interleave(pool: SqlitePool) {
    let (tx, source) = channel(16);
    let status = ListenerHandle::new();
    let listener = IngestListener::spawn(source, TOPIC.to_string(), pool.clone(), status.clone());

    let publisher = tokio::spawn(async move {
        for hr in 60..70 {
            let payload = format!(r#"{{"heartRate":{hr},"spo2":97,"temperatureC":36.6}}"#);
            tx.send(InboundMessage::new(TOPIC, payload)).await.unwrap();
        }
    });

    for hr in 100..105 {
        let app = common::build_test_app_with_listener(pool.clone(), status.clone());
        let body = format!(r#"{{"heartRate":{hr},"spo2":97,"temperatureC":36.6}}"#);
        let response = post_json(app, "/upload", &body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    publisher.await.unwrap();
    listener.join().await;

    assert_eq!(ReadingRepo::count(&pool).await.unwrap(), 15);

    // Listener readings keep their publish order relative to each other.
    let all = ReadingRepo::fetch_latest(&pool, 15).await.unwrap();
    let from_listener: Vec<f64> = all
        .iter()
        .rev()
        .map(|r| r.heart_rate)
        .filter(|hr| *hr < 100.0)
        .collect();
    let expected: Vec<f64> = (60..70).map(f64::from).collect();
    assert_eq!(from_listener, expected);
}
