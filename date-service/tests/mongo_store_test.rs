mod common;

use common::{stored_record, test_config, TestApp};
use date_service::config::StorageBackend;
use date_service::services::{DateRecordStore, DateStore, MongoDateStore, MongoDb};
use mongodb::bson::doc;
use reqwest::{Client, StatusCode};
use std::sync::Arc;

async fn mongo_store() -> (MongoDb, MongoDateStore) {
    let config = test_config(StorageBackend::MongoDb);
    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database, None, None)
        .await
        .expect("Failed to connect to MongoDB");
    let collection = db
        .ensure_collection(&config.mongodb.collection)
        .await
        .expect("Failed to provision collection");
    let store = MongoDateStore::new(db.clone(), collection, config.storage.retry_budget());
    (db, store)
}

#[tokio::test]
#[ignore = "Requires MongoDB at localhost:27017"]
async fn ensure_collection_is_idempotent() {
    let (db, _) = mongo_store().await;

    db.ensure_collection("dates").await.expect("second call");
    db.ensure_collection("dates").await.expect("third call");

    let names = db.database().list_collection_names(None).await.unwrap();
    assert_eq!(names.iter().filter(|n| *n == "dates").count(), 1);

    let _ = db.database().drop(None).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at localhost:27017"]
async fn create_and_fetch_round_trip() {
    let (db, store) = mongo_store().await;
    let records = DateRecordStore::new(Arc::new(store.clone()));

    let created = records.create("25/12/2024").await.unwrap();
    let fetched = records.fetch(&created.id).await.unwrap();
    assert_eq!(fetched, Some(created.clone()));

    let stored = store
        .collection()
        .find_one(doc! { "_id": &created.id }, None)
        .await
        .unwrap()
        .expect("record persisted");
    assert_eq!(stored.partition_key, created.id);
    assert_eq!(stored.stored_date, "2024-12-25T00:00:00.000000+00:00");

    assert!(records.fetch("nonexistent-id").await.unwrap().is_none());
    assert!(store.health_check().await.is_ok());

    let _ = db.database().drop(None).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at localhost:27017"]
async fn invalid_input_leaves_collection_empty() {
    let (db, store) = mongo_store().await;
    let records = DateRecordStore::new(Arc::new(store.clone()));

    assert!(records.create("not-a-date").await.is_err());

    let count = store.collection().count_documents(None, None).await.unwrap();
    assert_eq!(count, 0);

    let _ = db.database().drop(None).await;
}

#[tokio::test]
#[ignore = "Requires MongoDB at localhost:27017"]
async fn http_submit_then_get() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/submit-date", app.address))
        .form(&[("date", "14/07/1789")])
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let record = stored_record(&response.text().await.unwrap());
    let id = record["id"].as_str().unwrap();

    let response = client
        .get(format!("{}/get-date/{}", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.text().await.unwrap(),
        format!("Date for ID {}: 14/07/1789", id)
    );

    let response = client
        .get(format!("{}/get-date/missing", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await;
}
