//! End-to-end tests against a running server.
//!
//! Start the service with a database, then run
//! `BASE_URL=http://localhost:8080 cargo test -- --ignored`.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use uuid::Uuid;

fn base() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into())
}

/// Fresh alphanumeric key, so reruns never collide.
fn key() -> String {
    Uuid::new_v4().simple().to_string()
}

fn mac() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    bytes[..6]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Random point in the past; temperature timestamps are unique table-wide.
fn unique_start() -> DateTime<Utc> {
    let offset = i64::from(Uuid::new_v4().as_fields().0 % 100_000_000);
    DateTime::from_timestamp(Utc::now().timestamp() - offset, 0).unwrap_or_default()
}

/// POST `body` to `collection_url`, then GET the returned `url` and check it
/// serves the same representation.
async fn round_trip(client: &Client, collection_url: &str, body: Value) -> Result<Value> {
    // ---
    let resp = client.post(collection_url).json(&body).send().await?;
    assert_eq!(resp.status(), StatusCode::CREATED, "POST {collection_url}");
    let created: Value = resp.json().await?;

    let url = created["url"].as_str().unwrap_or_default().to_string();
    let fetched: Value = client.get(&url).send().await?.error_for_status()?.json().await?;
    assert_eq!(fetched, created);
    Ok(fetched)
}

struct Fixture {
    client: Client,
    residence_rfid: String,
    residence_url: String,
    room_url: String,
    thermostat_rfid: String,
    thermostat_url: String,
}

/// Residence → room → thermostat chain, created through the API.
async fn fixture() -> Result<Fixture> {
    // ---
    let client = Client::new();
    let rfid = key();

    let residence: Value = client
        .post(format!("{}/residence/", base()))
        .json(&json!({"rfid": rfid}))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let room: Value = client
        .post(residence["rooms_url"].as_str().unwrap_or_default())
        .json(&json!({"name": "Dining Room"}))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let thermostat_rfid = key();
    let thermostat: Value = client
        .post(room["thermostats_url"].as_str().unwrap_or_default())
        .json(&json!({"rfid": thermostat_rfid, "name": "Hallway"}))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(Fixture {
        client,
        residence_rfid: rfid,
        thermostat_rfid,
        residence_url: residence["url"].as_str().unwrap_or_default().to_string(),
        room_url: room["url"].as_str().unwrap_or_default().to_string(),
        thermostat_url: thermostat["url"].as_str().unwrap_or_default().to_string(),
    })
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn health_reports_database() -> Result<()> {
    // ---
    let body: Value = reqwest::get(format!("{}/health", base())).await?.json().await?;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn hierarchy_links_and_cascade() -> Result<()> {
    // ---
    let fx = fixture().await?;

    let thermostat: Value = fx.client.get(&fx.thermostat_url).send().await?.json().await?;
    assert_eq!(thermostat["room"]["url"], fx.room_url.as_str());
    assert!(thermostat["temperatures_url"]
        .as_str()
        .unwrap_or_default()
        .ends_with("/temperature/"));

    // Same room id below another residence is not reachable
    let other = key();
    let resp = fx
        .client
        .post(format!("{}/residence/", base()))
        .json(&json!({"rfid": other}))
        .send()
        .await?;
    assert_ok!(resp.error_for_status_ref());

    let room_id = fx.room_url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let resp = fx
        .client
        .get(format!("{}/residence/{}/room/{}/", base(), other, room_id))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = fx.client.delete(&fx.residence_url).send().await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = fx.client.get(&fx.thermostat_url).send().await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await?;
    assert_eq!(body["detail"], "No Residence matches the given query.");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn residence_validation_errors() -> Result<()> {
    // ---
    let client = Client::new();
    let url = format!("{}/residence/", base());

    let resp = client.post(&url).json(&json!({"rfid": "not-a-residence"})).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["rfid"].is_array());

    let rfid = key();
    let resp = client.post(&url).json(&json!({"rfid": rfid})).send().await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client.post(&url).json(&json!({"rfid": rfid})).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["rfid"][0], "residence with this rfid already exists.");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn temperatures_paginate_and_report_latest() -> Result<()> {
    // ---
    let fx = fixture().await?;
    let list_url = format!("{}temperature/", fx.thermostat_url);

    let start = unique_start();
    for (i, value) in [20.5, 21.0, 21.5].iter().enumerate() {
        let datetime = start + Duration::minutes(i as i64);
        let resp = fx
            .client
            .post(&list_url)
            .json(&json!({"datetime": datetime.to_rfc3339(), "value": value}))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let page: Value = fx
        .client
        .get(format!("{list_url}?limit=2"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().map(Vec::len), Some(2));
    assert!(page["next_url"].is_string());
    assert!(page["previous_url"].is_null());
    assert_eq!(page["latest_temperature_url"], format!("{list_url}latest/"));

    let latest: Value = fx
        .client
        .get(format!("{list_url}latest/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(latest["value"], 21.5);

    let chart: Value = fx
        .client
        .get(format!("{list_url}chart/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(chart["temperatures"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn empty_latest_is_not_found() -> Result<()> {
    // ---
    let fx = fixture().await?;

    let resp = fx
        .client
        .get(format!("{}meta_entry/latest/", fx.thermostat_url))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn heating_table_slots_are_unique() -> Result<()> {
    // ---
    let fx = fixture().await?;
    let url = format!("{}heating_table/", fx.thermostat_url);

    let entry = json!({"day": 0, "time": "13:45:00", "temperature": 23.0});
    let resp = fx.client.post(&url).json(&entry).send().await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = fx.client.post(&url).json(&entry).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(
        body["non_field_errors"][0],
        "The fields day, time, thermostat must make a unique set."
    );

    let resp = fx
        .client
        .post(&url)
        .json(&json!({"day": 7, "time": "08:00", "temperature": 31.0}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["day"].is_array());
    assert!(body["temperature"].is_array());
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn devices_lookup_by_mac() -> Result<()> {
    // ---
    let client = Client::new();
    let url = format!("{}/device/raspberry/", base());
    let (rfid, mac) = (key(), mac());

    let resp = client.post(&url).json(&json!({"rfid": rfid, "mac": mac})).send().await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await?;
    assert!(created["residence"].is_null());
    assert!(created["thermostat_devices"].is_null());

    let found: Value = client
        .get(format!("{url}lookup/"))
        .query(&[("mac", mac.as_str())])
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(found["rfid"], rfid.as_str());

    let resp = client.get(format!("{url}lookup/")).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({"mac": ["This field is required."]}));

    let resp = client
        .get(format!("{url}lookup/"))
        .query(&[("mac", "ff:ff:ff:ff:ff:fe")])
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn latest_picks_newest_timestamp_not_last_insert() -> Result<()> {
    // ---
    let fx = fixture().await?;
    let start = unique_start();

    let temperatures = format!("{}temperature/", fx.thermostat_url);
    for (minutes, value) in [(2, 30.0), (0, 10.0), (1, 20.0)] {
        let datetime = start + Duration::minutes(minutes);
        let resp = fx
            .client
            .post(&temperatures)
            .json(&json!({"datetime": datetime.to_rfc3339(), "value": value}))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let latest: Value = fx
        .client
        .get(format!("{temperatures}latest/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(latest["value"], 30.0);

    let entries = format!("{}meta_entry/", fx.thermostat_url);
    for (minutes, rssi) in [(5, -40), (3, -60), (4, -50)] {
        let datetime = start + Duration::minutes(minutes);
        let resp = fx
            .client
            .post(&entries)
            .json(&json!({"datetime": datetime.to_rfc3339(), "rssi": rssi}))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let latest: Value = fx
        .client
        .get(format!("{entries}latest/"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(latest["rssi"], -40);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn same_slot_allowed_on_different_thermostats() -> Result<()> {
    // ---
    let fx = fixture().await?;

    let other: Value = fx
        .client
        .post(format!("{}thermostat/", fx.room_url))
        .json(&json!({"rfid": key(), "name": "Bedroom"}))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let entry = json!({"day": 3, "time": "06:30", "temperature": 21.0});
    for heating_table_url in [
        format!("{}heating_table/", fx.thermostat_url),
        other["heating_table_url"].as_str().unwrap_or_default().to_string(),
    ] {
        let resp = fx.client.post(&heating_table_url).json(&entry).send().await?;
        assert_eq!(resp.status(), StatusCode::CREATED, "POST {heating_table_url}");
    }
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running server at BASE_URL"]
async fn created_resources_are_served_at_their_url() -> Result<()> {
    // ---
    let fx = fixture().await?;
    let client = &fx.client;

    let imei = key();
    let user = round_trip(
        client,
        &format!("{}user/", fx.residence_url),
        json!({"imei": imei, "name": "Alice"}),
    )
    .await?;
    assert_eq!(user["imei"], imei.as_str());
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["residence"]["url"], fx.residence_url.as_str());

    let datetime = unique_start();
    let entry = round_trip(
        client,
        &format!("{}meta_entry/", fx.thermostat_url),
        json!({"datetime": datetime.to_rfc3339(), "rssi": -67, "uptime": 3600, "battery": 87}),
    )
    .await?;
    assert_eq!(entry["rssi"], -67);
    assert_eq!(entry["uptime"], 3600);
    assert_eq!(entry["battery"], 87);
    assert_eq!(entry["thermostat"]["url"], fx.thermostat_url.as_str());

    let slot = round_trip(
        client,
        &format!("{}heating_table/", fx.thermostat_url),
        json!({"day": 6, "time": "22:15", "temperature": 18.5}),
    )
    .await?;
    assert_eq!(slot["day"], 6);
    assert_eq!(slot["time"], "22:15:00");
    assert_eq!(slot["temperature"], 18.5);
    assert_eq!(slot["thermostat"]["rfid"], fx.thermostat_rfid.as_str());

    let thermostat_mac = mac();
    let device = round_trip(
        client,
        &format!("{}/device/thermostat/", base()),
        json!({"rfid": fx.thermostat_rfid, "mac": thermostat_mac}),
    )
    .await?;
    assert_eq!(device["mac"], thermostat_mac.as_str());
    assert_eq!(device["thermostat"], fx.thermostat_url.as_str());

    let raspberry = round_trip(
        client,
        &format!("{}/device/raspberry/", base()),
        json!({"rfid": fx.residence_rfid, "mac": mac()}),
    )
    .await?;
    assert_eq!(raspberry["residence"], fx.residence_url.as_str());
    assert_eq!(raspberry["thermostat_devices"][0]["rfid"], fx.thermostat_rfid.as_str());
    Ok(())
}
