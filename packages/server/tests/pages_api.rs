mod support;

use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use support::spawn_app;

fn png_part(name: &str) -> Part {
    Part::bytes(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn reading_an_absent_page_returns_null_data() {
    let (base, _media, _db) = spawn_app().await;

    let resp = reqwest::get(format!("{base}/api/pages/safe")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn unknown_kind_is_a_404_with_error_envelope() {
    let (base, _media, _db) = spawn_app().await;

    let resp = reqwest::get(format!("{base}/api/pages/blog")).await.unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("blog"));
}

#[tokio::test]
async fn page_write_read_round_trip_with_section_image() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let payload = json!({
        "title": "Safe treatment",
        "sections": [
            {"title": "A", "description": "d1", "card_style": "CARDSTYLE1", "position": 0}
        ]
    });
    let form = Form::new()
        .text("payload", payload.to_string())
        .part("section_image_0", png_part("xray.png"));

    let resp = client
        .post(format!("{base}/api/pages/safe"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    let section = &body["data"]["sections"][0];
    assert_eq!(section["title"], "A");
    assert_eq!(section["card_style"], "CARDSTYLE1");
    assert!(section["image_url"].as_str().is_some());
    assert_eq!(media.upload_count(), 1);

    let read: Value = reqwest::get(format!("{base}/api/pages/safe"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read["data"]["title"], "Safe treatment");
    assert_eq!(read["data"]["sections"][0]["image_url"], section["image_url"]);
}

#[tokio::test]
async fn replacing_a_section_image_over_http_swaps_the_url() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let create = json!({"sections": [{"title": "A", "position": 0}]});
    let form = Form::new()
        .text("payload", create.to_string())
        .part("section_image_0", png_part("v1.png"));
    let created: Value = client
        .post(format!("{base}/api/pages/precise"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let section_id = created["data"]["sections"][0]["id"].as_i64().unwrap();
    let old_url = created["data"]["sections"][0]["image_url"]
        .as_str()
        .unwrap()
        .to_string();

    let update = json!({"sections": [{"id": section_id, "title": "A", "position": 0}]});
    let form = Form::new()
        .text("payload", update.to_string())
        .part("section_image_0", png_part("v2.png"));
    let resp = client
        .put(format!("{base}/api/pages/precise"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    let new_url = body["data"]["sections"][0]["image_url"].as_str().unwrap();
    assert_ne!(new_url, old_url);
    assert_eq!(body["data"]["sections"][0]["id"].as_i64().unwrap(), section_id);

    // The superseded object was deleted after the commit.
    assert_eq!(media.delete_count(), 1);
    assert_eq!(media.inner.len(), 1);
}

#[tokio::test]
async fn homepage_background_honors_explicit_kind() {
    let (base, _media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let payload = json!({"background_kind": "video"});
    let form = Form::new()
        .text("payload", payload.to_string())
        .part(
            "background",
            Part::bytes(vec![0u8; 32])
                .file_name("tour.mp4")
                .mime_str("video/mp4")
                .unwrap(),
        );

    let body: Value = client
        .post(format!("{base}/api/pages/homepage"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"]["background"]["kind"], "video");
    assert!(body["data"]["background"]["url"].as_str().is_some());
}

#[tokio::test]
async fn invalid_card_style_is_rejected() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let payload = json!({"sections": [{"title": "A", "card_style": "CARDSTYLE9"}]});
    let form = Form::new().text("payload", payload.to_string());
    let resp = client
        .post(format!("{base}/api/pages/safe"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("card_style"));
    assert_eq!(media.upload_count(), 0);
}

#[tokio::test]
async fn missing_payload_field_is_rejected() {
    let (base, _media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = Form::new().part("section_image_0", png_part("stray.png"));
    let resp = client
        .put(format!("{base}/api/pages/safe"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("payload"));
}

#[tokio::test]
async fn deleting_a_page_cascades_and_then_404s() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let payload = json!({"sections": [{"title": "A", "position": 0}]});
    let form = Form::new()
        .text("payload", payload.to_string())
        .part("section_image_0", png_part("a.png"));
    client
        .post(format!("{base}/api/pages/personal"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(media.inner.len(), 1);

    let resp = client
        .delete(format!("{base}/api/pages/personal"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(media.inner.is_empty());

    let resp = client
        .delete(format!("{base}/api/pages/personal"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
