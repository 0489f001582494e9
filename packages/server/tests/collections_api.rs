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
async fn service_crud_with_image_lifecycle() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    // Create with an image.
    let form = Form::new()
        .text(
            "payload",
            json!({"title": "Teeth whitening", "description": "In-office whitening"}).to_string(),
        )
        .part("image", png_part("whitening.png"));
    let resp = client
        .post(format!("{base}/api/services"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    let id = created["data"]["id"].as_i64().unwrap();
    let old_url = created["data"]["image_url"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["position"], 0);

    // Second create without a position lands at the end of the list.
    let form = Form::new().text("payload", json!({"title": "Implants"}).to_string());
    let second: Value = client
        .post(format!("{base}/api/services"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["data"]["position"], 1);

    let list: Value = reqwest::get(format!("{base}/api/services"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"].as_array().unwrap().len(), 2);
    assert_eq!(list["data"][0]["title"], "Teeth whitening");

    // Replace the image: old object is deleted after the commit.
    let form = Form::new()
        .text(
            "payload",
            json!({"title": "Teeth whitening", "description": "Updated copy"}).to_string(),
        )
        .part("image", png_part("whitening-v2.png"));
    let updated: Value = client
        .put(format!("{base}/api/services/{id}"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(updated["data"]["image_url"].as_str().unwrap(), old_url);
    assert_eq!(media.delete_count(), 1);

    // Clear the image.
    let form = Form::new().text(
        "payload",
        json!({"title": "Teeth whitening", "remove_image": true}).to_string(),
    );
    let cleared: Value = client
        .put(format!("{base}/api/services/{id}"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cleared["data"]["image_url"].is_null());
    assert!(media.inner.is_empty());

    // Delete the row.
    let resp = client
        .delete(format!("{base}/api/services/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let list: Value = reqwest::get(format!("{base}/api/services"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn updating_a_missing_service_is_a_404() {
    let (base, _media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = Form::new().text("payload", json!({"title": "Ghost"}).to_string());
    let resp = client
        .put(format!("{base}/api/services/41"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let (base, _media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = Form::new().text("payload", json!({"title": "   "}).to_string());
    let resp = client
        .post(format!("{base}/api/services"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn team_member_create_and_list() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text(
            "payload",
            json!({"name": "Dr. Elena Petrova", "role": "Orthodontist", "bio": "15 years of practice"})
                .to_string(),
        )
        .part("image", png_part("portrait.png"));
    let resp = client
        .post(format!("{base}/api/team"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    assert_eq!(media.upload_count(), 1);

    let list: Value = reqwest::get(format!("{base}/api/team"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"][0]["name"], "Dr. Elena Petrova");
    assert_eq!(list["data"][0]["role"], "Orthodontist");
    assert!(list["data"][0]["image_url"].as_str().is_some());
}

#[tokio::test]
async fn technology_delete_reaps_its_image() {
    let (base, media, _db) = spawn_app().await;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text("payload", json!({"title": "3D intraoral scanner"}).to_string())
        .part("image", png_part("scanner.png"));
    let created: Value = client
        .post(format!("{base}/api/technologies"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(media.inner.len(), 1);

    let resp = client
        .delete(format!("{base}/api/technologies/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(media.inner.is_empty());

    let list: Value = reqwest::get(format!("{base}/api/technologies"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["data"].as_array().unwrap().len(), 0);
}
