//! Multipart uploads: stored under the upload directory, served back, and
//! cleaned up when the request fails.

use std::path::Path;

use axum::http::{Method, StatusCode};

use integration_tests::http::{Multipart, TestApp, JPEG, MAX_FILES, PNG};

fn pet_form(name: &str) -> Multipart {
    Multipart::new()
        .text("name", name)
        .text("type", "cat")
        .text("breed", "Tabby")
        .text("age", r#"{"value": 1, "unit": "years"}"#)
        .text("gender", "male")
        .text("size", "small")
        .text("color", "Orange")
        .text("description", "Loves naps")
        .text("adoptionFee", "25")
        .text("characteristics", "calm, playful")
}

fn stored_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn pet_photos_are_stored_and_served() {
    let app = TestApp::new();
    let (token, _) = app.register("Owen").await;

    let form = pet_form("Ginger")
        .file("images", "ginger.png", "image/png", PNG)
        .file("images", "ginger.jpg", "image/jpeg", JPEG);
    let (status, body) = app.multipart(Method::POST, "/api/pets", Some(&token), form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let pet = &body["data"]["pet"];
    assert_eq!(pet["adoptionFee"], 25.0);
    assert_eq!(pet["characteristics"], serde_json::json!(["calm", "playful"]));
    let images: Vec<&str> = pet["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|p| p.starts_with("/uploads/images-")));
    assert!(images[0].ends_with(".png"));
    assert!(images[1].ends_with(".jpg"));
    assert_eq!(stored_files(app.uploads.path()).len(), 2);

    let (status, _) = app.get(images[0], None).await;
    assert_eq!(status, StatusCode::OK);

    let pet_id = pet["id"].as_str().unwrap();
    let (status, _) = app.delete(&format!("/api/pets/{pet_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stored_files(app.uploads.path()).is_empty());
}

#[tokio::test]
async fn non_images_are_rejected_without_leaving_files() {
    let app = TestApp::new();
    let (token, _) = app.register("Owen").await;

    let form = pet_form("Ginger")
        .file("images", "ginger.png", "image/png", PNG)
        .file("images", "notes.txt", "text/plain", b"definitely not a picture");
    let (status, body) = app.multipart(Method::POST, "/api/pets", Some(&token), form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "only image files are allowed");
    assert!(stored_files(app.uploads.path()).is_empty());
}

#[tokio::test]
async fn rejected_pets_release_their_uploads() {
    let app = TestApp::new();
    let (token, _) = app.register("Owen").await;

    let form = Multipart::new()
        .text("name", "Ginger")
        .text("type", "cat")
        .text("breed", "Tabby")
        .text("age", r#"{"value": -1, "unit": "years"}"#)
        .text("gender", "male")
        .text("size", "small")
        .text("color", "Orange")
        .text("description", "Loves naps")
        .file("images", "ginger.png", "image/png", PNG);
    let (status, body) = app.multipart(Method::POST, "/api/pets", Some(&token), form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "age cannot be negative");
    assert!(stored_files(app.uploads.path()).is_empty());
}

#[tokio::test]
async fn too_many_files_are_rejected() {
    let app = TestApp::new();
    let (token, _) = app.register("Owen").await;

    let mut form = pet_form("Ginger");
    for i in 0..=MAX_FILES {
        form = form.file("images", &format!("{i}.png"), "image/png", PNG);
    }
    let (status, body) = app.multipart(Method::POST, "/api/pets", Some(&token), form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("at most {MAX_FILES} files can be uploaded at once")
    );
    assert!(stored_files(app.uploads.path()).is_empty());
}

#[tokio::test]
async fn files_under_the_wrong_field_are_rejected() {
    let app = TestApp::new();
    let (token, _) = app.register("Owen").await;

    let form = pet_form("Ginger").file("photos", "ginger.png", "image/png", PNG);
    let (status, body) = app.multipart(Method::POST, "/api/pets", Some(&token), form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("photos"));
    assert!(stored_files(app.uploads.path()).is_empty());
}

#[tokio::test]
async fn post_images_are_appended_after_body_paths() {
    let app = TestApp::new();
    let (token, _) = app.register("Ann").await;

    let form = Multipart::new()
        .text("content", "New photos!")
        .text("images", "/uploads/images-existing.jpg")
        .file("images", "a.png", "image/png", PNG);
    let (status, body) = app.multipart(Method::POST, "/api/posts", Some(&token), form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let images = body["data"]["post"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], "/uploads/images-existing.jpg");
    assert!(images[1].as_str().unwrap().starts_with("/uploads/images-"));
}

#[tokio::test]
async fn avatar_upload_replaces_the_previous_file() {
    let app = TestApp::new();
    let (token, _) = app.register("Ada").await;

    let first = Multipart::new().file("image", "me.png", "image/png", PNG);
    let (status, body) = app
        .multipart(Method::POST, "/api/auth/avatar", Some(&token), first)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let avatar = body["data"]["user"]["avatar"].as_str().unwrap().to_owned();
    assert!(avatar.starts_with("/uploads/image-"));
    assert_eq!(stored_files(app.uploads.path()).len(), 1);

    let second = Multipart::new().file("image", "me.jpg", "image/jpeg", JPEG);
    let (status, body) = app
        .multipart(Method::POST, "/api/auth/avatar", Some(&token), second)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_ne!(body["data"]["user"]["avatar"], avatar.as_str());
    let files = stored_files(app.uploads.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".jpg"));

    let (status, _) = app
        .multipart(Method::POST, "/api/auth/avatar", Some(&token), Multipart::new())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
