// Presigned-upload flow against a live server. The signer itself is offline
// computation; these tests verify the handler contract end to end.

mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "requires Postgres and the built server binary"]
async fn presign_returns_scoped_urls() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::sign_up(&client, &server.base_url, "uploader").await?;

    let resp = client
        .post(format!("{}/api/uploads/presign", server.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "fileType": "image/png",
            "fileSize": 1024 * 1024,
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await?;
    let data = &body["data"];
    let file_key = data["fileKey"].as_str().unwrap();
    assert!(file_key.starts_with("recipes/"));

    let upload_url = data["uploadUrl"].as_str().unwrap();
    assert!(upload_url.contains("X-Amz-Signature="));
    assert!(upload_url.contains("X-Amz-Expires=3600"));
    // The storage secret never appears in anything sent to the client
    assert!(!upload_url.contains("secretTEST"));

    let public_url = data["publicUrl"].as_str().unwrap();
    assert_eq!(public_url, format!("https://media.ladle.test/{}", file_key));
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres and the built server binary"]
async fn oversized_presign_request_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::sign_up(&client, &server.base_url, "oversizer").await?;

    let resp = client
        .post(format!("{}/api/uploads/presign", server.base_url))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "fileType": "video/mp4",
            "fileSize": 10 * 1024 * 1024 + 1,
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}
