// End-to-end recipe CRUD against a live server and database. Run with:
//   cargo build && cargo test -- --ignored
// DATABASE_URL must point at a migrated Postgres.

mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "requires Postgres and the built server binary"]
async fn repeated_titles_get_distinct_slugs() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::sign_up(&client, &server.base_url, "slug-user").await?;

    let first = common::create_recipe(&client, &server.base_url, &token, "Tomato Soup").await?;
    let second = common::create_recipe(&client, &server.base_url, &token, "Tomato Soup").await?;

    let slug_a = first["slug"].as_str().unwrap();
    let slug_b = second["slug"].as_str().unwrap();
    assert_ne!(slug_a, slug_b);
    for slug in [slug_a, slug_b] {
        assert!(slug.starts_with("tomato-soup-"));
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres and the built server binary"]
async fn defaults_apply_when_fields_omitted() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::sign_up(&client, &server.base_url, "defaults-user").await?;

    let recipe = common::create_recipe(&client, &server.base_url, &token, "Plain Rice").await?;
    assert_eq!(recipe["category"], "General");
    assert_eq!(recipe["status"], "published");
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres and the built server binary"]
async fn cross_owner_update_and_delete_are_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let owner = common::sign_up(&client, &server.base_url, "owner").await?;
    let intruder = common::sign_up(&client, &server.base_url, "intruder").await?;

    let recipe = common::create_recipe(&client, &server.base_url, &owner, "Secret Sauce").await?;
    let id = recipe["id"].as_str().unwrap();

    let resp = client
        .put(format!("{}/api/recipes/{}", server.base_url, id))
        .bearer_auth(&intruder)
        .json(&serde_json::json!({
            "title": "Stolen Sauce",
            "ingredients": [],
            "steps": [],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(format!("{}/api/recipes/{}", server.base_url, id))
        .bearer_auth(&intruder)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The recipe is unchanged for its owner
    let slug = recipe["slug"].as_str().unwrap();
    let resp = client
        .get(format!("{}/api/recipes/{}", server.base_url, slug))
        .bearer_auth(&owner)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["data"]["title"], "Secret Sauce");
    Ok(())
}

#[tokio::test]
#[ignore = "requires Postgres and the built server binary"]
async fn update_preserves_slug() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::sign_up(&client, &server.base_url, "renamer").await?;

    let recipe = common::create_recipe(&client, &server.base_url, &token, "Old Name").await?;
    let id = recipe["id"].as_str().unwrap();
    let original_slug = recipe["slug"].as_str().unwrap();

    let resp = client
        .put(format!("{}/api/recipes/{}", server.base_url, id))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "Completely New Name",
            "ingredients": [],
            "steps": [],
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["data"]["slug"], original_slug);
    assert_eq!(body["data"]["title"], "Completely New Name");
    Ok(())
}
