mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

fn card(idx: &str) -> Value {
    json!({
        "idx": idx,
        "name": "Magic Missile",
        "description": "Three glowing darts of magical force.",
        "level": 1,
        "range": "120 feet",
        "damage": "1d4 + 1",
        "area_of_effect": null,
        "school": "evocation",
        "classes": "sorcerer, wizard",
    })
}

#[tokio::test]
async fn admins_create_and_list_spell_cards() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let (_, admin_token) = server.admin().await?;
    let idx = common::unique("magic-missile-");

    let (status, body) = server
        .call(Method::POST, "/spell_cards", Some(&admin_token), Some(card(&idx)))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["spell_card"]["index"], json!(idx));
    assert_eq!(body["spell_card"]["name"], "Magic Missile");

    let (status, body) = server.call(Method::GET, "/spell_cards", Some(&admin_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let cards = body["spell_cards"].as_array().cloned().unwrap_or_default();
    assert!(cards.iter().any(|c| c["idx"] == json!(idx)));
    Ok(())
}

#[tokio::test]
async fn duplicate_spell_cards_are_rejected() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let (_, admin_token) = server.admin().await?;
    let idx = common::unique("shield-");

    let (status, _) = server
        .call(Method::POST, "/spell_cards", Some(&admin_token), Some(card(&idx)))
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = server
        .call(Method::POST, "/spell_cards", Some(&admin_token), Some(card(&idx)))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], format!("Spell card {} already exists", idx));
    Ok(())
}

#[tokio::test]
async fn catalog_is_admin_only() -> Result<()> {
    let Some(server) = common::spawn_server().await? else { return Ok(()) };
    let token = server.register(&common::unique("u")).await?;

    let (status, _) = server.call(Method::GET, "/spell_cards", Some(&token), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = server.call(Method::GET, "/spell_cards", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
