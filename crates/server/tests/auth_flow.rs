mod support;

use axum::http::StatusCode;
use serde_json::json;

use support::{app, call, signup, unique};

#[tokio::test]
async fn signup_login_and_profile() -> anyhow::Result<()> {
    let Some(app) = app().await else { return Ok(()) };
    let username = unique("flow");
    let password = "S3curePass!";

    let (status, body) = call(&app, "POST", "/users", None, Some(json!({
        "username": username, "password": password, "first_name": "Ada", "last_name": "Lovelace"
    })))
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], username.as_str());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = call(&app, "POST", "/users", None, Some(json!({
        "username": username, "password": password, "first_name": "Ada", "last_name": "Lovelace"
    })))
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");

    let (status, _) = call(&app, "POST", "/authenticate", None, Some(json!({"username": username, "password": "wrong-pass"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, "POST", "/authenticate", None, Some(json!({"username": unique("ghost"), "password": password}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, "POST", "/authenticate", None, Some(json!({"username": username, "password": password}))).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = call(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["first_name"], "Ada");

    let (status, me) = call(&app, "GET", &format!("/users/me?access_token={token}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], username.as_str());

    let (status, me) = call(&app, "PUT", "/users/me", Some(&token), Some(json!({"last_name": "King"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["last_name"], "King");
    assert_eq!(me["first_name"], "Ada");
    Ok(())
}

#[tokio::test]
async fn signup_validation_errors() -> anyhow::Result<()> {
    let Some(app) = app().await else { return Ok(()) };
    let (status, body) = call(&app, "POST", "/users", None, Some(json!({
        "username": unique("short"), "password": "abc", "first_name": "A", "last_name": "B"
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, _) = call(&app, "POST", "/users", None, Some(json!({
        "username": "no spaces allowed", "password": "Passw0rd!", "first_name": "A", "last_name": "B"
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn password_change_and_account_deletion() -> anyhow::Result<()> {
    let Some(app) = app().await else { return Ok(()) };
    let (token, _) = signup(&app, "pwchange").await;
    let (_, me) = call(&app, "GET", "/users/me", Some(&token), None).await;
    let username = me["username"].as_str().unwrap().to_string();

    let (status, _) = call(&app, "PUT", "/users/me", Some(&token), Some(json!({"password": "NewPassw0rd"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, "PUT", "/users/me", Some(&token), Some(json!({"password": "NewPassw0rd", "current_password": "bad-guess"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // a rejected profile leaves the password alone
    let (status, body) = call(&app, "PUT", "/users/me", Some(&token), Some(json!({
        "password": "Brandnew99", "current_password": "Passw0rd!", "first_name": "   "
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "first_name required");
    let (status, _) = call(&app, "POST", "/authenticate", None, Some(json!({"username": username, "password": "Passw0rd!"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "POST", "/authenticate", None, Some(json!({"username": username, "password": "Brandnew99"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, "PUT", "/users/me", Some(&token), Some(json!({"password": "NewPassw0rd", "current_password": "Passw0rd!"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "POST", "/authenticate", None, Some(json!({"username": username, "password": "NewPassw0rd"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "DELETE", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "GET", "/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, "POST", "/authenticate", None, Some(json!({"username": username, "password": "NewPassw0rd"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
