use serde_json::json;

use crate::common::{TestApp, routes};

fn alice() -> serde_json::Value {
    json!({
        "name": "Alice",
        "email": "alice@example.com",
        "mobile": "9876543210",
        "password": "securepass",
    })
}

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_can_register_with_valid_details() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(routes::REGISTER, &alice()).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["email"], "alice@example.com");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn cannot_register_twice_with_the_same_email_or_mobile() {
        let app = TestApp::spawn().await;
        let first = app.post_without_token(routes::REGISTER, &alice()).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let same_mobile = json!({
            "name": "Alicia",
            "email": "alicia@example.com",
            "mobile": "9876543210",
            "password": "securepass",
        });
        let res = app.post_without_token(routes::REGISTER, &same_mobile).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "ACCOUNT_EXISTS");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;
        let mut body = alice();
        body["password"] = json!("short");

        let res = app.post_without_token(routes::REGISTER, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_works_with_email_or_mobile() {
        let app = TestApp::spawn().await;
        app.post_without_token(routes::REGISTER, &alice()).await;

        for identifier in ["alice@example.com", "ALICE@example.com", "9876543210"] {
            let res = app
                .post_without_token(
                    routes::LOGIN,
                    &json!({"identifier": identifier, "password": "securepass"}),
                )
                .await;
            assert_eq!(res.status, 200, "{identifier}: {}", res.text);
            assert!(res.body["token"].is_string());
            assert_eq!(res.body["user"]["name"], "Alice");
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let app = TestApp::spawn().await;
        app.post_without_token(routes::REGISTER, &alice()).await;

        let wrong = app
            .post_without_token(
                routes::LOGIN,
                &json!({"identifier": "alice@example.com", "password": "nope-nope"}),
            )
            .await;
        let unknown = app
            .post_without_token(
                routes::LOGIN,
                &json!({"identifier": "bob@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(wrong.status, 401);
        assert_eq!(unknown.status, 401);
        assert_eq!(wrong.body, unknown.body);
        assert_eq!(wrong.body["code"], "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn me_returns_the_token_owner() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("Alice", "alice@example.com", "9876543210")
            .await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["mobile"], "9876543210");
    }

    #[tokio::test]
    async fn missing_and_garbage_tokens_are_distinguished() {
        let app = TestApp::spawn().await;

        let missing = app.get_without_token(routes::ME).await;
        assert_eq!(missing.status, 401);
        assert_eq!(missing.body["code"], "TOKEN_MISSING");

        let invalid = app.get_with_token(routes::ME, "not-a-jwt").await;
        assert_eq!(invalid.status, 401);
        assert_eq!(invalid.body["code"], "TOKEN_INVALID");
    }
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["message"], "Server is running");
}
