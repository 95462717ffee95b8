use crate::helpers::{TestApp, spawn_app};
use wiremock::matchers::path;
use wiremock::{Mock, ResponseTemplate};

async fn subscribe_and_get_token(test_app: &TestApp, email: &str) -> String {
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;
    test_app
        .post_subscribe(&serde_json::json!({ "email": email }))
        .await;
    test_app
        .saved_subscriber(email)
        .await
        .expect("No subscriber was persisted.")
        .unsubscribe_token
        .expect("No unsubscribe token stored.")
}

#[tokio::test]
async fn unsubscribe_deactivates_the_subscriber() {
    // Arrange
    let test_app = spawn_app().await;
    let token = subscribe_and_get_token(&test_app, "user@test.com").await;

    // Act
    let response = test_app.get_unsubscribe("user@test.com", &token).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("unsubscribed"));
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(!saved.active);
}

#[tokio::test]
async fn unsubscribe_is_idempotent() {
    // Arrange
    let test_app = spawn_app().await;
    let token = subscribe_and_get_token(&test_app, "user@test.com").await;

    // Act
    let first = test_app.get_unsubscribe("user@test.com", &token).await;
    let second = test_app.get_unsubscribe("user@test.com", &token).await;

    // Assert
    assert_eq!(200, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(!saved.active);
}

#[tokio::test]
async fn unsubscribe_treats_the_email_case_insensitively() {
    // Arrange
    let test_app = spawn_app().await;
    let token = subscribe_and_get_token(&test_app, "user@test.com").await;

    // Act
    let response = test_app.get_unsubscribe("USER@Test.com", &token).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(!saved.active);
}

#[tokio::test]
async fn unsubscribe_with_a_wrong_token_returns_404() {
    // Arrange
    let test_app = spawn_app().await;
    let _token = subscribe_and_get_token(&test_app, "user@test.com").await;

    // Act
    let response = test_app
        .get_unsubscribe("user@test.com", "not-the-right-token")
        .await;

    // Assert
    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid unsubscribe link");
    // The subscriber is untouched
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(saved.active);
}

#[tokio::test]
async fn unsubscribe_with_an_unknown_email_returns_404() {
    // Arrange
    let test_app = spawn_app().await;
    let token = subscribe_and_get_token(&test_app, "user@test.com").await;

    // Act: valid token, wrong email — must be indistinguishable from a
    // token that never existed.
    let response = test_app.get_unsubscribe("other@test.com", &token).await;

    // Assert
    assert_eq!(404, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid unsubscribe link");
}

#[tokio::test]
async fn unsubscribe_with_missing_parameters_returns_400() {
    // Arrange
    let test_app = spawn_app().await;
    let test_cases = vec![
        (("user@test.com", ""), "missing the token"),
        (("", "some-token"), "missing the email"),
        (("", ""), "missing both"),
    ];

    for ((email, token), error_message) in test_cases {
        // Act
        let response = test_app.get_unsubscribe(email, token).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when {}.",
            error_message
        );
    }
}
