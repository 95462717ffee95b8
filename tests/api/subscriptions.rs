use crate::helpers::{spawn_app, spawn_app_with};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn subscribe_returns_201_and_sends_welcome_and_admin_emails() {
    // Arrange
    let test_app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    // Act
    let response = test_app
        .post_subscribe(&serde_json::json!({
            "email": "user@test.com",
            "firstName": "Ursula",
            "lastName": "Le Guin"
        }))
        .await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Successfully subscribed")
    );
}

#[tokio::test]
async fn subscribe_persists_an_active_subscriber_with_an_unsubscribe_token() {
    // Arrange
    let test_app = spawn_app().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    // Act
    test_app
        .post_subscribe(&serde_json::json!({"email": " User@Test.COM "}))
        .await;

    // Assert
    let saved = test_app
        .saved_subscriber("user@test.com")
        .await
        .expect("No subscriber was persisted.");
    assert_eq!(saved.email, "user@test.com");
    assert!(saved.active);
    assert!(!saved.pdf_sent);
    let token = saved.unsubscribe_token.expect("No unsubscribe token stored.");
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn subscribing_twice_is_reported_as_already_subscribed() {
    // Arrange
    let test_app = spawn_app().await;
    // Only the first subscription triggers emails (welcome + admin)
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    // Act
    let first = test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;
    // Case-differing email resolves to the same subscriber
    let second = test_app
        .post_subscribe(&serde_json::json!({"email": "USER@test.com"}))
        .await;

    // Assert
    assert_eq!(201, first.status().as_u16());
    assert_eq!(200, second.status().as_u16());
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("already subscribed")
    );
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
        .fetch_one(&test_app.connection_pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn resubscribing_after_unsubscribe_sends_only_the_welcome_email() {
    // Arrange
    let test_app = spawn_app().await;
    // Two emails for the initial subscription, one more for the resubscribe
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&test_app.email_server)
        .await;
    test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;
    let token = test_app
        .saved_subscriber("user@test.com")
        .await
        .unwrap()
        .unsubscribe_token
        .unwrap();
    test_app.get_unsubscribe("user@test.com", &token).await;

    // Act
    let response = test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("resubscribed"));
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(saved.active);
}

#[tokio::test]
async fn subscribe_returns_400_for_missing_or_invalid_email() {
    // Arrange
    let test_app = spawn_app().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;
    let test_cases = vec![
        (serde_json::json!({}), "missing the email"),
        (serde_json::json!({"email": ""}), "empty email"),
        (
            serde_json::json!({"email": "definitely-not-an-email"}),
            "invalid email",
        ),
    ];

    for (invalid_body, error_message) in test_cases {
        // Act
        let response = test_app.post_subscribe(&invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
    }
}

#[tokio::test]
async fn the_welcome_email_contains_a_working_unsubscribe_link() {
    // Arrange
    let test_app = spawn_app().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    // Act
    test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;

    // Assert
    let requests = test_app.email_server.received_requests().await.unwrap();
    // The welcome email goes out first, before the admin notification
    let welcome_body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(welcome_body["To"], "user@test.com");
    let link = test_app.extract_link(&requests[0]);
    assert_eq!(link.host_str(), Some("frontend.example.com"));
    assert_eq!(link.path(), "/unsubscribe");
    let query: std::collections::HashMap<_, _> = link.query_pairs().into_owned().collect();
    assert_eq!(query["email"], "user@test.com");
    let stored_token = test_app
        .saved_subscriber("user@test.com")
        .await
        .unwrap()
        .unsubscribe_token
        .unwrap();
    assert_eq!(query["token"], stored_token);

    // The link round-trips through the unsubscribe endpoint
    let response = test_app
        .get_unsubscribe(&query["email"], &query["token"])
        .await;
    assert_eq!(200, response.status().as_u16());
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(!saved.active);
}

#[tokio::test]
async fn subscribe_returns_500_but_keeps_the_subscriber_when_email_delivery_fails() {
    // Arrange
    let test_app = spawn_app().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&test_app.email_server)
        .await;

    // Act
    let response = test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    // Persistence happened before the notification attempt; no rollback.
    let saved = test_app
        .saved_subscriber("user@test.com")
        .await
        .expect("The subscriber should have been persisted.");
    assert!(saved.active);
    assert!(saved.unsubscribe_token.is_some());
}

#[tokio::test]
async fn the_pdf_guide_is_attached_when_the_asset_exists() {
    // Arrange
    let pdf_path = std::env::temp_dir().join(format!("ai-tricks-{}.pdf", Uuid::new_v4()));
    std::fs::write(&pdf_path, b"%PDF-1.4 test guide").unwrap();
    let test_app = {
        let pdf_path = pdf_path.clone();
        spawn_app_with(move |c| c.notifications.pdf_guide_path = pdf_path).await
    };
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    // Act
    test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;

    // Assert
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(saved.pdf_sent);
    let requests = test_app.email_server.received_requests().await.unwrap();
    let welcome_body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let attachments = welcome_body["Attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["Name"], "AI-Tricks-Guide.pdf");
    std::fs::remove_file(&pdf_path).ok();
}

#[tokio::test]
async fn the_welcome_email_is_sent_without_attachment_when_the_asset_is_missing() {
    // Arrange
    let test_app = spawn_app().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&test_app.email_server)
        .await;

    // Act
    let response = test_app
        .post_subscribe(&serde_json::json!({"email": "user@test.com"}))
        .await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let saved = test_app.saved_subscriber("user@test.com").await.unwrap();
    assert!(!saved.pdf_sent);
    let requests = test_app.email_server.received_requests().await.unwrap();
    let welcome_body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(welcome_body.get("Attachments").is_none());
}
