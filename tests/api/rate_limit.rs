use crate::helpers::spawn_app_with;

#[tokio::test]
async fn requests_beyond_the_configured_limit_are_rejected_with_429() {
    // Arrange: 3 requests per hour, so no replenishment during the test
    let test_app = spawn_app_with(|c| {
        c.rate_limit.max_requests = 3;
        c.rate_limit.window_seconds = 3600;
    })
    .await;

    // Act: burn the budget with requests that never reach the store
    // (the limiter runs before validation)
    for _ in 0..3 {
        let response = test_app.post_contact(&serde_json::json!({})).await;
        assert_eq!(400, response.status().as_u16());
    }
    let response = test_app.post_contact(&serde_json::json!({})).await;

    // Assert
    assert_eq!(429, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("Too many requests"));
}

#[tokio::test]
async fn the_contact_and_subscribe_endpoints_share_one_budget() {
    // Arrange
    let test_app = spawn_app_with(|c| {
        c.rate_limit.max_requests = 3;
        c.rate_limit.window_seconds = 3600;
    })
    .await;

    // Act: exhaust the budget on the contact endpoint...
    for _ in 0..3 {
        test_app.post_contact(&serde_json::json!({})).await;
    }
    // ...and get throttled on subscribe as well
    let response = test_app.post_subscribe(&serde_json::json!({})).await;

    // Assert
    assert_eq!(429, response.status().as_u16());
}

#[tokio::test]
async fn the_unsubscribe_endpoint_is_not_rate_limited() {
    // Arrange
    let test_app = spawn_app_with(|c| {
        c.rate_limit.max_requests = 1;
        c.rate_limit.window_seconds = 3600;
    })
    .await;
    test_app.post_contact(&serde_json::json!({})).await;

    // Act: the budget is spent, but unsubscribe is not behind the limiter
    let response = test_app.get_unsubscribe("", "").await;

    // Assert: validation failure, not a 429
    assert_eq!(400, response.status().as_u16());
}
