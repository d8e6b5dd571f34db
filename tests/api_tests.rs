// tests/api_tests.rs

use quiz_backend::{config::Config, routes, state::AppState};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    spawn_app_with(Config::default()).await
}

async fn spawn_app_with(config: Config) -> String {
    let state = AppState::in_memory(config)
        .await
        .expect("Failed to build in-memory state");

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn login(client: &reqwest::Client, address: &str, username: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn token_for(client: &reqwest::Client, address: &str, username: &str, password: &str) -> String {
    let body: serde_json::Value = login(client, address, username, password)
        .await
        .json()
        .await
        .expect("Failed to parse login json");
    body["token"].as_str().expect("Token not found").to_string()
}

#[tokio::test]
async fn unknown_route_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn register_works_without_logging_in() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": unique_name,
            "password": "password123",
            "confirm_password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], unique_name.as_str());
    assert_eq!(body["role"], "regular");
    assert!(body.get("token").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_password_mismatch() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "mismatch",
            "password": "password123",
            "confirm_password": "password124"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn register_rejects_short_username() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "yo",
            "password": "password123",
            "confirm_password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_rejects_taken_username() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "user1",
            "password": "whatever",
            "confirm_password": "whatever"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "duplicate_username");
}

#[tokio::test]
async fn login_errors_do_not_reveal_which_field_was_wrong() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let unknown = login(&client, &address, "nobody_here", "user123").await;
    let wrong_password = login(&client, &address, "user1", "not-it").await;

    assert_eq!(unknown.status().as_u16(), 401);
    assert_eq!(wrong_password.status().as_u16(), 401);
    let a: serde_json::Value = unknown.json().await.unwrap();
    let b: serde_json::Value = wrong_password.json().await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn login_returns_mock_token_and_summary() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = login(&client, &address, "admin", "admin123")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["token"], "mock-token-1");
    assert_eq!(body["user"]["id"], 1);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/questions/random", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .get(format!("{}/api/questions/random", address))
        .header("Authorization", "Bearer mock-token-999")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn regular_users_are_forbidden_from_admin_routes() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token_for(&client, &address, "user1", "user123").await;

    for path in ["/api/users", "/api/questions"] {
        let response = client
            .get(format!("{}{}", address, path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 403, "{}", path);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "authorization");
    }
}

#[tokio::test]
async fn me_reflects_the_session() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let token = token_for(&client, &address, "user2", "user123").await;

    let me: serde_json::Value = client
        .get(format!("{}/api/auth/me", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(me["username"], "user2");
    assert_eq!(me["role"], "regular");
}

#[tokio::test]
async fn jwt_sessions_with_hashed_passwords() {
    let config = Config {
        token_scheme: quiz_backend::config::TokenScheme::Jwt {
            secret: "test_secret_for_integration_tests".to_string(),
            expiration: 600,
        },
        hash_passwords: true,
        seed_demo_data: false,
        ..Config::default()
    };
    let address = spawn_app_with(config).await;
    let client = reqwest::Client::new();

    let token = token_for(&client, &address, "admin", "admin123").await;
    assert!(!token.starts_with("mock-token-"));

    let response = client
        .get(format!("{}/api/users", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let page: serde_json::Value = response.json().await.unwrap();
    assert_eq!(page["total"], 1);

    // A mock token is meaningless under the JWT scheme
    let response = client
        .get(format!("{}/api/users", address))
        .header("Authorization", "Bearer mock-token-1")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn end_to_end_register_login_grade() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // 1. Register, no auto-login
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "alice1",
            "password": "secret1",
            "confirm_password": "secret1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // 2. Login as regular user
    let body: serde_json::Value = login(&client, &address, "alice1", "secret1")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["user"]["role"], "regular");
    let alice_token = body["token"].as_str().unwrap().to_string();

    // 3. Wrong password
    let response = login(&client, &address, "alice1", "wrong").await;
    assert_eq!(response.status().as_u16(), 401);

    // 4. The bootstrap admin cannot be deleted
    let admin_token = token_for(&client, &address, "admin", "admin123").await;
    let response = client
        .delete(format!("{}/api/users/1", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "protected_record");

    // 5. Admin authors a true/false question
    let created: serde_json::Value = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&serde_json::json!({
            "content": "Q",
            "type": "true_false",
            "difficulty": "medium",
            "options": ["对", "错"],
            "answer": "0"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = created["id"].as_i64().unwrap();

    // 6. Alice answers "0" and earns the medium weight
    let result: serde_json::Value = client
        .post(format!("{}/api/quiz/record", address))
        .header("Authorization", format!("Bearer {}", alice_token))
        .json(&serde_json::json!({
            "questions": [question_id],
            "answers": ["0"],
            "duration": 12
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["score"], 15);
    assert_eq!(result["correct_count"], 1);
    assert_eq!(result["wrong_count"], 0);
    assert_eq!(result["outcomes"][0]["correct"], true);
    assert_eq!(result["record"]["score"], 15);
    assert_eq!(result["record"]["duration"], 12);
}
