//! End-to-end HTTP test: in-process router on an ephemeral port, in-memory store,
//! bearer tokens signed with the same secret the server verifies.

use serde_json::{json, Value};
use std::sync::Arc;
use waitlist_points::crypto::jwt::sign_token;
use waitlist_points::domain::model::NewAccount;
use waitlist_points::transport::http::{create_router, AppState};
use waitlist_points::{MemoryStore, ReportedBalance, ServiceSettings, Store, User, WaitlistService};

const SECRET: &str = "integration-secret";

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    store: Arc<MemoryStore>,
}

impl TestApp {
    async fn spawn() -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let service = WaitlistService::new(
            store.clone(),
            Arc::new(ReportedBalance),
            ServiceSettings {
                hidden_handle: "@sprout".to_string(),
                share_base_url: "https://waitlist.example".to_string(),
            },
        );
        let router = create_router(AppState {
            service: Arc::new(service),
            jwt_secret: Arc::from(SECRET),
        });

        // Bind to an ephemeral port to avoid conflicts with a running server.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, user: &str, path: &str) -> Result<(u16, Value), Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token_for(user)?)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    async fn post(
        &self,
        user: &str,
        path: &str,
        body: Value,
    ) -> Result<(u16, Value), Box<dyn std::error::Error>> {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token_for(user)?)
            .json(&body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    async fn seed(&self, id: &str, code: &str, points: i64) -> Result<(), Box<dyn std::error::Error>> {
        self.store
            .insert_account(NewAccount {
                id: id.to_string(),
                email: Some(format!("{id}@example.com")),
                twitter_handle: format!("@{id}"),
                invitation_code: code.to_string(),
                invited_by_account_id: None,
                total_points: points,
            })
            .await?;
        Ok(())
    }
}

fn token_for(id: &str) -> Result<String, Box<dyn std::error::Error>> {
    let user = User {
        id: id.to_string(),
        email: Some(format!("{id}@example.com")),
        preferred_username: Some(id.to_string()),
    };
    let now = chrono::Utc::now().timestamp() as u64;
    Ok(sign_token(&user, SECRET, now, 3600)?)
}

#[tokio::test]
async fn test_health_and_auth() -> Result<(), Box<dyn std::error::Error>> {
    let app = TestApp::spawn().await?;

    let health = app.client.get(app.url("/health")).send().await?;
    assert_eq!(health.status().as_u16(), 200);

    let anonymous = app.client.get(app.url("/api/account")).send().await?;
    assert_eq!(anonymous.status().as_u16(), 401);
    let body: Value = anonymous.json().await?;
    assert_eq!(body["success"], false);

    let forged = app
        .client
        .get(app.url("/api/account"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(forged.status().as_u16(), 401);

    // A valid token without an account reads as `data: null`.
    let (status, body) = app.get("nobody", "/api/account").await?;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(body["data"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_claim_flow() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- test_claim_flow ---");
    let app = TestApp::spawn().await?;
    app.seed("ref", "refcode1", 0).await?;

    let (status, body) = app
        .post("alice", "/api/invitation/claim", json!({"code": "refcode1"}))
        .await?;
    assert_eq!(status, 200, "claim failed: {body}");
    assert_eq!(body["data"]["status"], "created");
    assert_eq!(body["data"]["sign_up_points"], 100);
    assert_eq!(body["data"]["account"]["invited_by_account_id"], "ref");

    let (status, body) = app
        .post("alice", "/api/invitation/claim", json!({"code": "refcode1"}))
        .await?;
    assert_eq!(status, 409);
    assert_eq!(body["data"]["status"], "already_registered");

    let (status, body) = app
        .post("bob", "/api/invitation/claim", json!({"code": "bogus"}))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .post("bob", "/api/invitation/claim", json!({"wrong": 1}))
        .await?;
    assert_eq!(status, 422);

    app.store.insert_blacklist("carol@example.com", None).await?;
    let (status, body) = app
        .post("carol", "/api/invitation/claim", json!({"code": "refcode1"}))
        .await?;
    assert_eq!(status, 403);
    assert_eq!(body["data"]["status"], "banned");
    let (_, body) = app.get("carol", "/api/account/banned").await?;
    assert_eq!(body["data"]["email"], "carol@example.com");

    let (_, body) = app.get("ref", "/api/account").await?;
    assert_eq!(body["data"]["total_points"], 500);
    assert_eq!(body["data"]["invited_accounts_count"], 1);

    let (_, body) = app.get("ref", "/api/points").await?;
    let notes: Vec<&str> = body["data"]
        .as_array()
        .expect("points array")
        .iter()
        .filter_map(|p| p["note"].as_str())
        .collect();
    assert_eq!(notes, ["Referral of @alice"]);
    Ok(())
}

#[tokio::test]
async fn test_wallet_and_tasks() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- test_wallet_and_tasks ---");
    let app = TestApp::spawn().await?;
    app.seed("ref", "refcode1", 0).await?;
    app.post("alice", "/api/invitation/claim", json!({"code": "refcode1"}))
        .await?;

    let (_, body) = app.get("alice", "/api/wallet").await?;
    assert_eq!(body["data"]["connected"], false);

    let (status, _) = app
        .post("alice", "/api/wallet/connect", json!({"principal_id": "  "}))
        .await?;
    assert_eq!(status, 400);

    let (status, body) = app
        .post(
            "alice",
            "/api/wallet/connect",
            json!({"principal_id": "wallet-alice", "balance": 80000}),
        )
        .await?;
    assert_eq!(status, 200, "connect failed: {body}");
    assert_eq!(body["data"]["status"], "connected");
    assert_eq!(body["data"]["points_awarded"], 2000);

    let (_, body) = app
        .post(
            "alice",
            "/api/wallet/connect",
            json!({"principal_id": "wallet-alice", "balance": 80000}),
        )
        .await?;
    assert_eq!(body["data"]["status"], "already_connected");

    let (status, body) = app
        .post("alice", "/api/wallet/balance", json!({"balance": 260000}))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["points_awarded"], 3000);
    assert_eq!(body["data"]["new_total_points"], 100 + 2000 + 3000);

    let (status, _) = app
        .post("ref", "/api/wallet/balance", json!({"balance": 1}))
        .await?;
    assert_eq!(status, 404);

    let (status, _) = app.get("alice", "/api/tasks/instagram").await?;
    assert_eq!(status, 404);

    let (status, body) = app
        .post("alice", "/api/tasks/youtube_subscribe/complete", json!({}))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["points"], 100);

    let (status, body) = app
        .post("alice", "/api/tasks/youtube_subscribe/complete", json!({}))
        .await?;
    assert_eq!(status, 409);
    assert_eq!(body["data"]["status"], "already_completed");

    let (_, body) = app.get("alice", "/api/tasks/youtube_subscribe").await?;
    assert_eq!(body["data"]["completed"], true);

    let (status, _) = app
        .post("ghost", "/api/tasks/dev_follow/complete", json!({}))
        .await?;
    assert_eq!(status, 404);

    // 500 sign-up referral + 200 wallet share + 10 task share
    let (_, body) = app.get("ref", "/api/account").await?;
    assert_eq!(body["data"]["total_points"], 710);
    Ok(())
}

#[tokio::test]
async fn test_leaderboard_and_share() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- test_leaderboard_and_share ---");
    let app = TestApp::spawn().await?;
    app.seed("sprout", "sprout01", 999_999).await?;
    for i in 0..12 {
        app.seed(&format!("user{i:02}"), &format!("code{i:04}"), 1000 - i * 10)
            .await?;
    }

    let (_, body) = app.get("user00", "/api/leaderboard/count").await?;
    assert_eq!(body["data"]["total"], 12);

    let (_, body) = app.get("user00", "/api/leaderboard").await?;
    let page = body["data"].as_array().expect("leaderboard array");
    assert_eq!(page.len(), 10);
    assert_eq!(page[0]["id"], "user00");
    assert_eq!(page[0]["rank"], 1);

    let (_, body) = app.get("user00", "/api/leaderboard?start=10&end=20").await?;
    let page = body["data"].as_array().expect("leaderboard array");
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["rank"], 11);

    let (status, _) = app.get("user00", "/api/leaderboard?start=-1").await?;
    assert_eq!(status, 400);

    let (_, body) = app.get("user03", "/api/leaderboard/position").await?;
    assert_eq!(body["data"]["rank"], 5);
    let (_, body) = app.get("ghost", "/api/leaderboard/position").await?;
    assert!(body["data"].is_null());

    let (status, body) = app.get("user01", "/api/share").await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["link"], "https://waitlist.example/?ref=code0001");
    assert!(body["data"]["text"]
        .as_str()
        .unwrap_or_default()
        .contains("https://waitlist.example/?ref=code0001"));

    let (status, _) = app.get("ghost", "/api/share").await?;
    assert_eq!(status, 404);
    Ok(())
}

#[tokio::test]
async fn test_leaderboard_range_edges() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- test_leaderboard_range_edges ---");
    let app = TestApp::spawn().await?;
    for i in 0..3 {
        app.seed(&format!("user{i:02}"), &format!("code{i:04}"), 100 - i)
            .await?;
    }

    let (status, body) = app
        .get("user00", "/api/leaderboard?start=0&end=9223372036854775807")
        .await?;
    assert_eq!(status, 200, "huge end: {body}");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(3));

    let (status, body) = app
        .get("user00", "/api/leaderboard?start=9223372036854775807")
        .await?;
    assert_eq!(status, 200, "huge start: {body}");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let (status, body) = app.get("user00", "/api/leaderboard?start=2&end=1").await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_wallet_input_errors() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- test_wallet_input_errors ---");
    let app = TestApp::spawn().await?;
    app.seed("alice", "alice001", 100).await?;
    app.seed("bob", "bob00001", 100).await?;

    let (status, body) = app
        .post(
            "alice",
            "/api/wallet/connect",
            json!({"principal_id": "wallet-alice", "balance": -5.0}),
        )
        .await?;
    assert_eq!(status, 400, "negative balance: {body}");
    assert_eq!(body["success"], false);

    let (_, body) = app.get("alice", "/api/wallet").await?;
    assert_eq!(body["data"]["connected"], false);

    // No reported balance counts as an empty wallet.
    let (status, body) = app
        .post("alice", "/api/wallet/connect", json!({"principal_id": "wallet-alice"}))
        .await?;
    assert_eq!(status, 200, "omitted balance: {body}");
    assert_eq!(body["data"]["points_awarded"], 200);

    let (status, body) = app
        .post("alice", "/api/wallet/balance", json!({"balance": -1.0}))
        .await?;
    assert_eq!(status, 400, "negative refresh: {body}");

    let (status, body) = app.post("alice", "/api/wallet/balance", json!({})).await?;
    assert_eq!(status, 200, "omitted refresh: {body}");
    assert_eq!(body["data"]["points_awarded"], 0);
    assert_eq!(body["data"]["new_total_points"], 300);

    // Without a connected wallet the balance route has nothing to refresh.
    let (status, _) = app
        .post("bob", "/api/wallet/balance", json!({"balance": -1.0}))
        .await?;
    assert_eq!(status, 404);
    Ok(())
}
