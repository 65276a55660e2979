//! Integration tests for the YLT backend.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::{Credentials, LockoutPolicy};
use crate::config::Config;
use crate::db::{init_database, SqliteStore};
use crate::{create_router, AppState};

const ADMIN_EMAIL: &str = "chair@ylt.org";
const ADMIN_PASSWORD: &str = "correct-horse";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let config = Config {
            db_path: db_path.clone(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            credentials: Credentials {
                email: ADMIN_EMAIL.to_string(),
                password: Some(ADMIN_PASSWORD.to_string()),
            },
            lockout: LockoutPolicy::default(),
        };

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let state = AppState::new(SqliteStore::new(pool), &config);

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_member(&self, name: &str, email: &str, department: &str) -> i64 {
        let resp = self
            .client
            .post(self.url("/api/members"))
            .json(&json!({
                "fullName": name,
                "email": email,
                "department": department
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_i64().unwrap()
    }

    async fn create_experience(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/experiences"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }

    async fn login(&self, password: &str) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": password }))
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_login_success() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.login(ADMIN_PASSWORD).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["outcome"], "success");
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_lockout_after_three_failures() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.login("wrong").await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["outcome"], "invalidCredentials");
    assert_eq!(body["data"]["attemptsRemaining"], 2);

    let (_, body) = fixture.login("wrong").await;
    assert_eq!(body["data"]["attemptsRemaining"], 1);

    let (status, body) = fixture.login("wrong").await;
    assert_eq!(status, 429);
    assert_eq!(body["data"]["outcome"], "locked");
    assert_eq!(body["data"]["secondsRemaining"], 300);

    // The right password is refused while locked
    let (status, _) = fixture.login(ADMIN_PASSWORD).await;
    assert_eq!(status, 429);

    let resp = fixture
        .client
        .get(fixture.url("/api/auth/lockout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["locked"], true);
    let remaining = body["data"]["secondsRemaining"].as_u64().unwrap();
    assert!(remaining > 290 && remaining <= 300);
}

#[tokio::test]
async fn test_member_crud() {
    let fixture = TestFixture::new().await;

    // Create member
    let create_resp = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({
            "fullName": "Efua Boateng",
            "email": "efua@ylt.org",
            "department": "Outreach",
            "age": 19,
            "skills": ["Public Speaking", "Public Speaking", "Mentoring"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    assert_eq!(create_body["success"], true);
    let member_id = create_body["data"]["id"].as_i64().unwrap();
    assert_eq!(create_body["data"]["fullName"], "Efua Boateng");
    assert_eq!(
        create_body["data"]["skills"],
        json!(["Public Speaking", "Mentoring"])
    );

    // Get member
    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/members/{}", member_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(get_resp.status(), 200);
    let get_body: Value = get_resp.json().await.unwrap();
    assert_eq!(get_body["data"]["email"], "efua@ylt.org");

    // Update member
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/members/{}", member_id)))
        .json(&json!({ "department": "Executive" }))
        .send()
        .await
        .unwrap();

    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["department"], "Executive");
    assert_eq!(update_body["data"]["fullName"], "Efua Boateng");

    // List members
    let list_resp = fixture
        .client
        .get(fixture.url("/api/members"))
        .send()
        .await
        .unwrap();

    assert_eq!(list_resp.status(), 200);
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    // Delete member
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/members/{}", member_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    // Verify deleted
    let get_deleted_resp = fixture
        .client
        .get(fixture.url(&format!("/api/members/{}", member_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(get_deleted_resp.status(), 404);
    let body: Value = get_deleted_resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_email_conflict() {
    let fixture = TestFixture::new().await;
    fixture
        .create_member("Kwame Asante", "kwame@ylt.org", "Finance")
        .await;

    let resp = fixture
        .client
        .post(fixture.url("/api/members"))
        .json(&json!({
            "fullName": "Someone Else",
            "email": "Kwame@ylt.org",
            "department": "Events"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["details"]["field"], "email");
}

#[tokio::test]
async fn test_experience_crud_and_filters() {
    let fixture = TestFixture::new().await;
    let member_id = fixture
        .create_member("Nana Adjei", "nana@ylt.org", "Events")
        .await;

    let finished = fixture
        .create_experience(json!({
            "memberId": member_id,
            "role": "Coordinator",
            "department": "Events",
            "description": { "en": "Ran the spring fair", "fr": "A organisé la foire" },
            "startDate": "2020-01-01",
            "endDate": "2020-03-01",
            "skillsGained": ["Logistics"]
        }))
        .await;
    let finished_id = finished["data"]["id"].as_i64().unwrap();
    assert_eq!(finished["data"]["description"]["fr"], "A organisé la foire");

    fixture
        .create_experience(json!({
            "memberId": member_id,
            "role": "Treasurer",
            "department": "Finance",
            "startDate": "2021-01-01",
            "skillsGained": ["Budgeting"]
        }))
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/experiences?status=completed"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let completed = body["data"].as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["id"], finished_id);

    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/experiences?memberId={}&status=active",
            member_id
        )))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["role"], "Treasurer");

    let resp = fixture
        .client
        .get(fixture.url("/api/experiences/active"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .client
        .get(fixture.url("/api/experiences/completed"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0]["id"], finished_id);

    // Update
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/experiences/{}", finished_id)))
        .json(&json!({ "role": "Chair" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "Chair");
    assert_eq!(body["data"]["endDate"], "2020-03-01");

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/experiences/{}", finished_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/experiences/{}", finished_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_experience_validation() {
    let fixture = TestFixture::new().await;

    // Unknown member
    let resp = fixture
        .client
        .post(fixture.url("/api/experiences"))
        .json(&json!({
            "memberId": 404,
            "role": "Chair",
            "department": "Events",
            "startDate": "2024-01-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let member_id = fixture
        .create_member("Yaw Darko", "yaw@ylt.org", "Events")
        .await;

    // End before start
    let resp = fixture
        .client
        .post(fixture.url("/api/experiences"))
        .json(&json!({
            "memberId": member_id,
            "role": "Chair",
            "department": "Events",
            "startDate": "2024-02-01",
            "endDate": "2024-01-01"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Too many description languages
    let resp = fixture
        .client
        .post(fixture.url("/api/experiences"))
        .json(&json!({
            "memberId": member_id,
            "role": "Chair",
            "department": "Events",
            "startDate": "2024-01-01",
            "description": { "en": "a", "fr": "b", "es": "c", "de": "d" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_dashboard_empty() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/dashboard"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["totalMembers"], 0);
    assert_eq!(data["totalExperiences"], 0);
    assert_eq!(data["mostCommonRole"], "N/A");
    assert_eq!(data["averageExperienceDuration"], 0);
    assert_eq!(data["leadershipScore"]["level"], "Emerging Leader");
}

#[tokio::test]
async fn test_dashboard_and_member_score() {
    let fixture = TestFixture::new().await;
    let ama = fixture
        .create_member("Ama Owusu", "ama@ylt.org", "Events")
        .await;
    let kofi = fixture
        .create_member("Kofi Mensah", "kofi@ylt.org", "Finance")
        .await;

    for (member_id, role, skills) in [
        (ama, "President", json!(["Public Speaking", "Planning"])),
        (ama, "President", json!(["Public Speaking"])),
        (kofi, "Treasurer", json!(["Budgeting"])),
    ] {
        fixture
            .create_experience(json!({
                "memberId": member_id,
                "role": role,
                "department": "Events",
                "startDate": "2024-01-01",
                "endDate": "2024-01-11",
                "skillsGained": skills
            }))
            .await;
    }

    let resp = fixture
        .client
        .get(fixture.url("/api/dashboard"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let data = &body["data"];

    assert_eq!(data["totalMembers"], 2);
    assert_eq!(data["totalExperiences"], 3);
    assert_eq!(data["completedExperiences"], 3);
    assert_eq!(data["experiencesByRole"], json!({ "President": 2, "Treasurer": 1 }));
    assert_eq!(data["mostCommonRole"], "President");
    assert_eq!(data["averageExperienceDuration"], 10);
    assert_eq!(data["topSkills"][0]["skill"], "Public Speaking");
    assert_eq!(data["topSkills"][0]["count"], 2);
    assert_eq!(data["timeline"].as_array().unwrap().len(), 3);
    assert_eq!(data["charts"]["experiencesByDepartment"][0]["label"], "Events");
    assert_eq!(data["charts"]["experiencesByDepartment"][0]["count"], 3);
    // 3 experiences * 4 + 2 roles * 5 + 4 skill occurrences * 2
    assert_eq!(data["leadershipScore"]["score"], 30);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/members/{}/score", kofi)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    // 1 experience * 4 + 1 role * 5 + 1 skill * 2
    assert_eq!(body["data"]["score"], 11);
    assert_eq!(body["data"]["level"], "Emerging Leader");

    let resp = fixture
        .client
        .get(fixture.url("/api/members/999/score"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_delete_member_removes_their_experiences() {
    let fixture = TestFixture::new().await;
    let member_id = fixture
        .create_member("Esi Quaye", "esi@ylt.org", "Education")
        .await;
    fixture
        .create_experience(json!({
            "memberId": member_id,
            "role": "Volunteer",
            "department": "Education",
            "startDate": "2024-01-01"
        }))
        .await;

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/members/{}", member_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/experiences"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}
