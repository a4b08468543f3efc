use serde_json::Value;

use super::test_app::{BOOTSTRAP_ADMIN_CODE, TestApp};

pub const PASSWORD: &str = "Password123!";

/// An admin, a manager and a worker, all signed in.
pub struct SeededCrew {
    pub admin: SeededUser,
    pub manager: SeededUser,
    pub worker: SeededUser,
}

pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub role: Value,
}

impl TestApp {
    /// Sends a signup request and returns the raw response.
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        role: &str,
        invite_code: Option<&str>,
    ) -> reqwest::Response {
        let mut body = serde_json::json!({
            "email": email,
            "display_name": display_name,
            "password": PASSWORD,
            "confirm_password": PASSWORD,
            "role": role,
        });
        if let Some(code) = invite_code {
            body["invite_code"] = serde_json::json!(code);
        }

        self.client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await
            .expect("Register request failed")
    }

    /// Register a user and return their auth info.
    pub async fn register_user(
        &self,
        email: &str,
        display_name: &str,
        role: &str,
        invite_code: Option<&str>,
    ) -> SeededUser {
        let resp = self.register(email, display_name, role, invite_code).await;
        let status = resp.status().as_u16();
        let json: Value = resp.json().await.expect("Failed to parse register response");
        assert_eq!(status, 201, "Register failed: {json}");

        seeded_user(email, &json)
    }

    /// Login a user and return their auth info.
    pub async fn login_user(&self, email: &str, password: &str) -> SeededUser {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed");

        let status = resp.status();
        let json: Value = resp.json().await.expect("Failed to parse login response");
        assert!(status.is_success(), "Login failed: {json}");

        seeded_user(email, &json)
    }

    /// Create an authenticated request with the given token.
    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Issues an invite as `token` and returns its code.
    pub async fn issue_invite(&self, token: &str, code: &str, role: &str, uses: u32) -> String {
        let resp = self
            .auth_post("/api/invite", token)
            .json(&serde_json::json!({
                "code": code,
                "role": role,
                "uses": uses,
            }))
            .send()
            .await
            .expect("Issue invite request failed");

        let status = resp.status().as_u16();
        let json: Value = resp.json().await.expect("Failed to parse invite response");
        assert_eq!(status, 201, "Issue invite failed: {json}");
        json["code"].as_str().unwrap().to_string()
    }

    /// Admin via the bootstrap code, a manager via an admin-issued invite,
    /// and a self-registered worker.
    pub async fn seed_crew(&self) -> SeededCrew {
        let admin = self
            .register_user("admin@crew.test", "Ada Admin", "admin", Some(BOOTSTRAP_ADMIN_CODE))
            .await;

        let code = self
            .issue_invite(&admin.access_token, "MGR-SEED", "manager", 1)
            .await;
        let manager = self
            .register_user("manager@crew.test", "Max Manager", "manager", Some(&code))
            .await;

        let worker = self
            .register_user("worker@crew.test", "Wendy Worker", "worker", None)
            .await;

        SeededCrew {
            admin,
            manager,
            worker,
        }
    }
}

fn seeded_user(email: &str, json: &Value) -> SeededUser {
    SeededUser {
        id: json["user"]["id"].as_str().unwrap().to_string(),
        email: email.to_string(),
        access_token: json["access_token"].as_str().unwrap().to_string(),
        refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
        role: json["role"].clone(),
    }
}
