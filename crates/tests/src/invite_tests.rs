use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn manager_code_admits_exactly_its_uses() {
    manager_code_scenario(&TestApp::spawn().await).await;
}

#[tokio::test]
async fn manager_code_admits_exactly_its_uses_on_mongo() {
    let Some(app) = TestApp::spawn_mongo().await else {
        return;
    };
    manager_code_scenario(&app).await;
}

async fn manager_code_scenario(app: &TestApp) {
    let crew = app.seed_crew().await;
    let code = app
        .issue_invite(&crew.admin.access_token, "MGR-100", "manager", 2)
        .await;

    let first = app
        .register_user("m1@test.com", "First", "manager", Some(&code))
        .await;
    assert_eq!(first.role["role"], "manager");
    app.register_user("m2@test.com", "Second", "manager", Some(&code))
        .await;

    let resp = app
        .register("m3@test.com", "Third", "manager", Some(&code))
        .await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_get("/api/invite", &crew.admin.access_token)
        .send()
        .await
        .unwrap();
    let invites: Vec<Value> = resp.json().await.unwrap();
    let invite = invites.iter().find(|i| i["code"] == "MGR-100").unwrap();
    assert_eq!(invite["remaining_uses"], 0);

    let resp = app
        .auth_get("/api/invite/MGR-100", &crew.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let history: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history.iter().filter(|e| e["success"] == true).count(), 2);
    let failed = history.iter().find(|e| e["success"] == false).unwrap();
    assert_eq!(failed["email"], "m3@test.com");
    assert!(failed["account_id"].is_null());
}

#[tokio::test]
async fn concurrent_signups_never_overdraw_a_code() {
    concurrent_signup_scenario(&TestApp::spawn().await).await;
}

#[tokio::test]
async fn concurrent_signups_never_overdraw_a_code_on_mongo() {
    let Some(app) = TestApp::spawn_mongo().await else {
        return;
    };
    concurrent_signup_scenario(&app).await;
}

async fn concurrent_signup_scenario(app: &TestApp) {
    let crew = app.seed_crew().await;
    let code = app
        .issue_invite(&crew.admin.access_token, "RACE-3", "manager", 3)
        .await;

    let attempts = (0..6).map(|i| {
        let email = format!("racer{i}@test.com");
        let code = &code;
        async move {
            app.register(&email, "Racer", "manager", Some(code))
                .await
                .status()
                .as_u16()
        }
    });
    let statuses = futures::future::join_all(attempts).await;

    assert_eq!(statuses.iter().filter(|s| **s == 201).count(), 3);
    assert_eq!(statuses.iter().filter(|s| **s == 400).count(), 3);
}

#[tokio::test]
async fn generated_code_uses_prefix() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    let resp = app
        .auth_post("/api/invite", &crew.admin.access_token)
        .json(&serde_json::json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let json: Value = resp.json().await.unwrap();
    assert!(json["code"].as_str().unwrap().starts_with("INV-"));
    assert_eq!(json["remaining_uses"], 1);
    assert_eq!(json["active"], true);
    assert_eq!(json["created_by"], crew.admin.id.as_str());
}

#[tokio::test]
async fn only_admin_manages_invites() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    for token in [&crew.manager.access_token, &crew.worker.access_token] {
        let resp = app
            .auth_post("/api/invite", token)
            .json(&serde_json::json!({ "code": "SNEAKY", "role": "admin" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 403);

        let resp = app.auth_get("/api/invite", token).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 403);
    }

    let resp = app.client.get(app.url("/api/invite")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn invalid_invites_are_not_issued() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let token = &crew.admin.access_token;

    // Workers never need a code
    let resp = app
        .auth_post("/api/invite", token)
        .json(&serde_json::json!({ "code": "WRK-1", "role": "worker" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_post("/api/invite", token)
        .json(&serde_json::json!({ "code": "ZERO", "role": "manager", "uses": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    app.issue_invite(token, "TAKEN", "manager", 1).await;
    let resp = app
        .auth_post("/api/invite", token)
        .json(&serde_json::json!({ "code": "TAKEN", "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn deactivated_code_stops_working() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let code = app
        .issue_invite(&crew.admin.access_token, "MGR-OFF", "manager", 5)
        .await;

    let resp = app
        .auth_delete(&format!("/api/invite/{code}"), &crew.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .register("late@test.com", "Late", "manager", Some(&code))
        .await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_delete("/api/invite/NO-SUCH", &crew.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn worker_signup_ignores_code() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let code = app
        .issue_invite(&crew.admin.access_token, "KEEP-1", "manager", 1)
        .await;

    let worker = app
        .register_user("w2@test.com", "Worker Two", "worker", Some(&code))
        .await;
    assert_eq!(worker.role["role"], "worker");

    // The code is still good for a manager
    app.register_user("m@test.com", "Manager", "manager", Some(&code))
        .await;
}
