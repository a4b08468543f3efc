use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn manager_manages_worker_roster() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let token = &crew.manager.access_token;

    let resp = app
        .auth_post("/api/worker", token)
        .json(&serde_json::json!({
            "name": "Paula Painter",
            "specialty": "painting",
            "email": "Paula@Crew.test",
            "contact_info": "555-0100",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["active"], true);
    assert_eq!(created["email"], "paula@crew.test");
    let id = created["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/worker/{id}"), token)
        .json(&serde_json::json!({ "name": "Paula P.", "specialty": "flooring" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "Paula P.");
    assert_eq!(updated["specialty"], "flooring");

    let resp = app
        .auth_put(&format!("/api/worker/{id}/active"), token)
        .json(&serde_json::json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app.auth_get("/api/worker", token).send().await.unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["active"], 0);
    assert_eq!(json["inactive"], 1);

    let resp = app
        .auth_delete(&format!("/api/worker/{id}"), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .auth_delete(&format!("/api/worker/{id}"), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn worker_fields_are_required() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    let resp = app
        .auth_post("/api/worker", &crew.admin.access_token)
        .json(&serde_json::json!({ "name": "", "specialty": "roofing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_post("/api/worker", &crew.admin.access_token)
        .json(&serde_json::json!({ "name": "Rob", "specialty": "roofing", "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn workers_cannot_manage_roster() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let token = &crew.worker.access_token;

    let resp = app.auth_get("/api/worker", token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_post("/api/worker", token)
        .json(&serde_json::json!({ "name": "Me Too", "specialty": "hvac" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn signup_binds_existing_worker_by_email() {
    worker_binding_scenario(&TestApp::spawn().await).await;
}

#[tokio::test]
async fn signup_binds_existing_worker_by_email_on_mongo() {
    let Some(app) = TestApp::spawn_mongo().await else {
        return;
    };
    worker_binding_scenario(&app).await;
}

async fn worker_binding_scenario(app: &TestApp) {
    let crew = app.seed_crew().await;

    let resp = app
        .auth_post("/api/worker", &crew.manager.access_token)
        .json(&serde_json::json!({
            "name": "Eli Electric",
            "specialty": "electrical",
            "email": "Eli@Crew.Test",
        }))
        .send()
        .await
        .unwrap();
    let worker: Value = resp.json().await.unwrap();

    let eli = app
        .register_user("eli@crew.test", "Eli", "worker", None)
        .await;
    let resp = app
        .auth_post("/api/job", &eli.access_token)
        .json(&serde_json::json!({
            "service_type": "electrical",
            "location": "Warehouse 4",
            "start_date": "2026-05-10",
            "amount": 420.0,
            "payment_method": "check",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let job: Value = resp.json().await.unwrap();
    assert_eq!(job["worker_id"], worker["id"]);

    let resp = app
        .auth_get("/api/worker", &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let workers = json["workers"].as_array().unwrap();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0]["account_id"], eli.id.as_str());
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    let resp = app
        .auth_put("/api/worker/not-an-id/active", &crew.manager.access_token)
        .json(&serde_json::json!({ "active": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}
