use crate::fixtures::{seed::SeededCrew, test_app::TestApp};
use serde_json::Value;

fn job_body(service_type: &str, amount: f64) -> Value {
    serde_json::json!({
        "service_type": service_type,
        "location": "12 Elm Street",
        "start_date": "2026-03-01",
        "amount": amount,
        "payment_method": "cash",
    })
}

impl TestApp {
    async fn create_worker(&self, token: &str, name: &str, specialty: &str) -> String {
        let resp = self
            .auth_post("/api/worker", token)
            .json(&serde_json::json!({ "name": name, "specialty": specialty }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
        let json: Value = resp.json().await.unwrap();
        json["id"].as_str().unwrap().to_string()
    }

    async fn submit(&self, token: &str, body: &Value) -> Value {
        let resp = self
            .auth_post("/api/job", token)
            .json(body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        let json: Value = resp.json().await.unwrap();
        assert_eq!(status, 201, "Submit failed: {json}");
        json
    }

    async fn roster(&self, token: &str) -> Vec<Value> {
        let resp = self.auth_get("/api/worker", token).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let json: Value = resp.json().await.unwrap();
        json["workers"].as_array().cloned().unwrap_or_default()
    }

    async fn list_jobs(&self, token: &str, query: &str) -> Vec<Value> {
        let resp = self
            .auth_get(&format!("/api/job{query}"), token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }
}

async fn crew_with_worker_job(app: &TestApp) -> (SeededCrew, Value) {
    let crew = app.seed_crew().await;
    let job = app
        .submit(&crew.worker.access_token, &job_body("plumbing", 150.0))
        .await;
    (crew, job)
}

#[tokio::test]
async fn first_worker_submission_creates_worker_record() {
    let app = TestApp::spawn().await;
    let (crew, job) = crew_with_worker_job(&app).await;

    assert_eq!(job["service_type"], "plumbing");
    assert_eq!(job["amount"].as_f64(), Some(150.0));
    assert_eq!(job["payment_status"], "pending");
    assert_eq!(job["status"], "in_progress");
    assert_eq!(job["submitted_by"], crew.worker.id.as_str());

    let resp = app
        .auth_get("/api/worker", &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let workers = json["workers"].as_array().unwrap();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0]["name"], "Wendy Worker");
    assert_eq!(workers[0]["specialty"], "plumbing");
    assert_eq!(workers[0]["account_id"], crew.worker.id.as_str());
    assert_eq!(workers[0]["id"], job["worker_id"]);

    // A second submission reuses the same worker
    let second = app
        .submit(&crew.worker.access_token, &job_body("painting", 80.0))
        .await;
    assert_eq!(second["worker_id"], job["worker_id"]);
}

#[tokio::test]
async fn invalid_submission_has_no_side_effects() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    let mut body = job_body("plumbing", 150.0);
    body["end_date"] = serde_json::json!("2026-02-01");
    let resp = app
        .auth_post("/api/job", &crew.worker.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_post("/api/job", &crew.worker.access_token)
        .json(&job_body("plumbing", -5.0))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_get("/api/worker", &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert!(json["workers"].as_array().unwrap().is_empty());
    assert!(app.list_jobs(&crew.manager.access_token, "").await.is_empty());
}

#[tokio::test]
async fn other_payment_method_requires_text() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    let mut body = job_body("roofing", 900.0);
    body["payment_method"] = serde_json::json!("other");
    let resp = app
        .auth_post("/api/job", &crew.worker.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    body["payment_method_other"] = serde_json::json!("Venmo");
    let job = app.submit(&crew.worker.access_token, &body).await;
    assert_eq!(job["payment_method"], "Venmo");
}

#[tokio::test]
async fn worker_cannot_submit_for_someone_else() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let other = app
        .create_worker(&crew.manager.access_token, "Oscar Other", "electrical")
        .await;
    // Unbound roster entry the worker would be matched to by name
    app.create_worker(&crew.manager.access_token, "Wendy Worker", "plumbing")
        .await;
    let roster_before = app.roster(&crew.manager.access_token).await;

    let mut body = job_body("electrical", 200.0);
    body["worker_id"] = serde_json::json!(other);
    let resp = app
        .auth_post("/api/job", &crew.worker.access_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let roster_after = app.roster(&crew.manager.access_token).await;
    assert_eq!(roster_after, roster_before);
    assert_eq!(roster_after.len(), 2);
    assert!(roster_after.iter().all(|w| w["account_id"].is_null()));
    assert!(app.list_jobs(&crew.manager.access_token, "").await.is_empty());
}

#[tokio::test]
async fn staff_submission_needs_active_worker() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;
    let token = &crew.manager.access_token;

    let resp = app
        .auth_post("/api/job", token)
        .json(&job_body("carpentry", 300.0))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let worker_id = app.create_worker(token, "Carl Carpenter", "carpentry").await;
    let mut body = job_body("carpentry", 300.0);
    body["worker_id"] = serde_json::json!(worker_id);
    let job = app.submit(token, &body).await;
    assert_eq!(job["worker_id"], worker_id.as_str());
    assert_eq!(job["submitted_by"], crew.manager.id.as_str());

    let resp = app
        .auth_put(&format!("/api/worker/{worker_id}/active"), token)
        .json(&serde_json::json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_post("/api/job", token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn workers_only_see_their_own_jobs() {
    let app = TestApp::spawn().await;
    let (crew, own_job) = crew_with_worker_job(&app).await;

    let other = app
        .create_worker(&crew.manager.access_token, "Oscar Other", "hvac")
        .await;
    let mut body = job_body("hvac", 400.0);
    body["worker_id"] = serde_json::json!(other);
    let other_job = app.submit(&crew.manager.access_token, &body).await;

    let jobs = app.list_jobs(&crew.worker.access_token, "").await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], own_job["id"]);
    assert_eq!(jobs[0]["worker_name"], "Wendy Worker");

    let resp = app
        .auth_get(
            &format!("/api/job/{}", other_job["id"].as_str().unwrap()),
            &crew.worker.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let jobs = app.list_jobs(&crew.manager.access_token, "").await;
    assert_eq!(jobs.len(), 2);

    let jobs = app
        .list_jobs(&crew.manager.access_token, "?search=oscar")
        .await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], other_job["id"]);
}

#[tokio::test]
async fn worker_without_jobs_sees_empty_list() {
    let app = TestApp::spawn().await;
    let crew = app.seed_crew().await;

    assert!(app.list_jobs(&crew.worker.access_token, "").await.is_empty());
}

#[tokio::test]
async fn only_staff_mark_jobs_paid() {
    let app = TestApp::spawn().await;
    let (crew, job) = crew_with_worker_job(&app).await;
    let path = format!("/api/job/{}/paid", job["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &crew.worker.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    for _ in 0..2 {
        let resp = app
            .auth_put(&path, &crew.manager.access_token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["payment_status"], "paid");
    }

    let paid = app
        .list_jobs(&crew.admin.access_token, "?payment_status=paid")
        .await;
    assert_eq!(paid.len(), 1);
    let pending = app
        .list_jobs(&crew.admin.access_token, "?payment_status=pending")
        .await;
    assert!(pending.is_empty());
}

#[tokio::test]
async fn mark_completed_sets_status() {
    let app = TestApp::spawn().await;
    let (crew, job) = crew_with_worker_job(&app).await;

    let resp = app
        .auth_put(
            &format!("/api/job/{}/completed", job["id"].as_str().unwrap()),
            &crew.admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["payment_status"], "pending");
}

#[tokio::test]
async fn edit_rejects_end_before_start() {
    let app = TestApp::spawn().await;
    let (crew, job) = crew_with_worker_job(&app).await;
    let path = format!("/api/job/{}", job["id"].as_str().unwrap());

    let resp = app
        .auth_put(&path, &crew.manager.access_token)
        .json(&serde_json::json!({ "end_date": "2026-02-15", "amount": 999.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app
        .auth_get(&path, &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["amount"].as_f64(), Some(150.0));
    assert!(json["end_date"].is_null());

    let resp = app
        .auth_put(&path, &crew.manager.access_token)
        .json(&serde_json::json!({ "end_date": "2026-03-04", "location": "14 Elm Street" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["end_date"], "2026-03-04");
    assert_eq!(json["location"], "14 Elm Street");

    let resp = app
        .auth_put(&path, &crew.worker.access_token)
        .json(&serde_json::json!({ "amount": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn delete_job_is_staff_only() {
    let app = TestApp::spawn().await;
    let (crew, job) = crew_with_worker_job(&app).await;
    let path = format!("/api/job/{}", job["id"].as_str().unwrap());

    let resp = app
        .auth_delete(&path, &crew.worker.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&path, &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .auth_get(&path, &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    assert!(app.list_jobs(&crew.worker.access_token, "").await.is_empty());
}

#[tokio::test]
async fn summary_totals_revenue_per_worker() {
    let app = TestApp::spawn().await;
    let (crew, job) = crew_with_worker_job(&app).await;
    app.submit(&crew.worker.access_token, &job_body("plumbing", 50.0))
        .await;
    app.auth_put(
        &format!("/api/job/{}/paid", job["id"].as_str().unwrap()),
        &crew.manager.access_token,
    )
    .send()
    .await
    .unwrap();

    let resp = app
        .auth_get("/api/job/summary", &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total_jobs"], 2);
    assert_eq!(json["in_progress_jobs"], 2);
    assert_eq!(json["total_value"].as_f64(), Some(200.0));
    assert_eq!(json["paid_amount"].as_f64(), Some(150.0));
    assert_eq!(json["pending_amount"].as_f64(), Some(50.0));
    assert_eq!(json["by_worker"][0]["worker_name"], "Wendy Worker");
    assert_eq!(json["by_worker"][0]["jobs"], 2);

    let resp = app
        .auth_get("/api/job/summary?from=2026-04-01", &crew.manager.access_token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["total_jobs"], 0);

    let resp = app
        .auth_get("/api/job/summary", &crew.worker.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn signed_out_requests_are_rejected() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/api/job")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .post(app.url("/api/job"))
        .json(&job_body("plumbing", 10.0))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}
