mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

const HEADER: &str = "EP number,Name,Company,Plant,Department,Trade,Skill,Date,IN1,OUT1,IN2,OUT2,IN3,OUT3,Hours Worked,Overtime,Status";

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Seeds a company with three employees, a root admin and a supervisor
/// profile; returns (root auth, employee_id of EP001, profile_id).
async fn seed(app: &TestApp) -> (common::AuthHeaders, String, String) {
    let master = app.login("master", "master123").await;
    let acme_id = app.create_company(&master, "Acme").await;

    let file = format!(
        "{HEADER}\n\
         EP001,John Doe,Acme,,,,,22-08-2025,09:00,17:00,,,,,8.00,0.00,P\n\
         EP002,Jane Smith,Acme,,,,,22-08-2025,09:00,17:00,,,,,8.00,0.00,P\n\
         EP003,Sam Boss,Acme,,,,,22-08-2025,09:00,17:00,,,,,8.00,0.00,P\n"
    );
    app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await;

    app.post_json(
        "/api/v1/users/root",
        &master,
        &json!({"username": "acme-admin", "company_id": acme_id}),
    )
    .await;
    let root = app.login("acme-admin", "acme-admin").await;

    sqlx::query("UPDATE employees SET user_id = NULL WHERE ep_number = 'EP003'")
        .execute(&app.pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM users WHERE username = 'EP003'")
        .execute(&app.pool)
        .await
        .unwrap();
    let response = app
        .post_json("/api/v1/supervisors", &root, &json!({"ep_number": "EP003"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let employee_id: String = sqlx::query_scalar("SELECT id FROM employees WHERE ep_number = 'EP001'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let profile_id: String = sqlx::query_scalar("SELECT id FROM supervisor_profiles LIMIT 1")
        .fetch_one(&app.pool)
        .await
        .unwrap();

    (root, employee_id, profile_id)
}

#[tokio::test]
async fn test_overlapping_assignments_are_rejected() {
    let app = TestApp::new().await;
    let (root, employee_id, profile_id) = seed(&app).await;

    // Open-ended assignment.
    let response = app
        .post_json(
            "/api/v1/assignments",
            &root,
            &json!({
                "employee_id": employee_id,
                "supervisor_id": profile_id,
                "start_date": "2025-08-01",
                "end_date": null,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Anything after its start collides with the open interval.
    let response = app
        .post_json(
            "/api/v1/assignments",
            &root,
            &json!({
                "employee_id": employee_id,
                "supervisor_id": profile_id,
                "start_date": "2025-09-01",
                "end_date": "2025-09-30",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // An interval that ends before the open one starts is fine.
    let response = app
        .post_json(
            "/api/v1/assignments",
            &root,
            &json!({
                "employee_id": employee_id,
                "supervisor_id": profile_id,
                "start_date": "2025-07-01",
                "end_date": "2025-07-31",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_assignment_end_before_start_is_invalid() {
    let app = TestApp::new().await;
    let (root, employee_id, profile_id) = seed(&app).await;

    let response = app
        .post_json(
            "/api/v1/assignments",
            &root,
            &json!({
                "employee_id": employee_id,
                "supervisor_id": profile_id,
                "start_date": "2025-08-10",
                "end_date": "2025-08-01",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assignment_creation_is_root_only_and_audited() {
    let app = TestApp::new().await;
    let (root, employee_id, profile_id) = seed(&app).await;
    app.audit.events.lock().unwrap().clear();

    let master = app.login("master", "master123").await;
    let response = app
        .post_json(
            "/api/v1/assignments",
            &master,
            &json!({
                "employee_id": employee_id,
                "supervisor_id": profile_id,
                "start_date": "2025-08-01",
                "end_date": null,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json(
            "/api/v1/assignments",
            &root,
            &json!({
                "employee_id": employee_id,
                "supervisor_id": profile_id,
                "start_date": "2025-08-01",
                "end_date": null,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = app.audit.events.lock().unwrap();
    assert_eq!(events.iter().filter(|e| e.object_type == "Assignment").count(), 1);
}

#[tokio::test]
async fn test_supervisor_lists_records_of_assigned_employees_only() {
    let app = TestApp::new().await;
    let (root, employee_id, profile_id) = seed(&app).await;

    app.post_json(
        "/api/v1/assignments",
        &root,
        &json!({
            "employee_id": employee_id,
            "supervisor_id": profile_id,
            "start_date": "2025-08-01",
            "end_date": null,
        }),
    )
    .await;

    let supervisor = app.login("EP003", "EP003").await;

    let response = app
        .get(&format!("/api/v1/attendance/records?employee_id={employee_id}"), &supervisor)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let records = body_json(response).await;
    assert_eq!(records.as_array().unwrap().len(), 1);

    let other_id: String = sqlx::query_scalar("SELECT id FROM employees WHERE ep_number = 'EP002'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let response = app
        .get(&format!("/api/v1/attendance/records?employee_id={other_id}"), &supervisor)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_root_lists_current_assignments() {
    let app = TestApp::new().await;
    let (root, employee_id, profile_id) = seed(&app).await;

    app.post_json(
        "/api/v1/assignments",
        &root,
        &json!({
            "employee_id": employee_id,
            "supervisor_id": profile_id,
            "start_date": "2025-08-01",
            "end_date": null,
        }),
    )
    .await;
    // An assignment that already ended stays out of the current list.
    app.post_json(
        "/api/v1/assignments",
        &root,
        &json!({
            "employee_id": employee_id,
            "supervisor_id": profile_id,
            "start_date": "2024-01-01",
            "end_date": "2024-06-30",
        }),
    )
    .await;

    let response = app.get("/api/v1/assignments", &root).await;
    assert_eq!(response.status(), StatusCode::OK);
    let assignments = body_json(response).await;
    assert_eq!(assignments.as_array().unwrap().len(), 1);
    assert_eq!(assignments[0]["end_date"], serde_json::Value::Null);
}
