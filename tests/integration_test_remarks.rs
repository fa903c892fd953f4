mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use sqlx::Row;

const HEADER: &str = "EP number,Name,Company,Plant,Department,Trade,Skill,Date,IN1,OUT1,IN2,OUT2,IN3,OUT3,Hours Worked,Overtime,Status";

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed(app: &TestApp) -> (common::AuthHeaders, String) {
    let master = app.login("master", "master123").await;
    let acme_id = app.create_company(&master, "Acme").await;

    let file = format!(
        "{HEADER}\n\
         EP001,John Doe,Acme,,,,,22-08-2025,09:00,17:00,,,,,8.00,0.00,P\n\
         EP003,Sam Boss,Acme,,,,,22-08-2025,09:00,17:00,,,,,8.00,0.00,P\n"
    );
    app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await;

    app.post_json(
        "/api/v1/users/root",
        &master,
        &json!({"username": "acme-admin", "company_id": acme_id}),
    )
    .await;

    let record_id: String = sqlx::query_scalar(
        "SELECT a.id FROM attendance_records a JOIN employees e ON e.id = a.employee_id WHERE e.ep_number = 'EP001'",
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();

    (master, record_id)
}

#[tokio::test]
async fn test_employee_remarks_own_record_and_count_increments() {
    let app = TestApp::new().await;
    let (_master, record_id) = seed(&app).await;

    let employee = app.login("EP001", "EP001").await;
    let response = app
        .post_json(
            &format!("/api/v1/attendance/records/{record_id}/remarks"),
            &employee,
            &json!({"text": "Forgot to punch out, left at 17:30"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let remark = body_json(response).await;
    assert_eq!(remark["text"], "Forgot to punch out, left at 17:30");

    let record = sqlx::query("SELECT remarks_count FROM attendance_records WHERE id = ?")
        .bind(&record_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(record.get::<i64, _>("remarks_count"), 1);

    // Blank text is rejected.
    let response = app
        .post_json(
            &format!("/api/v1/attendance/records/{record_id}/remarks"),
            &employee,
            &json!({"text": "   "}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_employee_cannot_remark_someone_elses_record() {
    let app = TestApp::new().await;
    let (_master, record_id) = seed(&app).await;

    let other = app.login("EP003", "EP003").await;
    let response = app
        .post_json(
            &format!("/api/v1/attendance/records/{record_id}/remarks"),
            &other,
            &json!({"text": "not mine"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_supervisor_remark_requires_covering_assignment() {
    let app = TestApp::new().await;
    let (_master, record_id) = seed(&app).await;
    let root = app.login("acme-admin", "acme-admin").await;

    sqlx::query("UPDATE employees SET user_id = NULL WHERE ep_number = 'EP003'")
        .execute(&app.pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM users WHERE username = 'EP003'")
        .execute(&app.pool)
        .await
        .unwrap();
    app.post_json("/api/v1/supervisors", &root, &json!({"ep_number": "EP003"})).await;

    let supervisor = app.login("EP003", "EP003").await;

    // No assignment yet: forbidden.
    let response = app
        .post_json(
            &format!("/api/v1/attendance/records/{record_id}/remarks"),
            &supervisor,
            &json!({"text": "looks wrong"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let employee_id: String = sqlx::query_scalar("SELECT id FROM employees WHERE ep_number = 'EP001'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let profile_id: String = sqlx::query_scalar("SELECT id FROM supervisor_profiles LIMIT 1")
        .fetch_one(&app.pool)
        .await
        .unwrap();
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

    // The assignment covers the record's date now.
    let response = app
        .post_json(
            &format!("/api/v1/attendance/records/{record_id}/remarks"),
            &supervisor,
            &json!({"text": "confirmed with the shift lead"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Remarks are listed in insertion order for anyone who can see the record.
    let master = app.login("master", "master123").await;
    let response = app
        .get(&format!("/api/v1/attendance/records/{record_id}/remarks"), &master)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let remarks = body_json(response).await;
    assert_eq!(remarks.as_array().unwrap().len(), 1);
    assert_eq!(remarks[0]["text"], "confirmed with the shift lead");
}

#[tokio::test]
async fn test_root_cannot_add_remarks() {
    let app = TestApp::new().await;
    let (_master, record_id) = seed(&app).await;
    let root = app.login("acme-admin", "acme-admin").await;

    let response = app
        .post_json(
            &format!("/api/v1/attendance/records/{record_id}/remarks"),
            &root,
            &json!({"text": "admin note"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
