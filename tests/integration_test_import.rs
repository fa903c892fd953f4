mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::Value;
use sqlx::Row;

async fn parse_body(response: axum::response::Response) -> Value {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        panic!("Response body is empty. Status: {}", status);
    }
    match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => panic!(
            "Failed to parse JSON: {:?}. Status: {}. Body: {:?}",
            e, status, String::from_utf8_lossy(&bytes)
        ),
    }
}

const HEADER: &str = "EP number,Name,Company,Plant,Department,Trade,Skill,Date,IN1,OUT1,IN2,OUT2,IN3,OUT3,Hours Worked,Overtime,Status";

fn csv_file(rows: &[&str]) -> String {
    let mut file = HEADER.to_string();
    for row in rows {
        file.push('\n');
        file.push_str(row);
    }
    file.push('\n');
    file
}

async fn count(pool: &sqlx::SqlitePool, table: &str) -> i64 {
    sqlx::query(&format!("SELECT COUNT(*) AS count FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
        .get("count")
}

#[tokio::test]
async fn test_commit_import_creates_employee_user_and_record() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let file = csv_file(&[
        "EP001,John Doe,Acme,P1,Assembly,Welder,Skilled,22-08-2025,09:00,13:00,14:00,18:00,,,8.00,1.00,P",
    ]);

    let response = app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await;
    assert_eq!(response.status(), StatusCode::OK);
    let result = parse_body(response).await;
    assert_eq!(result["total_rows"], 1);
    assert_eq!(result["valid_rows"], 1);
    assert_eq!(result["error_rows"], 0);
    assert_eq!(result["created"], 1);
    assert_eq!(result["updated"], 0);
    assert_eq!(result["errors"].as_array().unwrap().len(), 0);

    let employee = sqlx::query("SELECT * FROM employees WHERE ep_number = 'EP001'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(employee.get::<String, _>("name"), "John Doe");
    assert_eq!(employee.get::<String, _>("plant"), "P1");
    assert!(employee.get::<Option<String>, _>("user_id").is_some());

    let user = sqlx::query("SELECT * FROM users WHERE username = 'EP001'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(user.get::<String, _>("role"), "EMPLOYEE");
    assert!(user.get::<bool, _>("must_change_password"));

    let record = sqlx::query("SELECT * FROM attendance_records")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(record.get::<String, _>("date"), "2025-08-22");
    assert_eq!(record.get::<String, _>("in1"), "09:00");
    assert_eq!(record.get::<String, _>("out2"), "18:00");
    assert_eq!(record.get::<Option<String>, _>("in3"), None);
    assert_eq!(record.get::<String, _>("hours_worked"), "8.00");
    assert_eq!(record.get::<String, _>("overtime"), "1.00");
    assert_eq!(record.get::<String, _>("status"), "P");

    // The auto-created account logs in with its EP number and is forced to
    // change the password.
    let employee_auth = app.login("EP001", "EP001").await;
    assert!(!employee_auth.access_token.is_empty());
}

#[tokio::test]
async fn test_import_is_idempotent() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let file = csv_file(&[
        "EP001,John Doe,Acme,P1,Assembly,Welder,Skilled,22-08-2025,09:00,13:00,14:00,18:00,,,8.00,1.00,P",
        "EP002,Jane Smith,Acme,P1,Assembly,Fitter,Semi,22-08-2025,09:00,13:00,,,,,4.00,0.00,P",
    ]);

    let first = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;
    assert_eq!(first["created"], 2);
    assert_eq!(first["updated"], 0);

    let before: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, hours_worked, status FROM attendance_records ORDER BY id")
            .fetch_all(&app.pool)
            .await
            .unwrap();

    let second = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;
    assert_eq!(second["created"], 0);
    assert_eq!(second["updated"], 2);
    assert_eq!(second["error_rows"], 0);

    let after: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, hours_worked, status FROM attendance_records ORDER BY id")
            .fetch_all(&app.pool)
            .await
            .unwrap();
    assert_eq!(before, after);
    assert_eq!(count(&app.pool, "employees").await, 2);
    assert_eq!(count(&app.pool, "attendance_records").await, 2);
}

#[tokio::test]
async fn test_blank_punch_never_erases_a_stored_one() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let first = csv_file(&[
        "EP001,John Doe,Acme,P1,Assembly,Welder,Skilled,22-08-2025,09:00,13:00,,,,,8.00,0.00,P",
    ]);
    app.post_csv("/api/v1/attendance/import?mode=commit", &master, &first).await;

    // Same key, blank IN1/OUT1, different non-punch fields.
    let second = csv_file(&[
        "EP001,John Doe,Acme,P2,Paint,Welder,Skilled,22-08-2025,,,14:00,18:00,,,6.50,0.50,A",
    ]);
    let result = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &second).await).await;
    assert_eq!(result["updated"], 1);

    let record = sqlx::query("SELECT * FROM attendance_records")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    // Stored punches survive the blank re-import...
    assert_eq!(record.get::<String, _>("in1"), "09:00");
    assert_eq!(record.get::<String, _>("out1"), "13:00");
    // ...new punches land...
    assert_eq!(record.get::<String, _>("in2"), "14:00");
    // ...and non-punch fields follow last-import-wins.
    assert_eq!(record.get::<String, _>("hours_worked"), "6.50");
    assert_eq!(record.get::<String, _>("overtime"), "0.50");
    assert_eq!(record.get::<String, _>("status"), "A");
    assert_eq!(record.get::<String, _>("plant"), "P2");
    assert_eq!(record.get::<String, _>("department"), "Paint");
}

#[tokio::test]
async fn test_validate_mode_persists_nothing_and_reports_like_commit() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;
    app.audit.events.lock().unwrap().clear();

    let file = csv_file(&[
        "EP001,John Doe,Acme,P1,Assembly,Welder,Skilled,22-08-2025,09:00,13:00,,,,,8.00,0.00,P",
        "EP002,Bad Date,Acme,,,,,2025/08/22,,,,,,,0,0,P",
        "EP003,Bad Status,Acme,,,,,22-08-2025,,,,,,,0,0,X",
        "EP004,No Such Co,Globex,,,,,22-08-2025,,,,,,,0,0,P",
    ]);

    let users_before = count(&app.pool, "users").await;

    let validated = parse_body(app.post_csv("/api/v1/attendance/import?mode=validate", &master, &file).await).await;
    assert_eq!(validated["total_rows"], 4);
    assert_eq!(validated["valid_rows"], 1);
    assert_eq!(validated["error_rows"], 3);
    // Dry runs never report persistence counts.
    assert_eq!(validated["created"], 0);
    assert_eq!(validated["updated"], 0);

    // Zero side effects, including the lazily created employee/user chain.
    assert_eq!(count(&app.pool, "employees").await, 0);
    assert_eq!(count(&app.pool, "attendance_records").await, 0);
    assert_eq!(count(&app.pool, "users").await, users_before);
    assert!(app.audit.events.lock().unwrap().is_empty());

    // A commit of the same file reports the identical row errors.
    let committed = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;
    assert_eq!(validated["errors"], committed["errors"]);
    assert_eq!(committed["created"], 1);

    // Errors come back in source order with header-aware row numbers.
    let errors = committed["errors"].as_array().unwrap();
    assert_eq!(errors[0]["row"], 3);
    assert!(errors[0]["message"].as_str().unwrap().contains("Invalid date"));
    assert_eq!(errors[1]["row"], 4);
    assert!(errors[1]["message"].as_str().unwrap().contains("Invalid status"));
    assert_eq!(errors[2]["row"], 5);
    assert!(errors[2]["message"].as_str().unwrap().contains("Unknown company: Globex"));
}

#[tokio::test]
async fn test_unknown_company_fails_the_row_and_creates_nothing() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let file = csv_file(&[
        "EP001,John Doe,Acme,,,,,22-08-2025,,,,,,,8.00,0.00,P",
        "EP002,Jane Smith,Globex,,,,,22-08-2025,,,,,,,8.00,0.00,P",
    ]);

    let result = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;
    assert_eq!(result["created"], 1);
    assert_eq!(result["error_rows"], 1);
    assert!(result["errors"][0]["message"].as_str().unwrap().contains("Unknown company: Globex"));

    assert_eq!(count(&app.pool, "companies").await, 1);
    assert_eq!(count(&app.pool, "employees").await, 1);
}

#[tokio::test]
async fn test_missing_columns_abort_before_any_row() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let file = "EP number,Name,Company,Plant,Department,Trade,Skill,Date,IN1,OUT1,IN2,OUT2,IN3,OUT3,Hours Worked,Overtime\n\
                EP001,John Doe,Acme,,,,,22-08-2025,,,,,,,8.00,0.00\n";

    let response = app.post_csv("/api/v1/attendance/import?mode=commit", &master, file).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Status"));

    assert_eq!(count(&app.pool, "employees").await, 0);
    assert_eq!(count(&app.pool, "attendance_records").await, 0);
}

#[tokio::test]
async fn test_colliding_username_fails_the_row_loudly() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    let company_id = app.create_company(&master, "Acme").await;

    // An unrelated ROOT account already owns the username EP001.
    let response = app
        .post_json(
            "/api/v1/users/root",
            &master,
            &serde_json::json!({"username": "EP001", "company_id": company_id}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let file = csv_file(&[
        "EP001,John Doe,Acme,,,,,22-08-2025,,,,,,,8.00,0.00,P",
    ]);
    let result = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;
    assert_eq!(result["error_rows"], 1);
    assert_eq!(result["created"], 0);
    assert!(result["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("collides with an existing user account"));

    // Neither the employee nor the attendance row was created, and the
    // existing account was not touched.
    assert_eq!(count(&app.pool, "employees").await, 0);
    assert_eq!(count(&app.pool, "attendance_records").await, 0);
    let root = sqlx::query("SELECT role FROM users WHERE username = 'EP001'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(root.get::<String, _>("role"), "ROOT");
}

#[tokio::test]
async fn test_one_file_can_carry_many_rows_for_one_new_employee() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let file = csv_file(&[
        "EP001,John Doe,Acme,,,,,21-08-2025,09:00,17:00,,,,,8.00,0.00,P",
        "EP001,John Doe,Acme,,,,,22-08-2025,09:00,17:00,,,,,8.00,0.00,P",
        // Same key as the previous row: an in-file update, not a duplicate.
        "EP001,John Doe,Acme,,,,,22-08-2025,,,14:00,18:00,,,9.00,1.00,P",
    ]);

    let result = parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;
    assert_eq!(result["valid_rows"], 3);
    assert_eq!(result["created"], 2);
    assert_eq!(result["updated"], 1);

    assert_eq!(count(&app.pool, "employees").await, 1);
    assert_eq!(count(&app.pool, "users").await, 2); // master + EP001
    assert_eq!(count(&app.pool, "attendance_records").await, 2);

    let record = sqlx::query("SELECT * FROM attendance_records WHERE date = '2025-08-22'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(record.get::<String, _>("in1"), "09:00");
    assert_eq!(record.get::<String, _>("in2"), "14:00");
    assert_eq!(record.get::<String, _>("hours_worked"), "9.00");
}

#[tokio::test]
async fn test_header_only_file_is_an_empty_success() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;

    let result = parse_body(
        app.post_csv("/api/v1/attendance/import?mode=commit", &master, &csv_file(&[])).await,
    )
    .await;
    assert_eq!(result["total_rows"], 0);
    assert_eq!(result["created"], 0);
    assert_eq!(result["error_rows"], 0);
}

#[tokio::test]
async fn test_import_is_master_only() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    let company_id = app.create_company(&master, "Acme").await;

    app.post_json(
        "/api/v1/users/root",
        &master,
        &serde_json::json!({"username": "acme-admin", "company_id": company_id}),
    )
    .await;
    let root = app.login("acme-admin", "acme-admin").await;

    let file = csv_file(&["EP001,John Doe,Acme,,,,,22-08-2025,,,,,,,8.00,0.00,P"]);
    let response = app.post_csv("/api/v1/attendance/import?mode=commit", &root, &file).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_commit_import_emits_audit_events() {
    let app = TestApp::new().await;
    let master = app.login("master", "master123").await;
    app.create_company(&master, "Acme").await;
    app.audit.events.lock().unwrap().clear();

    let file = csv_file(&[
        "EP001,John Doe,Acme,,,,,22-08-2025,,,,,,,8.00,0.00,P",
    ]);
    parse_body(app.post_csv("/api/v1/attendance/import?mode=commit", &master, &file).await).await;

    let events = app.audit.events.lock().unwrap();
    let batches: Vec<_> = events.iter().filter(|e| e.object_type == "AttendanceRecord").collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].field_changes["created"], 1);
    assert_eq!(events.iter().filter(|e| e.object_type == "User").count(), 1);
    assert_eq!(events.iter().filter(|e| e.object_type == "Employee").count(), 1);
}
