pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::dashboard::handle_dashboard_stats;
use crate::planning::{handlers as okrs, tasks};
use crate::reminders::handlers as reminders;
use crate::state::AppState;
use crate::validation::handlers as validation;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/db", get(health::db_health_handler))
        // OKRs
        .route(
            "/api/v1/okrs",
            get(okrs::handle_list_okrs).post(okrs::handle_create_okr),
        )
        .route("/api/v1/okrs/parse", post(okrs::handle_parse_okr))
        .route("/api/v1/okrs/plan", post(okrs::handle_plan_okr))
        .route("/api/v1/okrs/:id", get(okrs::handle_get_okr))
        .route(
            "/api/v1/okrs/:id/progress",
            patch(okrs::handle_update_progress),
        )
        // Tasks
        .route(
            "/api/v1/tasks",
            get(tasks::handle_list_tasks).post(tasks::handle_create_task),
        )
        .route(
            "/api/v1/tasks/:id",
            get(tasks::handle_get_task).patch(tasks::handle_update_task),
        )
        .route(
            "/api/v1/tasks/:id/complete",
            post(tasks::handle_complete_task),
        )
        // Evidence validation
        .route(
            "/api/v1/tasks/:id/submissions",
            post(validation::handle_submit),
        )
        .route(
            "/api/v1/tasks/:id/submissions/upload",
            post(validation::handle_submit_upload),
        )
        .route(
            "/api/v1/tasks/:id/reports",
            get(validation::handle_task_reports),
        )
        .route("/api/v1/reports/:id", get(validation::handle_get_report))
        // Reminders
        .route(
            "/api/v1/reminders",
            get(reminders::handle_list_reminders).post(reminders::handle_create_reminder),
        )
        .route(
            "/api/v1/reminders/upcoming",
            get(reminders::handle_upcoming_reminders),
        )
        .route(
            "/api/v1/reminders/:id/status",
            patch(reminders::handle_update_reminder_status),
        )
        // Dashboard
        .route("/api/v1/dashboard/stats", get(handle_dashboard_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::stub::StubLlm;
    use crate::storage::MemStorage;
    use crate::validation::evidence::tests::sample_pdf;

    const PARSE_REPLY: &str = r#"{"objective": "Publish 3 AI articles",
        "deliverables": ["3 articles published"], "deadline": "2025-09-30"}"#;
    const TASKS_REPLY: &str = r#"[
        {"task": "Draft article 1", "due": "2025-08-01", "evidence_hint": "text", "level": "easy"},
        {"task": "Publish article 1", "due": "2025-08-15", "evidence_hint": "other-url", "level": "medium"}]"#;
    const PASS: &str = r#"{"passed": true, "summary": "Looks good."}"#;

    fn app(replies: &[&str]) -> Router {
        build_router(AppState {
            store: Arc::new(MemStorage::new()),
            llm: Arc::new(StubLlm::with_replies(replies.iter().copied())),
            archive: None,
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        read(app.clone().oneshot(req).await.unwrap()).await
    }

    /// Posts a multipart form. Each part is `(name, filename, bytes)`.
    async fn send_form(
        app: &Router,
        uri: &str,
        parts: &[(&str, Option<&str>, &[u8])],
    ) -> (StatusCode, Value) {
        const BOUNDARY: &str = "okr-test-boundary";
        let mut body = Vec::new();
        for (name, filename, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        read(app.clone().oneshot(req).await.unwrap()).await
    }

    async fn read(res: axum::response::Response) -> (StatusCode, Value) {
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(&[]);
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "okr-api");
        let (status, _) = send(&app, "GET", "/health/db", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_okr_lifecycle_through_api() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY, PASS, PASS, PASS]);

        let (status, created) = send(
            &app,
            "POST",
            "/api/v1/okrs",
            Some(json!({
                "title": "Publish AI Articles",
                "description": "I want to publish 3 AI articles this quarter.",
                "targetDate": "2025-09-30"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["okr"]["status"], "active");
        assert_eq!(created["okr"]["totalTasks"], 2);
        assert_eq!(created["plan"]["source"], "llm");

        let okr_id = created["okr"]["id"].as_str().unwrap().to_string();
        let task_id = created["okr"]["tasks"][0]["id"].as_str().unwrap().to_string();

        let (status, outcome) = send(
            &app,
            "POST",
            &format!("/api/v1/tasks/{task_id}/submissions"),
            Some(json!({
                "submission_type": "text",
                "content": "Drafted article 1: 1,800 words on AI in healthcare"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["success"], true);

        let (_, okr) = send(&app, "GET", &format!("/api/v1/okrs/{okr_id}"), None).await;
        assert_eq!(okr["progress"], 50);
        assert_eq!(okr["completedTasks"], 1);

        let (_, reports) =
            send(&app, "GET", &format!("/api/v1/tasks/{task_id}/reports"), None).await;
        assert_eq!(reports.as_array().unwrap().len(), 1);
        let report_id = outcome["reportId"].as_str().unwrap();
        let (status, _) = send(&app, "GET", &format!("/api/v1/reports/{report_id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, stats) = send(&app, "GET", "/api/v1/dashboard/stats", None).await;
        assert_eq!(stats["activeOkrs"], 1);
        assert_eq!(stats["completedTasks"], 1);
        assert_eq!(stats["overallProgress"], 50);
    }

    #[tokio::test]
    async fn test_short_description_rejected() {
        let app = app(&[]);
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/okrs",
            Some(json!({"title": "x", "description": "short", "targetDate": "2025-09-30"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_ids_are_404() {
        let app = app(&[]);
        let missing = uuid::Uuid::new_v4();
        for uri in [
            format!("/api/v1/okrs/{missing}"),
            format!("/api/v1/tasks/{missing}"),
            format!("/api/v1/reports/{missing}"),
            format!("/api/v1/tasks/{missing}/reports"),
        ] {
            let (status, body) = send(&app, "GET", &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/tasks/{missing}/submissions"),
            Some(json!({"submission_type": "text", "content": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_manual_task_must_fit_okr_deadline() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY]);
        let (_, created) = send(
            &app,
            "POST",
            "/api/v1/okrs",
            Some(json!({
                "title": "Publish AI Articles",
                "description": "I want to publish 3 AI articles this quarter.",
                "targetDate": "2025-09-30"
            })),
        )
        .await;
        let okr_id = created["okr"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/tasks",
            Some(json!({"okrId": okr_id, "title": "Late task", "deadline": "2025-10-15"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");

        let (status, task) = send(
            &app,
            "POST",
            "/api/v1/tasks",
            Some(json!({
                "okrId": okr_id,
                "title": "Share on LinkedIn",
                "deadline": "2025-09-20",
                "evidenceHint": "linkedIn-url"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["status"], "pending");
        assert_eq!(task["level"], "medium");
    }

    async fn create_okr(app: &Router) -> Value {
        let (status, created) = send(
            app,
            "POST",
            "/api/v1/okrs",
            Some(json!({
                "title": "Publish AI Articles",
                "description": "I want to publish 3 AI articles this quarter.",
                "targetDate": "2025-09-30"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[tokio::test]
    async fn test_task_patch_keeps_invariants() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY]);
        let created = create_okr(&app).await;
        let task_id = created["okr"]["tasks"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/tasks/{task_id}");

        let (status, body) =
            send(&app, "PATCH", &uri, Some(json!({"deadline": "2026-12-31"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
        let (_, task) = send(&app, "GET", &uri, None).await;
        assert_eq!(task["deadline"], "2025-08-01");

        let (status, task) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"deadline": "2025-09-15", "status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["deadline"], "2025-09-15");
        assert_eq!(task["status"], "completed");
        assert!(task["completedAt"].is_string());

        let missing = uuid::Uuid::new_v4();
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/v1/tasks/{missing}"),
            Some(json!({"deadline": "2025-09-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pdf_upload_is_validated() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY, PASS, PASS, PASS]);
        let created = create_okr(&app).await;
        let task_id = created["okr"]["tasks"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/tasks/{task_id}/submissions/upload");
        let pdf = sample_pdf();

        let (status, outcome) = send_form(
            &app,
            &uri,
            &[
                ("submissionType", None, &b"pdf"[..]),
                ("file", Some("article.pdf"), pdf.as_slice()),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{outcome}");
        assert_eq!(outcome["success"], true);
        assert_eq!(outcome["report"]["submissionType"], "pdf");
        assert_eq!(outcome["report"]["checks"][0]["status"], "passed");

        let (_, task) = send(&app, "GET", &format!("/api/v1/tasks/{task_id}"), None).await;
        assert_eq!(task["status"], "completed");
    }

    #[tokio::test]
    async fn test_upload_form_errors() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY]);
        let created = create_okr(&app).await;
        let task_id = created["okr"]["tasks"][0]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/tasks/{task_id}/submissions/upload");

        let (status, body) = send_form(&app, &uri, &[("submission_type", None, &b"pdf"[..])]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "file is required");

        let (status, body) =
            send_form(&app, &uri, &[("file", Some("a.pdf"), &b"%PDF-1.4"[..])]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "submissionType is required");

        let (status, _) = send_form(
            &app,
            &uri,
            &[
                ("submissionType", None, &b"fax"[..]),
                ("file", Some("a.pdf"), &b"x"[..]),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_request_fields_accept_both_casings() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY, PARSE_REPLY, PARSE_REPLY, PASS, PASS, PASS]);
        let created = create_okr(&app).await;
        let task_id = created["okr"]["tasks"][0]["id"].as_str().unwrap().to_string();

        for body in [
            json!({"okrText": "Publish 3 AI articles by 2025-09-30"}),
            json!({"okr_text": "Publish 3 AI articles by 2025-09-30"}),
        ] {
            let (status, parsed) = send(&app, "POST", "/api/v1/okrs/parse", Some(body)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(parsed["objective"], "Publish 3 AI articles");
        }
        let (status, body) =
            send(&app, "POST", "/api/v1/okrs/parse", Some(json!({"okrText": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "okrText cannot be empty");

        let (status, outcome) = send(
            &app,
            "POST",
            &format!("/api/v1/tasks/{task_id}/submissions"),
            Some(json!({
                "submissionType": "text",
                "content": "Drafted article 1: 1,800 words on AI in healthcare"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["report"]["submissionType"], "text");

        let (status, task) = send(
            &app,
            "POST",
            &format!("/api/v1/tasks/{task_id}/complete?proofUrl=https://example.com/a1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["proofUrl"], "https://example.com/a1");
    }

    #[tokio::test]
    async fn test_reminder_endpoints() {
        let app = app(&[PARSE_REPLY, TASKS_REPLY]);
        let (_, created) = send(
            &app,
            "POST",
            "/api/v1/okrs",
            Some(json!({
                "title": "Publish AI Articles",
                "description": "I want to publish 3 AI articles this quarter.",
                "targetDate": "2025-09-30"
            })),
        )
        .await;
        let task_id = created["okr"]["tasks"][0]["id"].as_str().unwrap().to_string();

        let (status, reminder) = send(
            &app,
            "POST",
            "/api/v1/reminders",
            Some(json!({
                "taskId": task_id,
                "message": "Draft due tomorrow",
                "deliveryMethod": "email",
                "scheduledFor": "2999-01-01T09:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reminder["status"], "pending");

        let (_, upcoming) = send(&app, "GET", "/api/v1/reminders/upcoming", None).await;
        assert_eq!(upcoming.as_array().unwrap().len(), 1);

        let id = reminder["id"].as_str().unwrap();
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/v1/reminders/{id}/status"),
            Some(json!({"status": "cancelled"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, upcoming) = send(&app, "GET", "/api/v1/reminders/upcoming", None).await;
        assert!(upcoming.as_array().unwrap().is_empty());

        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/reminders",
            Some(json!({
                "taskId": uuid::Uuid::new_v4(),
                "message": "orphan",
                "deliveryMethod": "email",
                "scheduledFor": "2999-01-01T09:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
