pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:session_id",
            delete(session::handle_end_session),
        )
        // Analysis
        .route(
            "/api/v1/sessions/:session_id/analyze",
            post(analysis::handle_analyze),
        )
        .route(
            "/api/v1/sessions/:session_id/analyze/upload",
            post(analysis::handle_analyze_upload),
        )
        // History and learning
        .route(
            "/api/v1/sessions/:session_id/history",
            post(session::handle_record_analysis)
                .get(session::handle_get_history)
                .delete(session::handle_clear_history),
        )
        .route(
            "/api/v1/sessions/:session_id/insights",
            get(session::handle_get_insights),
        )
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::orchestrator::NarrativeGenerator;
    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::session::learning::BulletLineExtractor;
    use crate::session::registry::SessionRegistry;

    const RESUME: &str = "SUMMARY\nBackend engineer.\nSKILLS\nPython, Docker\nEXPERIENCE\n- Led a team of 5 engineers.";
    const JOB: &str = "Looking for Python and AWS skills.";
    const BOUNDARY: &str = "resume-coach-test-boundary";

    struct StubGenerator {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl NarrativeGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl NarrativeGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    fn app(generator: Arc<dyn NarrativeGenerator>) -> Router {
        app_with_config(generator, Config::for_tests())
    }

    fn app_with_config(generator: Arc<dyn NarrativeGenerator>, config: Config) -> Router {
        build_router(AppState {
            sessions: SessionRegistry::new(Arc::new(BulletLineExtractor), config.max_sessions),
            generator,
            config,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        read_response(app.clone().oneshot(request).await.unwrap()).await
    }

    async fn upload(app: &Router, uri: &str, parts: &[(&str, Option<&str>, &str)]) -> (StatusCode, Value) {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        read_response(app.clone().oneshot(request).await.unwrap()).await
    }

    async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_reports_active_sessions() {
        let app = app(StubGenerator::new("ok"));
        create_session(&app).await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_sessions"], 1);
    }

    #[tokio::test]
    async fn test_full_session_flow() {
        let app = app(StubGenerator::new("Solid start.\n- Add AWS projects\n- Quantify impact"));
        let id = create_session(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let analysis = body["analysis"].clone();
        assert_eq!(analysis["scores"]["keyword_match"], 50.0);
        assert_eq!(analysis["keyword_matches"]["matched"], json!(["python"]));
        assert_eq!(analysis["keyword_matches"]["missing"], json!(["aws"]));
        assert_eq!(analysis["section_analysis"]["skills"]["content"], "Python, Docker");

        let (status, entry) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/history"),
            Some(json!({
                "resume_text": RESUME,
                "job_description": JOB,
                "analysis_results": analysis,
                "custom_note": "Mention the migration project"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["is_latest"], true);
        assert_eq!(entry["is_modified"], true);
        assert!(entry["analysis_results"]["ai_suggestions"]
            .as_str()
            .unwrap()
            .ends_with("📌 Custom Notes:\nMention the migration project"));

        let (_, history) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/history"), None).await;
        assert_eq!(history["entries"].as_array().unwrap().len(), 1);

        let (status, insights) =
            send(&app, Method::GET, &format!("/api/v1/sessions/{id}/insights"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(insights["top_keywords"], json!(["python"]));
        assert_eq!(insights["top_improvements"][0]["phrase"], "Add AWS projects");
        assert_eq!(insights["section_coverage"]["skills"], 1);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, history) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/history"), None).await;
        assert!(history["entries"].as_array().unwrap().is_empty());

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/history"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = app(StubGenerator::new("ok"));
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{}/analyze", uuid::Uuid::new_v4()),
            Some(json!({ "resume_text": RESUME })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_blank_resume_is_rejected() {
        let app = app(StubGenerator::new("ok"));
        let id = create_session(&app).await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            Some(json!({ "resume_text": "   \n" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generation_failure_returns_partial_result() {
        let app = app(Arc::new(FailingGenerator));
        let id = create_session(&app).await;
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "FEEDBACK_GENERATION_ERROR");
        assert_eq!(body["partial_result"]["scores"]["keyword_match"], 50.0);
        assert_eq!(body["partial_result"]["ai_suggestions"], "");
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_history_or_insights() {
        let app = app(StubGenerator::new("- Add metrics"));
        let a = create_session(&app).await;
        let b = create_session(&app).await;

        let (_, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{a}/analyze"),
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{a}/history"),
            Some(json!({
                "resume_text": RESUME,
                "job_description": JOB,
                "analysis_results": body["analysis"]
            })),
        )
        .await;

        let (_, history) = send(&app, Method::GET, &format!("/api/v1/sessions/{b}/history"), None).await;
        assert!(history["entries"].as_array().unwrap().is_empty());
        let (_, insights) = send(&app, Method::GET, &format!("/api/v1/sessions/{b}/insights"), None).await;
        assert_eq!(insights["top_keywords"], json!([]));
        assert_eq!(insights["top_improvements"], json!([]));
    }

    #[tokio::test]
    async fn test_learned_hints_reach_the_next_prompt() {
        let generator = StubGenerator::new("- Add metrics");
        let app = app(generator.clone());
        let id = create_session(&app).await;

        let (_, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            Some(json!({ "resume_text": RESUME, "job_description": "Python and Docker" })),
        )
        .await;
        send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/history"),
            Some(json!({
                "resume_text": RESUME,
                "job_description": "Python and Docker",
                "analysis_results": body["analysis"]
            })),
        )
        .await;

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            Some(json!({ "resume_text": "Experienced Python developer." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let prompt = generator.last_prompt();
        assert!(prompt.contains("Consider adding these successful keywords: docker"));
        assert!(prompt.contains("Common areas for improvement:\n- Add metrics"));
    }

    #[tokio::test]
    async fn test_upload_plain_text_resume() {
        let app = app(StubGenerator::new("- Add AWS projects"));
        let id = create_session(&app).await;
        let (status, body) = upload(
            &app,
            &format!("/api/v1/sessions/{id}/analyze/upload"),
            &[("file", Some("resume.txt"), RESUME), ("job_description", None, JOB)],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resume_text"], RESUME);
        assert_eq!(body["analysis"]["scores"]["keyword_match"], 50.0);
        assert_eq!(body["analysis"]["ai_suggestions"], "- Add AWS projects");
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let app = app(StubGenerator::new("ok"));
        let id = create_session(&app).await;
        let (status, body) = upload(
            &app,
            &format!("/api/v1/sessions/{id}/analyze/upload"),
            &[("job_description", None, JOB)],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_unsupported_format_is_unprocessable() {
        let app = app(StubGenerator::new("ok"));
        let id = create_session(&app).await;
        let (status, body) = upload(
            &app,
            &format!("/api/v1/sessions/{id}/analyze/upload"),
            &[("file", Some("portrait.png"), "not really an image")],
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_generation_failure_returns_extracted_text() {
        let app = app(Arc::new(FailingGenerator));
        let id = create_session(&app).await;
        let (status, body) = upload(
            &app,
            &format!("/api/v1/sessions/{id}/analyze/upload"),
            &[("file", Some("resume.txt"), RESUME)],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["resume_text"], RESUME);
        assert!(body["partial_result"]["scores"]["readability"].is_number());
    }

    #[tokio::test]
    async fn test_tampered_analysis_is_not_recorded() {
        let app = app(StubGenerator::new("- Add metrics"));
        let id = create_session(&app).await;
        let (_, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/sessions/{id}/analyze"),
            Some(json!({ "resume_text": RESUME, "job_description": JOB })),
        )
        .await;
        let analysis = body["analysis"].clone();

        let mut inflated = analysis.clone();
        inflated["scores"]["readability"] = json!(500.0);
        let mut overlapping = analysis.clone();
        overlapping["keyword_matches"] = json!({ "matched": ["python"], "missing": ["python"] });
        let mut unknown = analysis.clone();
        unknown["keyword_matches"]["missing"] = json!(["cobol"]);

        let bodies = [
            json!({ "resume_text": RESUME, "job_description": JOB, "analysis_results": inflated }),
            json!({ "resume_text": RESUME, "job_description": JOB, "analysis_results": overlapping }),
            json!({ "resume_text": RESUME, "job_description": JOB, "analysis_results": unknown }),
            json!({ "resume_text": RESUME, "analysis_results": analysis }),
        ];
        for request in bodies {
            let (status, body) = send(
                &app,
                Method::POST,
                &format!("/api/v1/sessions/{id}/history"),
                Some(request),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }

        let (_, history) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/history"), None).await;
        assert!(history["entries"].as_array().unwrap().is_empty());
        let (_, insights) = send(&app, Method::GET, &format!("/api/v1/sessions/{id}/insights"), None).await;
        assert_eq!(insights["top_keywords"], json!([]));
    }

    #[tokio::test]
    async fn test_session_creation_stops_at_capacity() {
        let mut config = Config::for_tests();
        config.max_sessions = 1;
        let app = app_with_config(StubGenerator::new("ok"), config);

        let first = create_session(&app).await;
        let (status, body) = send(&app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");

        send(&app, Method::DELETE, &format!("/api/v1/sessions/{first}"), None).await;
        let (status, _) = send(&app, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}
