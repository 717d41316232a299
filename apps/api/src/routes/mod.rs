pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::storage::handlers as library;
use crate::tailoring::handlers as documents;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Tailoring jobs
        .route("/api/v1/tailor", post(jobs::handle_tailor))
        .route("/api/v1/jobs/:id/status", get(jobs::handle_job_status))
        // Library
        .route("/api/v1/resumes", get(library::handle_list_resumes))
        .route("/api/v1/resumes/upload", post(library::handle_upload_resume))
        .route("/api/v1/results", get(library::handle_list_results))
        .route("/api/v1/results/:id/tex", get(library::handle_download_tex))
        .route("/api/v1/results/:id/pdf", get(library::handle_download_pdf))
        .route("/api/v1/results/:id", delete(library::handle_delete_result))
        // Direct document operations
        .route("/api/v1/documents/validate", post(documents::handle_validate))
        .route("/api/v1/documents/sections", post(documents::handle_sections))
        .route("/api/v1/documents/merge", post(documents::handle_merge))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::generation::generator::UnavailableGenerator;
    use crate::tailoring::fixtures::SAMPLE_RESUME;
    use crate::testing::{job_posting, test_state, ScriptedGenerator, LABELLED_REPLY};

    fn scripted_state(dir: &tempfile::TempDir) -> AppState {
        test_state(dir, Arc::new(ScriptedGenerator::replying(LABELLED_REPLY)))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_provider() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send_json(build_router(scripted_state(&dir)), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["models_available"], true);

        let state = test_state(&dir, Arc::new(UnavailableGenerator));
        let (_, body) = send_json(build_router(state), get("/health")).await;
        assert_eq!(body["models_available"], false);
        assert_eq!(body["provider"], Value::Null);
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));

        let (status, body) = send_json(
            app.clone(),
            post_json("/api/v1/documents/validate", json!({ "document": SAMPLE_RESUME })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], true);
        assert_eq!(body["brace_mismatch"], 0);

        let broken = format!("{SAMPLE_RESUME}{{");
        let (status, body) = send_json(
            app,
            post_json("/api/v1/documents/validate", json!({ "document": broken })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], false);
        assert_eq!(body["issues"][0]["kind"], "unbalanced_braces");
    }

    #[tokio::test]
    async fn test_sections_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));

        let (status, body) = send_json(
            app.clone(),
            post_json("/api/v1/documents/sections", json!({ "document": SAMPLE_RESUME })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["supported"], true);
        assert_eq!(
            body["sections"],
            json!([
                "Professional Summary",
                "Technical Proficiencies",
                "Professional Experience",
                "Education"
            ])
        );

        let moderncv = SAMPLE_RESUME.replace("{article}", "{moderncv}");
        let (_, body) = send_json(
            app,
            post_json("/api/v1/documents/sections", json!({ "document": moderncv })),
        )
        .await;
        assert_eq!(body["supported"], false);
        assert!(body["rejection"].as_str().unwrap().contains("moderncv"));
    }

    #[tokio::test]
    async fn test_merge_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));

        let (status, body) = send_json(
            app.clone(),
            post_json(
                "/api/v1/documents/merge",
                json!({ "document": SAMPLE_RESUME, "reply": { "output_text": LABELLED_REPLY } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["is_valid"], true);
        let document = body["document"].as_str().unwrap();
        assert!(document.contains("\\def \\subtitle {Platform Engineer}"));
        assert!(document.contains("Terraform"));
        assert!(body["summary"]
            .as_str()
            .unwrap()
            .starts_with("LaTeX validation passed"));
    }

    #[tokio::test]
    async fn test_merge_missing_target_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));
        let document = SAMPLE_RESUME.replace("{Technical Proficiencies}", "{Skills}");

        let (status, body) = send_json(
            app,
            post_json(
                "/api/v1/documents/merge",
                json!({ "document": document, "reply": LABELLED_REPLY }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "SECTION_NOT_FOUND");
        assert_eq!(
            body["error"]["message"],
            "section not found: Technical Proficiencies"
        );
    }

    #[tokio::test]
    async fn test_merge_unlabelled_reply_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send_json(
            build_router(scripted_state(&dir)),
            post_json(
                "/api/v1/documents/merge",
                json!({ "document": SAMPLE_RESUME, "reply": "I could not do that." }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_strict_merge_rejects_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));
        let reply = LABELLED_REPLY.replace("at scale.", "at scale {");

        let (status, body) = send_json(
            app.clone(),
            post_json(
                "/api/v1/documents/merge",
                json!({ "document": SAMPLE_RESUME, "reply": &reply }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["is_valid"], false);
        assert_eq!(body["report"]["brace_mismatch"], 1);

        let (status, body) = send_json(
            app,
            post_json(
                "/api/v1/documents/merge",
                json!({ "document": SAMPLE_RESUME, "reply": reply, "strict": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "STRUCTURAL_INVALID");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("structurally invalid document"));
    }

    #[tokio::test]
    async fn test_tailor_request_checks() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));

        let (status, body) = send_json(
            app.clone(),
            post_json(
                "/api/v1/tailor",
                json!({ "job_posting": "short", "original_resume_id": "jordan" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send_json(
            app,
            post_json(
                "/api/v1/tailor",
                json!({ "job_posting": job_posting(), "original_resume_id": "ghost" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"]["message"].as_str().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_tailor_without_provider_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, Arc::new(UnavailableGenerator));
        state
            .library
            .save_original("jordan.tex", SAMPLE_RESUME.as_bytes())
            .await
            .unwrap();

        let (status, body) = send_json(
            build_router(state),
            post_json(
                "/api/v1/tailor",
                json!({ "job_posting": job_posting(), "original_resume_id": "jordan" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_tailor_accepts_and_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let state = scripted_state(&dir);
        state
            .library
            .save_original("jordan.tex", SAMPLE_RESUME.as_bytes())
            .await
            .unwrap();
        let app = build_router(state);

        let (status, body) = send_json(
            app.clone(),
            post_json(
                "/api/v1/tailor",
                json!({
                    "job_posting": job_posting(),
                    "original_resume_id": "jordan",
                    "render_pdf": false
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "pending");
        let job_id = body["job_id"].as_str().unwrap().to_string();

        let mut last = Value::Null;
        for _ in 0..300 {
            let (status, body) =
                send_json(app.clone(), get(&format!("/api/v1/jobs/{job_id}/status"))).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] == "completed" || body["status"] == "failed" {
                last = body;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(last["status"], "completed", "{last}");
        assert_eq!(last["result"]["result_id"], "Acme_Platform_Engineer");

        let (status, bytes) = send(
            app,
            get("/api/v1/results/Acme_Platform_Engineer/tex"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(bytes).unwrap().contains("Platform Engineer"));
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = send_json(
            build_router(scripted_state(&dir)),
            get(&format!("/api/v1/jobs/{}/status", uuid::Uuid::new_v4())),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_list_and_reject() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(scripted_state(&dir));

        let upload = |filename: &str| {
            let body = format!(
                "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/x-tex\r\n\r\n\\documentclass{{article}}\r\n--XBOUNDARY--\r\n"
            );
            Request::builder()
                .method("POST")
                .uri("/api/v1/resumes/upload")
                .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
                .body(Body::from(body))
                .unwrap()
        };

        let (status, body) = send_json(app.clone(), upload("jordan.tex")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["resume_id"], "jordan");

        let (status, body) = send_json(app.clone(), upload("resume.docx")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Only .tex files are allowed");

        let (status, body) = send_json(app, get("/api/v1/resumes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "jordan");
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_results_download_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let state = scripted_state(&dir);
        state
            .library
            .write_result("Acme_SRE", SAMPLE_RESUME)
            .await
            .unwrap();
        let app = build_router(state);

        let (status, body) = send_json(app.clone(), get("/api/v1/results")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "Acme_SRE");
        assert_eq!(body[0]["has_pdf"], false);

        let response = app
            .clone()
            .oneshot(get("/api/v1/results/Acme_SRE/tex"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Acme_SRE.tex\""
        );

        let (status, _) = send(app.clone(), get("/api/v1/results/Acme_SRE/pdf")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let delete = |uri: &str| {
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };
        let (status, body) = send_json(app.clone(), delete("/api/v1/results/Acme_SRE")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted_files"], json!([".tex"]));

        let (status, _) = send_json(app, delete("/api/v1/results/Acme_SRE")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
