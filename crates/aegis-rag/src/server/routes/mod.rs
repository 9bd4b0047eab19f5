//! API routes for the Aegis server

pub mod documents;
pub mod email;
pub mod query;
pub mod report;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, MethodRouter},
    Router,
};

use crate::server::state::AppState;

/// Register a handler at `path` and at `path/`
fn route_both(router: Router<AppState>, path: &str, handler: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{}/", path), handler)
}

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    let mut router = Router::new();

    // Uploads and email carry files, so they get the larger body limit
    router = route_both(
        router,
        "/upload-document",
        post(documents::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
    );
    router = route_both(
        router,
        "/send-email",
        post(email::send_email).layer(DefaultBodyLimit::max(max_upload_size)),
    );
    router = route_both(router, "/documents", get(documents::list_documents));
    router = route_both(router, "/query", post(query::query));
    router = route_both(router, "/reset-session", post(query::reset_session));
    router = route_both(router, "/status", get(query::status));
    router = route_both(router, "/generate-pdf-binary", post(report::generate_pdf_binary));
    router = route_both(router, "/generate-pdf", post(report::generate_pdf_base64));

    router.route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "aegis-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over uploaded PDF documents",
        "endpoints": {
            "POST /upload-document": "Upload a PDF and add it to the knowledge base",
            "POST /query": "Ask a question about the uploaded documents",
            "POST /reset-session": "Forget the conversation history",
            "GET /documents": "List stored documents",
            "GET /status": "Knowledge base status",
            "POST /generate-pdf-binary": "Render HTML to a PDF download",
            "POST /generate-pdf": "Render HTML to a base64-encoded PDF",
            "POST /send-email": "Email a report as an attachment"
        }
    }))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::RagConfig;
    use crate::error::{Error, Result};
    use crate::ingestion::parser::tests::make_pdf;
    use crate::mail::{Mailer, OutgoingEmail};
    use crate::pipeline::{Pipeline, PipelineOptions};
    use crate::providers::testing::{KeywordEmbedder, RecordingLlm};
    use crate::providers::{AiProviders, LocalDocumentStore};
    use crate::report::ReportRenderer;
    use crate::server::state::AppState;
    use crate::server::RagServer;

    const BOUNDARY: &str = "AEGISTESTBOUNDARY";

    struct StaticRenderer {
        fail: bool,
    }

    #[async_trait]
    impl ReportRenderer for StaticRenderer {
        async fn render(&self, html: &str) -> Result<Vec<u8>> {
            if self.fail {
                return Err(Error::Report("renderer exited with 1".to_string()));
            }
            Ok(format!("%PDF-1.4 {}", html).into_bytes())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<()> {
            self.sent.lock().push(email);
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct TestApp {
        _dir: TempDir,
        router: axum::Router,
        mailer: Arc<RecordingMailer>,
    }

    async fn app_with(renderer_fails: bool, with_mailer: bool) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.storage.documents_dir = dir.path().join("documents");
        config.storage.vector_store_path = dir.path().join("vector_store");

        let pipeline = Pipeline::open(
            PipelineOptions::from_config(&config),
            AiProviders {
                embedder: Arc::new(KeywordEmbedder::new()),
                llm: Arc::new(RecordingLlm::new()),
            },
            Arc::new(LocalDocumentStore::new(&config.storage.documents_dir).unwrap()),
        )
        .await
        .unwrap();

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::from_parts(
            config.clone(),
            pipeline,
            Arc::new(StaticRenderer { fail: renderer_fails }),
            with_mailer.then(|| mailer.clone() as Arc<dyn Mailer>),
        );

        TestApp {
            _dir: dir,
            router: RagServer::with_state(config, state).build_router(),
            mailer,
        }
    }

    async fn app() -> TestApp {
        app_with(false, true).await
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part]) -> Body {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                            name, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(body)
    }

    fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart(parts))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload_hello(app: &TestApp) -> (StatusCode, Value) {
        let pdf = make_pdf("Hello World from Aegis");
        send_json(
            app,
            multipart_request("/upload-document", &[Part::File("file", "hello.pdf", &pdf)]),
        )
        .await
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let app = app().await;

        let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");

        let (status, _) = send(&app, Request::get("/ready/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_query_before_upload_is_not_ready() {
        let app = app().await;
        let (status, body) =
            send_json(&app, json_request("/query", serde_json::json!({"question": "Hi?"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "not_ready");
    }

    #[tokio::test]
    async fn test_upload_then_query() {
        let app = app().await;

        let (status, body) = upload_hello(&app).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["filename"], "hello.pdf");
        assert!(body["chunks"].as_u64().unwrap() >= 1);

        let (status, _) = send(&app, Request::get("/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send_json(
            &app,
            json_request("/query/", serde_json::json!({"question": "Who says hello?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "answer 1");
        assert_eq!(body["sources"][0]["filename"], "hello.pdf");

        let (_, body) = send_json(&app, Request::get("/status").body(Body::empty()).unwrap()).await;
        assert_eq!(body["state"], "ready");
        assert_eq!(body["conversation_turns"], 1);

        let (status, body) = send_json(&app, Request::post("/reset-session/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let (_, body) = send_json(&app, Request::get("/status").body(Body::empty()).unwrap()).await;
        assert_eq!(body["conversation_turns"], 0);
    }

    #[tokio::test]
    async fn test_documents_listing() {
        let app = app().await;
        upload_hello(&app).await;

        let (status, body) =
            send_json(&app, Request::get("/documents").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["documents"][0]["filename"], "hello.pdf");
        assert!(body["documents"][0]["indexed_chunks"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_server_error() {
        let app = app().await;
        let (status, body) = send_json(
            &app,
            multipart_request(
                "/upload-document",
                &[Part::File("file", "broken.pdf", b"%PDF-1.4\nnot really a pdf")],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "ingestion_error");

        let (status, _) = send(&app, Request::get("/ready").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_input() {
        let app = app().await;

        let (status, body) = send_json(
            &app,
            multipart_request("/upload-document/", &[Part::File("file", "notes.txt", b"plain text")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "parse_error");

        let (status, _) = send_json(
            &app,
            multipart_request("/upload-document", &[Part::Text("comment", "no file here")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let app = app().await;
        upload_hello(&app).await;

        let (status, body) =
            send_json(&app, json_request("/query", serde_json::json!({"question": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request");
    }

    #[tokio::test]
    async fn test_generate_pdf_binary() {
        let app = app().await;
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "/generate-pdf-binary",
                serde_json::json!({"html_content": "<h1>Report</h1>"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.pdf\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.4 <h1>Report</h1>");
    }

    #[tokio::test]
    async fn test_generate_pdf_base64() {
        let app = app().await;
        let (status, body) = send_json(
            &app,
            json_request("/generate-pdf/", serde_json::json!({"html_content": "<p>x</p>"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        let pdf = STANDARD
            .decode(body["pdf_content_base64"].as_str().unwrap())
            .unwrap();
        assert_eq!(pdf, b"%PDF-1.4 <p>x</p>");
    }

    #[tokio::test]
    async fn test_render_failure_is_server_error() {
        let app = app_with(true, true).await;
        let (status, body) = send_json(
            &app,
            json_request("/generate-pdf-binary", serde_json::json!({"html_content": "<p>x</p>"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "report_error");
    }

    #[tokio::test]
    async fn test_send_email() {
        let app = app().await;
        let (status, body) = send_json(
            &app,
            multipart_request(
                "/send-email/",
                &[
                    Part::Text("recipient", "analyst@example.com"),
                    Part::Text("subject", "Report"),
                    Part::Text("body", "Attached."),
                    Part::File("pdf_file", "summary.pdf", b"%PDF-1.4 test"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let sent = app.mailer.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "analyst@example.com");
        assert_eq!(sent[0].attachment.filename, "summary.pdf");
        assert_eq!(sent[0].attachment.data, b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_send_email_missing_recipient() {
        let app = app().await;
        let (status, _) = send_json(
            &app,
            multipart_request(
                "/send-email",
                &[
                    Part::Text("subject", "Report"),
                    Part::File("file", "summary.pdf", b"%PDF-1.4 test"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.mailer.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_send_email_without_smtp() {
        let app = app_with(false, false).await;
        let (status, body) = send_json(
            &app,
            multipart_request(
                "/send-email",
                &[
                    Part::Text("recipient", "analyst@example.com"),
                    Part::Text("subject", "Report"),
                    Part::File("pdf_file", "summary.pdf", b"%PDF-1.4 test"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["type"], "not_configured");
    }
}
