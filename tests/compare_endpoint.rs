//! Endpoint tests for `POST /compare-wireframe-webpage` over a fake model.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tower::util::ServiceExt; // for `oneshot`
use wireframe_gateway::{
    ComparisonGateway, GatewayConfig, ModelError, ModelQuery, ModelReply, VisionModel, router,
};

const BOUNDARY: &str = "wireframe-gateway-test-boundary";

/// Fake model that counts calls and answers with a fixed outcome.
struct RecordingModel {
    outcome: Result<String, ModelError>,
    calls: AtomicUsize,
}

impl VisionModel for RecordingModel {
    async fn generate(&self, _query: ModelQuery) -> Result<ModelReply, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone().map(|response| ModelReply {
            status: 200,
            response,
        })
    }
}

fn gateway_with(
    config: GatewayConfig,
    outcome: Result<String, ModelError>,
) -> Arc<ComparisonGateway<RecordingModel>> {
    Arc::new(ComparisonGateway::new(
        config,
        RecordingModel {
            outcome,
            calls: AtomicUsize::new(0),
        },
    ))
}

fn gateway(outcome: Result<String, ModelError>) -> Arc<ComparisonGateway<RecordingModel>> {
    gateway_with(GatewayConfig::default(), outcome)
}

fn calls(gateway: &ComparisonGateway<RecordingModel>) -> usize {
    gateway.model().calls.load(Ordering::SeqCst)
}

/// A multipart part: field name, optional filename, content.
type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
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
    body
}

fn compare_request(parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/compare-wireframe-webpage")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(
    gateway: &Arc<ComparisonGateway<RecordingModel>>,
    request: Request<Body>,
) -> (StatusCode, Value) {
    let response = router(gateway.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn report() -> Value {
    json!({
        "wireframe_elements": ["header", "search bar"],
        "webpage_elements": ["header"],
        "implemented_elements": ["header"],
        "missing_elements": ["search bar"],
        "additional_elements": [],
        "layout_differences": ["header is taller"],
        "overall_similarity_score": "60",
        "implementation_status": "partially implemented"
    })
}

#[tokio::test]
async fn test_missing_webpage_is_rejected_without_model_call() {
    let gateway = gateway(Ok(report().to_string()));
    let (status, body) = send(
        &gateway,
        compare_request(&[("wireframe", Some("wire.png"), PNG)]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Both 'wireframe' and 'webpage' image files are required" })
    );
    assert_eq!(calls(&gateway), 0);
}

#[tokio::test]
async fn test_form_value_is_not_an_upload() {
    let gateway = gateway(Ok(report().to_string()));
    let (status, body) = send(
        &gateway,
        compare_request(&[
            ("wireframe", None, &b"wire.png"[..]),
            ("webpage", Some("page.png"), PNG),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Both 'wireframe' and 'webpage' image files are required"
    );
    assert_eq!(calls(&gateway), 0);
}

#[tokio::test]
async fn test_non_multipart_body_is_missing_files() {
    let gateway = gateway(Ok(report().to_string()));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/compare-wireframe-webpage")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"wireframe": "wire.png"}"#))
        .unwrap();

    let (status, body) = send(&gateway, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Both 'wireframe' and 'webpage' image files are required"
    );
    assert_eq!(calls(&gateway), 0);
}

#[tokio::test]
async fn test_bad_filenames_are_rejected_without_model_call() {
    let cases: [(&str, &str, &str); 4] = [
        ("wire", "page.png", "Invalid wireframe file"),
        ("wire.png", "page", "Invalid webpage file"),
        (
            "wire.gif",
            "page.png",
            "Unsupported file type for wireframe. Use PNG, JPG, or JPEG",
        ),
        (
            "wire.JPG",
            "page.webp",
            "Unsupported file type for webpage. Use PNG, JPG, or JPEG",
        ),
    ];

    for (wireframe, webpage, expected) in cases {
        let gateway = gateway(Ok(report().to_string()));
        let (status, body) = send(
            &gateway,
            compare_request(&[
                ("wireframe", Some(wireframe), PNG),
                ("webpage", Some(webpage), PNG),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "case {wireframe} / {webpage}");
        assert_eq!(body, json!({ "error": expected }));
        assert_eq!(calls(&gateway), 0);
    }
}

#[tokio::test]
async fn test_structured_reply_is_relayed() {
    let reply = format!("Sure! Here is the analysis:\n```json\n{}\n```", report());
    let gateway = gateway(Ok(reply));

    let (status, body) = send(
        &gateway,
        compare_request(&[
            ("notes", None, &b"ignored"[..]),
            ("wireframe", Some("wire.png"), PNG),
            ("webpage", Some("page.jpeg"), PNG),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "comparison_results": report() })
    );
    assert_eq!(calls(&gateway), 1);
}

#[tokio::test]
async fn test_plain_text_reply_is_summarised() {
    let gateway = gateway(Ok("The page looks like the wireframe.".to_string()));
    let (status, body) = send(
        &gateway,
        compare_request(&[
            ("wireframe", Some("wire.png"), PNG),
            ("webpage", Some("page.png"), PNG),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let results = &body["comparison_results"];
    assert_eq!(results["overall_similarity_score"], "N/A");
    assert_eq!(results["missing_elements"], json!([]));
    assert_eq!(
        results["implementation_status"],
        "The page looks like the wireframe."
    );
}

#[tokio::test]
async fn test_malformed_json_reply_keeps_raw_text() {
    let reply = "{ wireframe_elements: header }";
    let gateway = gateway(Ok(reply.to_string()));
    let (status, body) = send(
        &gateway,
        compare_request(&[
            ("wireframe", Some("wire.png"), PNG),
            ("webpage", Some("page.png"), PNG),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["comparison_results"],
        json!({ "error": "Failed to parse AI response", "raw_response": reply })
    );
}

#[tokio::test]
async fn test_model_failure_is_server_error() {
    let gateway = gateway(Err(ModelError::Status(502)));
    let (status, body) = send(
        &gateway,
        compare_request(&[
            ("wireframe", Some("wire.png"), PNG),
            ("webpage", Some("page.png"), PNG),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Ollama API error: 502" }));
    assert_eq!(calls(&gateway), 1);
}

#[tokio::test]
async fn test_oversized_upload_is_server_error() {
    let gateway = gateway_with(
        GatewayConfig::default().with_max_upload_bytes(256),
        Ok(report().to_string()),
    );
    let large = vec![7u8; 4096];
    let (status, body) = send(
        &gateway,
        compare_request(&[
            ("wireframe", Some("wire.png"), large.as_slice()),
            ("webpage", Some("page.png"), PNG),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"].as_str().unwrap().starts_with("Server error: "),
        "unexpected body {body}"
    );
    assert_eq!(calls(&gateway), 0);
}

#[tokio::test]
async fn test_banner_route() {
    let gateway = gateway(Ok(String::new()));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = router(gateway).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
