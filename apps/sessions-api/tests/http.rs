use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{
		Request, StatusCode,
		header::{CONTENT_DISPOSITION, CONTENT_TYPE},
	},
	response::Response,
};
use tower::util::ServiceExt;

use sessions_api::{routes, state::AppState};
use sessions_domain::ElementRecord;
use sessions_service::SessionService;
use sessions_testkit::{
	MemoryStore,
	fixtures::{self, ELEMENTS_INDEX},
};

const BOUNDARY: &str = "sessions-test-boundary";

fn app(records: &[ElementRecord]) -> (Router, Arc<MemoryStore>) {
	let store =
		Arc::new(MemoryStore::with_records(ELEMENTS_INDEX, records).expect("Failed to seed store."));
	let service =
		SessionService::new(fixtures::test_config(fixtures::default_bulk_request()), store.clone());

	(routes::router(AppState::from_service(service)), store)
}

fn seeded(chain_id: &str, count: usize) -> Vec<ElementRecord> {
	(0..count)
		.flat_map(|index| {
			fixtures::session_records(
				&format!("{chain_id}-s{index:02}"),
				chain_id,
				&format!("2024-01-01T10:{index:02}:00"),
				1,
			)
		})
		.collect()
}

async fn call(app: Router, request: Request<Body>) -> Response {
	app.oneshot(request).await.expect("Failed to call router.")
}

async fn json_body(response: Response) -> serde_json::Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

fn json_request(method: &str, uri: &str, payload: serde_json::Value) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header(CONTENT_TYPE, "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
	Request::builder().method(method).uri(uri).body(Body::empty()).expect("Failed to build request.")
}

fn multipart_request(file_name: &str, content: &[u8]) -> Request<Body> {
	let mut payload = format!(
		"--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; \
		 filename=\"{file_name}\"\r\nContent-Type: application/json\r\n\r\n"
	)
	.into_bytes();

	payload.extend_from_slice(content);
	payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

	Request::builder()
		.method("POST")
		.uri("/v1/sessions/import")
		.header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
		.body(Body::from(payload))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let (app, _) = app(&[]);
	let response = call(app, empty_request("GET", "/health")).await;

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn get_session_returns_tree() {
	let (app, _) = app(&seeded("c-1", 1));
	let response = call(app, empty_request("GET", "/v1/sessions/c-1-s00")).await;

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["id"], "c-1-s00");
	assert_eq!(json["chainId"], "c-1");
	assert_eq!(json["sessionElements"][0]["elementId"], "c-1-s00-root");
}

#[tokio::test]
async fn head_reports_session_existence() {
	let (app, _) = app(&seeded("c-1", 1));
	let found = call(app.clone(), empty_request("HEAD", "/v1/sessions/c-1-s00")).await;
	let missing = call(app, empty_request("HEAD", "/v1/sessions/absent")).await;

	assert_eq!(found.status(), StatusCode::OK);
	assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chain_search_pages_previews() {
	let (app, _) = app(&seeded("c-1", 3));
	let response = call(
		app,
		json_request("POST", "/v1/sessions/chains/c-1?offset=0&count=2", serde_json::json!({})),
	)
	.await;

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json["offset"], 2);
	assert_eq!(json["sessions"][0]["id"], "c-1-s02");
	assert_eq!(json["sessions"][1]["id"], "c-1-s01");
}

#[tokio::test]
async fn search_with_unknown_sort_column_is_bad_request() {
	let (app, _) = app(&seeded("c-1", 1));
	let response = call(
		app,
		json_request("POST", "/v1/sessions?sortColumn=bogus", serde_json::json!({})),
	)
	.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "invalid_query");
	assert!(
		json["message"].as_str().is_some_and(|message| message.contains("Valid columns are")),
		"Unexpected body: {json}"
	);
}

#[tokio::test]
async fn deleting_chains_by_query_list() {
	let mut records = seeded("c-1", 2);

	records.extend(seeded("c-2", 1));
	records.extend(seeded("c-3", 1));

	let (app, store) = app(&records);
	let response = call(app, empty_request("DELETE", "/v1/sessions/chains?chainIds=c-1,c-3")).await;

	assert_eq!(response.status(), StatusCode::OK);

	let remaining = store.records().expect("Failed to read store.");

	assert_eq!(remaining.len(), 2);
	assert!(remaining.iter().all(|record| record.chain_id.as_deref() == Some("c-2")));
}

#[tokio::test]
async fn export_sets_attachment_headers() {
	let (app, _) = app(&seeded("c-1", 2));
	let response = call(
		app,
		json_request("POST", "/v1/sessions/export", serde_json::json!(["c-1-s00", "absent"])),
	)
	.await;

	assert_eq!(response.status(), StatusCode::OK);

	let disposition = response
		.headers()
		.get(CONTENT_DISPOSITION)
		.and_then(|value| value.to_str().ok())
		.expect("Missing content disposition.")
		.to_string();

	assert!(
		disposition.starts_with("attachment; filename=chain-sessions-c-1-("),
		"Unexpected header: {disposition}"
	);

	let json = json_body(response).await;

	assert_eq!(json.as_array().map(Vec::len), Some(1));
	assert_eq!(json[0]["id"], "c-1-s00");
}

#[tokio::test]
async fn export_accepts_get_with_id_list() {
	let (app, _) = app(&seeded("c-1", 1));
	let response =
		call(app, json_request("GET", "/v1/sessions/export", serde_json::json!(["c-1-s00"]))).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert!(response.headers().contains_key(CONTENT_DISPOSITION));

	let json = json_body(response).await;

	assert_eq!(json[0]["id"], "c-1-s00");
}

#[tokio::test]
async fn empty_export_request_is_bad_request() {
	let (app, _) = app(&[]);
	let response =
		call(app, json_request("POST", "/v1/sessions/export", serde_json::json!([]))).await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn import_of_stored_session_conflicts() {
	let (app, store) = app(&seeded("c-1", 1));
	let sessions = vec![fixtures::session_tree("c-1-s00", "c-1", "2024-01-01T10:00:00", 1)];
	let content = serde_json::to_vec(&sessions).expect("Failed to render import file.");
	let response = call(app, multipart_request("dup.json", &content)).await;

	assert_eq!(response.status(), StatusCode::CONFLICT);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "import_conflict");
	assert_eq!(json["fields"][0], "c-1-s00");
	assert!(store.bulk_calls().is_empty());
}

#[tokio::test]
async fn import_returns_sessions_without_elements() {
	let (app, store) = app(&[]);
	let sessions = vec![fixtures::session_tree("s-9", "c-9", "2024-01-01T10:00:00", 2)];
	let content = serde_json::to_vec(&sessions).expect("Failed to render import file.");
	let response = call(app, multipart_request("sessions.json", &content)).await;

	assert_eq!(response.status(), StatusCode::OK);

	let json = json_body(response).await;

	assert_eq!(json[0]["id"], "s-9");
	assert_eq!(json[0]["importedSession"], true);
	assert!(json[0].get("sessionElements").is_none());
	assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn import_accepts_files_beyond_default_body_limit() {
	let (app, store) = app(&[]);
	let sessions: Vec<_> = ["big-1", "big-2"]
		.into_iter()
		.map(|session_id| {
			let mut session = fixtures::session_tree(session_id, "c-1", "2024-01-01T10:00:00", 1);

			let root = session.session_elements.as_mut().and_then(|roots| roots.first_mut());

			if let Some(root) = root {
				root.body_before = Some("x".repeat(1_200_000));
			}

			session
		})
		.collect();
	let content = serde_json::to_vec(&sessions).expect("Failed to render import file.");

	assert!(content.len() > 2 * 1_024 * 1_024);

	let response = call(app, multipart_request("big.json", &content)).await;

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(store.len(), 4);
}
