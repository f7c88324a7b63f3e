use axum::{
	Json, Router,
	extract::{DefaultBodyLimit, Multipart, Path, Query, State},
	http::{
		StatusCode,
		header::{ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_DISPOSITION, CONTENT_TYPE},
	},
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use sessions_service::{
	Element, Error, FilterRequestAndSearch, ImportFile, Session, SessionSearchResponse,
};

const IMPORT_FIELD: &str = "files";

pub fn router(state: AppState) -> Router {
	let max_import_bytes = state.service.cfg.service.max_import_bytes;

	Router::new()
		.route("/health", get(health))
		.route("/v1/sessions", post(search_all).delete(delete_all))
		.route("/v1/sessions/export", get(export_sessions).post(export_sessions))
		.route(
			"/v1/sessions/import",
			post(import_sessions).layer(DefaultBodyLimit::max(max_import_bytes)),
		)
		.route("/v1/sessions/external-id/{external_session_id}", get(find_by_external_id))
		.route("/v1/sessions/chains", delete(delete_by_chain_ids))
		.route("/v1/sessions/chains/{chain_id}", post(search_chain).delete(delete_by_chain_id))
		.route(
			"/v1/sessions/{session_id}",
			get(find_by_id).head(session_exists).delete(delete_by_session_id),
		)
		.route("/v1/sessions/{session_id}/{element_id}", get(get_element))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageParams {
	#[serde(default)]
	offset: i64,
	#[serde(default = "default_count")]
	count: i64,
	#[serde(default = "default_sort_column")]
	sort_column: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailsParams {
	#[serde(default)]
	include_details: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainIdsParams {
	chain_ids: String,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn find_by_id(
	State(state): State<AppState>,
	Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
	tracing::debug!(%session_id, "Request to find session by id.");

	let session = state.service.find_by_id(&session_id, true, true).await?;

	Ok(Json(session))
}

async fn session_exists(
	State(state): State<AppState>,
	Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	if state.service.session_exists(&session_id).await? {
		return Ok(StatusCode::OK);
	}

	Err(Error::NotFound { message: format!("Can't find session {session_id}") }.into())
}

async fn find_by_external_id(
	State(state): State<AppState>,
	Path(external_session_id): Path<String>,
	Query(params): Query<DetailsParams>,
) -> Result<Json<Session>, ApiError> {
	tracing::debug!(%external_session_id, "Request to find session by external id.");

	let session =
		state.service.find_by_external_id(&external_session_id, params.include_details).await?;

	Ok(Json(session))
}

async fn get_element(
	State(state): State<AppState>,
	Path((session_id, element_id)): Path<(String, String)>,
) -> Result<Json<Element>, ApiError> {
	tracing::debug!(%session_id, %element_id, "Request to find session element payload.");

	let element = state.service.get_element(&element_id).await?;

	Ok(Json(element))
}

async fn search_all(
	State(state): State<AppState>,
	Query(params): Query<PageParams>,
	Json(filter): Json<FilterRequestAndSearch>,
) -> Result<Json<SessionSearchResponse>, ApiError> {
	tracing::debug!("Request to find previews.");

	let response = state
		.service
		.search_all(params.offset, params.count, &params.sort_column, &filter)
		.await?;

	Ok(Json(response))
}

async fn search_chain(
	State(state): State<AppState>,
	Path(chain_id): Path<String>,
	Query(params): Query<PageParams>,
	Json(filter): Json<FilterRequestAndSearch>,
) -> Result<Json<SessionSearchResponse>, ApiError> {
	tracing::debug!(%chain_id, "Request to find previews by chain id.");

	let response = state
		.service
		.search(Some(&chain_id), params.offset, params.count, &params.sort_column, &filter)
		.await?;

	Ok(Json(response))
}

async fn delete_by_session_id(
	State(state): State<AppState>,
	Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_by_session_id(&session_id).await?;

	Ok(StatusCode::OK)
}

async fn delete_by_chain_id(
	State(state): State<AppState>,
	Path(chain_id): Path<String>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_by_chain_id(&chain_id).await?;

	Ok(StatusCode::OK)
}

async fn delete_by_chain_ids(
	State(state): State<AppState>,
	Query(params): Query<ChainIdsParams>,
) -> Result<StatusCode, ApiError> {
	let chain_ids: Vec<String> = params
		.chain_ids
		.split(',')
		.map(str::trim)
		.filter(|id| !id.is_empty())
		.map(str::to_string)
		.collect();

	state.service.delete_by_chain_ids(&chain_ids).await?;

	Ok(StatusCode::OK)
}

async fn delete_all(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
	state.service.delete_all().await?;

	Ok(StatusCode::OK)
}

async fn export_sessions(
	State(state): State<AppState>,
	Json(session_ids): Json<Vec<String>>,
) -> Result<Response, ApiError> {
	if session_ids.is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"At least one session id is required.",
			None,
		));
	}

	let exported = state.service.export_sessions(&session_ids).await?;
	let headers = [
		(CONTENT_TYPE, "application/json".to_string()),
		(CONTENT_DISPOSITION, format!("attachment; filename={}", exported.file_name)),
		(ACCESS_CONTROL_EXPOSE_HEADERS, CONTENT_DISPOSITION.to_string()),
	];

	Ok((headers, exported.content).into_response())
}

async fn import_sessions(
	State(state): State<AppState>,
	mut multipart: Multipart,
) -> Result<Json<Vec<Session>>, ApiError> {
	let mut files = Vec::new();

	while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
		if field.name() != Some(IMPORT_FIELD) {
			continue;
		}

		let name = field.file_name().unwrap_or("unnamed").to_string();
		let content = field.bytes().await.map_err(invalid_upload)?;

		files.push(ImportFile { name, content: content.to_vec() });
	}

	if files.is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			format!("Multipart field {IMPORT_FIELD} is required."),
			Some(vec![IMPORT_FIELD.to_string()]),
		));
	}

	tracing::debug!(files = files.len(), "Request to import sessions.");

	let sessions = state.service.import_sessions(files).await?;

	Ok(Json(sessions))
}

fn default_count() -> i64 {
	20
}

fn default_sort_column() -> String {
	"sessionStarted".to_string()
}

fn invalid_upload(err: axum::extract::multipart::MultipartError) -> ApiError {
	json_error(StatusCode::BAD_REQUEST, "invalid_request", err.body_text(), None)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let message = err.to_string();

		match err {
			Error::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			Error::InvalidQuery { .. } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_query", message, None),
			Error::ImportConflict { session_ids, .. } =>
				json_error(StatusCode::CONFLICT, "import_conflict", message, Some(session_ids)),
			Error::ImportFailure { .. } =>
				json_error(StatusCode::BAD_REQUEST, "import_failure", message, None),
			Error::SearchFailure { .. } => {
				tracing::error!(error = %message, "Search store request failed.");

				json_error(StatusCode::BAD_GATEWAY, "search_failure", message, None)
			},
			Error::Export { .. } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_failure", message, None),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
		};

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
