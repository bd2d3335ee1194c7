use std::sync::Arc;

use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use secrecy::SecretString;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::{
        domain::UploadedDocument,
        dto::{
            request::ToggleOptionRequest,
            response::{CheckAnswerResponse, FetchMoreResponse, SessionCreatedResponse},
        },
    },
    services::FetchMode,
};

pub const FILE_NAME_HEADER: &str = "x-file-name";
pub const API_KEY_HEADER: &str = "x-api-key";

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[post("/api/sessions")]
async fn create_session(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let session = state.sessions.create().await;
    let response = SessionCreatedResponse {
        session_id: session.id(),
        snapshot: session.snapshot().await,
    };
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/sessions/{id}")]
async fn get_session(
    state: web::Data<Arc<AppState>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(&id).await?;
    Ok(HttpResponse::Ok().json(session.snapshot().await))
}

#[delete("/api/sessions/{id}")]
async fn delete_session(
    state: web::Data<Arc<AppState>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.sessions.remove(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Raw-body upload. Replaces whatever quiz the session held.
#[post("/api/sessions/{id}/document")]
async fn upload_document(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    id: web::Path<Uuid>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(&id).await?;

    let document = UploadedDocument {
        name: header_value(&req, FILE_NAME_HEADER).unwrap_or_else(|| "upload".to_string()),
        mime_type: header_value(&req, "content-type").unwrap_or_default(),
        bytes: body.to_vec(),
    };
    let api_key = header_value(&req, API_KEY_HEADER).map(SecretString::from);

    log::info!(
        "Upload of '{}' ({}) to session {} [{}]",
        document.name,
        document.mime_type,
        session.id(),
        get_request_id(&req).unwrap_or_default()
    );

    // Runs detached so a dropped connection cannot leave the session stuck in loading.
    let worker = Arc::clone(&session);
    tokio::spawn(async move { worker.start_session(document, api_key).await }).await??;

    Ok(HttpResponse::Ok().json(session.snapshot().await))
}

#[post("/api/sessions/{id}/questions/{index}/options")]
async fn toggle_option(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(Uuid, usize)>,
    request: web::Json<ToggleOptionRequest>,
) -> Result<HttpResponse, AppError> {
    let (id, index) = path.into_inner();
    let request = request.into_inner();
    request.validate()?;

    let session = state.sessions.get(&id).await?;
    session.toggle_option(index, &request.option).await?;
    Ok(HttpResponse::Ok().json(session.snapshot().await))
}

#[post("/api/sessions/{id}/questions/{index}/check")]
async fn check_answer(
    state: web::Data<Arc<AppState>>,
    path: web::Path<(Uuid, usize)>,
) -> Result<HttpResponse, AppError> {
    let (id, index) = path.into_inner();
    let session = state.sessions.get(&id).await?;

    let outcome = session.check_answer(index).await?;
    let response = CheckAnswerResponse {
        is_correct: outcome.is_correct,
        prefetch_triggered: outcome.prefetch.is_some(),
        snapshot: session.snapshot().await,
    };
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/fetch")]
async fn fetch_more(
    state: web::Data<Arc<AppState>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(&id).await?;

    let outcome = session.spawn_fetch(FetchMode::Manual).await?;
    let response = FetchMoreResponse {
        outcome,
        snapshot: session.snapshot().await,
    };
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/reset")]
async fn reset_session(
    state: web::Data<Arc<AppState>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(&id).await?;
    session.reset().await;
    Ok(HttpResponse::Ok().json(session.snapshot().await))
}

#[delete("/api/sessions/{id}/notice")]
async fn dismiss_notice(
    state: web::Data<Arc<AppState>>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.get(&id).await?;
    session.dismiss_notice().await;
    Ok(HttpResponse::Ok().json(session.snapshot().await))
}

#[get("/health")]
async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len().await,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(create_session)
        .service(get_session)
        .service(delete_session)
        .service(upload_document)
        .service(toggle_option)
        .service(check_answer)
        .service(fetch_more)
        .service(reset_session)
        .service(dismiss_notice);
}
