//! Read-only HTTP API over the character store.

use crate::store::{CharacterQuery, CharacterStore};
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use log::{error, info};
use serde::Serialize;
use std::sync::Mutex;

/// Shared state for the API handlers
pub struct AppState {
    pub store: Mutex<CharacterStore>,
}

impl AppState {
    pub fn new(store: CharacterStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn failure(message: &str) -> ApiResponse<()> {
    ApiResponse {
        success: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(failure(context))
}

#[get("/api/characters")]
async fn list_characters(data: web::Data<AppState>, query: web::Query<CharacterQuery>) -> impl Responder {
    let store = match data.store.lock() {
        Ok(store) => store,
        Err(_) => return internal_error("Store unavailable", "lock poisoned"),
    };
    match store.search(&query) {
        Ok(page) => HttpResponse::Ok().json(ApiResponse::ok(page)),
        Err(e) => internal_error("Failed to search characters", e),
    }
}

#[get("/api/characters/{id}")]
async fn get_character(data: web::Data<AppState>, id: web::Path<String>) -> impl Responder {
    let store = match data.store.lock() {
        Ok(store) => store,
        Err(_) => return internal_error("Store unavailable", "lock poisoned"),
    };
    match store.get(&id) {
        Ok(Some(character)) => HttpResponse::Ok().json(ApiResponse::ok(character)),
        Ok(None) => HttpResponse::NotFound().json(failure("Character not found")),
        Err(e) => internal_error("Failed to load character", e),
    }
}

#[get("/api/stats")]
async fn stats(data: web::Data<AppState>) -> impl Responder {
    let store = match data.store.lock() {
        Ok(store) => store,
        Err(_) => return internal_error("Store unavailable", "lock poisoned"),
    };
    match store.stats() {
        Ok(stats) => HttpResponse::Ok().json(ApiResponse::ok(stats)),
        Err(e) => internal_error("Failed to compute stats", e),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_characters)
        .service(get_character)
        .service(stats);
}

pub async fn serve(store: CharacterStore, host: &str, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(store));
    let addr = format!("{}:{}", host, port);
    info!("Listening on {}", addr);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(&addr)?
        .run()
        .await
}
