use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use ntex::http::{header, StatusCode};
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use ntex::util::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use spdlog::{error, info, warn};

use crate::config::Config;
use crate::content::RenderedDocument;
use crate::content_cache::ContentCache;
use crate::error::{BlogError, Result};
use crate::post::{NewPost, PostId, PostUpdate};
use crate::post_processor::*;
use crate::post_store::{JsonFileStore, PostStore};
use crate::query_string::QueryString;

struct AppState {
    config: Config,
    store: Box<dyn PostStore + Send>,
    cache: ContentCache<RenderedDocument>,
}

type SharedState = web::types::State<Arc<Mutex<AppState>>>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

fn lock(state: &SharedState) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn status_of(err: &BlogError) -> StatusCode {
    match err {
        BlogError::NotFound(_) => StatusCode::NOT_FOUND,
        BlogError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        BlogError::Unauthorized => StatusCode::UNAUTHORIZED,
        BlogError::Render(_)
        | BlogError::Storage(_)
        | BlogError::Json(_)
        | BlogError::Template(_)
        | BlogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Text shown to the client. Internal failures are logged, not exposed.
fn public_message(err: &BlogError) -> String {
    match err {
        BlogError::InvalidInput(msg) => msg.clone(),
        BlogError::NotFound(_) => "Blog not found".to_string(),
        BlogError::Unauthorized => "Unauthorized".to_string(),
        BlogError::Render(_) => "Failed to render blog".to_string(),
        _ => "Internal server error".to_string(),
    }
}

fn log_error(err: &BlogError) {
    if status_of(err).is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }
}

fn json_error(err: BlogError) -> web::HttpResponse {
    log_error(&err);
    web::HttpResponse::build(status_of(&err))
        .json(&ErrorBody { error: &public_message(&err) })
}

fn html_error(err: BlogError) -> web::HttpResponse {
    log_error(&err);
    web::HttpResponse::build(status_of(&err))
        .content_type("text/html; charset=utf-8")
        .body(public_message(&err))
}

fn html_page(result: Result<String>) -> web::HttpResponse {
    match result {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(err) => html_error(err),
    }
}

fn json_page<T: Serialize>(result: Result<T>) -> web::HttpResponse {
    match result {
        Ok(value) => web::HttpResponse::Ok().json(&value),
        Err(err) => json_error(err),
    }
}

fn authorization(req: &HttpRequest) -> Option<&str> {
    req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok())
}

fn is_admin(req: &HttpRequest, config: &Config) -> bool {
    config.admin.accepts(authorization(req))
}

/// Request bodies are decoded after the admin check, so anonymous callers
/// always get 401 whatever they send.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| BlogError::InvalidInput(format!("Invalid request body: {}", e)))
}

fn query_of(req: &HttpRequest) -> QueryString {
    QueryString::from(req.uri().query().unwrap_or(""))
}

// Begin: Pages region --------
#[web::get("/")]
async fn index(state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    html_page(render_index(&state.config, &*state.store, Utc::now()))
}

#[web::get("/blog")]
async fn blog_list(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    html_page(render_post_list(&state.config, &*state.store, &query_of(&req)))
}

#[web::get("/blog/{id}")]
async fn blog_view(req: HttpRequest, id: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let mut state = lock(&state);
    let state = &mut *state;
    let id = PostId(id.into_inner());

    let result = find_post(&*state.store, &id, is_admin(&req, &state.config))
        .and_then(|post| render_post_page(&state.config, &mut state.cache, &post));
    html_page(result)
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: SharedState) -> std::result::Result<NamedFile, web::Error> {
    let state = lock(&state);
    get_file(&state.config.paths.public_dir, &path.into_inner())
}
// End: Pages region --------

#[web::get("/api/blogs")]
async fn api_list(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    let mut filter = query_of(&req).to_filter();
    if !is_admin(&req, &state.config) {
        filter.published = Some(true);
    }
    web::HttpResponse::Ok().json(&state.store.list(&filter))
}

#[web::post("/api/blogs")]
async fn api_create(req: HttpRequest, body: Bytes, state: SharedState) -> web::HttpResponse {
    let mut state = lock(&state);
    let result = state.config.admin.authorize(authorization(&req))
        .and_then(|_| parse_body::<NewPost>(&body))
        .and_then(|new_post| state.store.create(new_post));

    match result {
        Ok(post) => web::HttpResponse::Created().json(&post),
        Err(err) => json_error(err),
    }
}

#[web::get("/api/blogs/{id}")]
async fn api_get(req: HttpRequest, id: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    let id = PostId(id.into_inner());
    json_page(find_post(&*state.store, &id, is_admin(&req, &state.config)))
}

#[web::put("/api/blogs/{id}")]
async fn api_update(req: HttpRequest, id: web::types::Path<String>, body: Bytes,
                    state: SharedState) -> web::HttpResponse {
    let mut state = lock(&state);
    let state = &mut *state;
    let id = PostId(id.into_inner());

    let result = state.config.admin.authorize(authorization(&req))
        .and_then(|_| parse_body::<PostUpdate>(&body))
        .and_then(|update| state.store.update(&id, update));
    if result.is_ok() {
        state.cache.invalidate(&id);
    }
    json_page(result)
}

#[web::delete("/api/blogs/{id}")]
async fn api_delete(req: HttpRequest, id: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let mut state = lock(&state);
    let state = &mut *state;
    let id = PostId(id.into_inner());

    let result = state.config.admin.authorize(authorization(&req))
        .and_then(|_| state.store.delete(&id));
    if result.is_ok() {
        state.cache.invalidate(&id);
    }
    json_page(result.map(|_| MessageBody { message: "Blog deleted successfully" }))
}

#[web::get("/api/blogs/{id}/rendered")]
async fn api_rendered(req: HttpRequest, id: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let mut state = lock(&state);
    let state = &mut *state;
    let id = PostId(id.into_inner());
    let options = state.config.render.options();

    let result = find_post(&*state.store, &id, is_admin(&req, &state.config))
        .and_then(|post| rendered_document(&mut state.cache, &post, &options));
    match result {
        Ok(document) => web::HttpResponse::Ok().json(&*document),
        Err(err) => json_error(err),
    }
}

#[web::get("/api/admin/stats")]
async fn api_stats(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let state = lock(&state);
    let result = state.config.admin.authorize(authorization(&req))
        .map(|_| state.store.stats());
    json_page(result)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let store = JsonFileStore::open(&config.paths.data_file)
        .map_err(|e| io::Error::other(format!("Error opening post data {}: {}",
                                              config.paths.data_file.display(), e)))?;

    let cache = if config.defaults.rendering_cache_enabled {
        info!("Rendering cache enabled");
        ContentCache::new()
    } else {
        ContentCache::non_caching()
    };

    if config.admin.token.is_empty() {
        warn!("Admin token is empty. Write operations are disabled");
    }

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(Mutex::new(AppState {
        config,
        store: Box::new(store),
        cache,
    }));

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(blog_list)
            .service(blog_view)
            .service(public_files)
            .service(api_list)
            .service(api_create)
            .service(api_get)
            .service(api_update)
            .service(api_delete)
            .service(api_rendered)
            .service(api_stats)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
