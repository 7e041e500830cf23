pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod scoring;
pub mod services;
pub mod utils;
pub mod validate;

use axum::Router;

use crate::db::Db;
use crate::services::auth::AuthService;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub auth: AuthService,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: Db, secure_cookies: bool) -> Self {
        let auth = AuthService::new(db.clone());
        Self {
            db,
            auth,
            secure_cookies,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::quiz::routes())
        .merge(handlers::admin::routes())
        .with_state(state)
}
