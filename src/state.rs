use crate::{auth::AuthService, db::Database, mail::Mailer, utils::Config};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth_service: Arc<AuthService>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Arc<Config>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            auth_service: Arc::new(AuthService::new(&config)),
            mailer,
            config,
        }
    }
}
