use crate::config::Config;
use axum::extract::FromRef;
use sqlx::PgPool;

/// Shared application state handed to the router.
///
/// The pool is opened once at process start and closed at shutdown;
/// handlers borrow it through the `State` extractor instead of reaching
/// for a process-wide handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
