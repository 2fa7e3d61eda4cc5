use crate::application::paginate::registry::ModelRegistry;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub registry: ModelRegistry,
    /// Present when records live in Postgres; probed by the health check.
    pub db: Option<PgPool>,
}
