//! Application state shared across handlers

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    models::{Movie, User},
    pipeline::Pipeline,
    repositories::{MemoryRepository, PgMovieRepository, PgUserRepository, Repository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub movies: Pipeline<Movie>,
    pub users: Pipeline<User>,
}

impl AppState {
    pub fn new(movies: Arc<dyn Repository<Movie>>, users: Arc<dyn Repository<User>>) -> Self {
        Self {
            movies: Pipeline::new(movies),
            users: Pipeline::new(users),
        }
    }

    /// State backed by PostgreSQL through `pool`
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgMovieRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
        )
    }

    /// State backed by empty in-process tables
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::<Movie>::new()),
            Arc::new(MemoryRepository::<User>::new()),
        )
    }
}

impl FromRef<AppState> for Pipeline<Movie> {
    fn from_ref(state: &AppState) -> Self {
        state.movies.clone()
    }
}

impl FromRef<AppState> for Pipeline<User> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}
