//! Shared application state for all routes: one accessor per entity kind plus config.

use crate::accessor::{Accessor, MemoryStore, PgStore};
use crate::config::AppConfig;
use crate::model::{Admin, AskQuestion, Campus, Exercise, OrderTeacher, Student, Teacher};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct Stores {
    pub students: Arc<dyn Accessor<Student>>,
    pub teachers: Arc<dyn Accessor<Teacher>>,
    pub admins: Arc<dyn Accessor<Admin>>,
    pub campuses: Arc<dyn Accessor<Campus>>,
    pub exercises: Arc<dyn Accessor<Exercise>>,
    pub order_teachers: Arc<dyn Accessor<OrderTeacher>>,
    pub ask_questions: Arc<dyn Accessor<AskQuestion>>,
}

impl Stores {
    pub fn postgres(pool: &PgPool, schema: &str) -> Self {
        Stores {
            students: Arc::new(PgStore::<Student>::new(pool.clone(), schema)),
            teachers: Arc::new(PgStore::<Teacher>::new(pool.clone(), schema)),
            admins: Arc::new(PgStore::<Admin>::new(pool.clone(), schema)),
            campuses: Arc::new(PgStore::<Campus>::new(pool.clone(), schema)),
            exercises: Arc::new(PgStore::<Exercise>::new(pool.clone(), schema)),
            order_teachers: Arc::new(PgStore::<OrderTeacher>::new(pool.clone(), schema)),
            ask_questions: Arc::new(PgStore::<AskQuestion>::new(pool.clone(), schema)),
        }
    }

    pub fn in_memory() -> Self {
        Stores {
            students: Arc::new(MemoryStore::<Student>::new()),
            teachers: Arc::new(MemoryStore::<Teacher>::new()),
            admins: Arc::new(MemoryStore::<Admin>::new()),
            campuses: Arc::new(MemoryStore::<Campus>::new()),
            exercises: Arc::new(MemoryStore::<Exercise>::new()),
            order_teachers: Arc::new(MemoryStore::<OrderTeacher>::new()),
            ask_questions: Arc::new(MemoryStore::<AskQuestion>::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Present for the PostgreSQL backend; readiness checks ping it.
    pub pool: Option<PgPool>,
    pub stores: Stores,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn postgres(pool: PgPool, config: AppConfig) -> Self {
        AppState {
            stores: Stores::postgres(&pool, &config.schema),
            pool: Some(pool),
            config: Arc::new(config),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        AppState {
            pool: None,
            stores: Stores::in_memory(),
            config: Arc::new(config),
        }
    }
}
