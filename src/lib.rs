pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    assessment_service::AssessmentService, question_service::QuestionService,
    settings_service::SettingsService, task_service::TaskService, user_service::UserService,
    worker_service::WorkerService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub question_service: QuestionService,
    pub assessment_service: AssessmentService,
    pub settings_service: SettingsService,
    pub worker_service: WorkerService,
    pub task_service: TaskService,
}

impl AppState {
    /// The worker service is built separately because it loads the workers
    /// table schema from the database at startup.
    pub fn new(pool: PgPool, worker_service: WorkerService) -> Self {
        let user_service = UserService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let assessment_service = AssessmentService::new(pool.clone());
        let settings_service = SettingsService::new(pool.clone());
        let task_service = TaskService::new(pool.clone());

        Self {
            pool,
            user_service,
            question_service,
            assessment_service,
            settings_service,
            worker_service,
            task_service,
        }
    }
}
