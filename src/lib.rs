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
    account_service::AccountService, candidate_service::CandidateService,
    profile_service::ProfileService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub candidate_service: CandidateService,
    pub profile_service: ProfileService,
    pub account_service: AccountService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let candidate_service = CandidateService::new(pool.clone());
        let profile_service = ProfileService::new(pool.clone());
        let account_service = AccountService::new(pool.clone());

        Self {
            pool,
            candidate_service,
            profile_service,
            account_service,
        }
    }
}
