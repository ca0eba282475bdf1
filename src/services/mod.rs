pub mod account_service;
pub mod candidate_service;
pub mod profile_service;
