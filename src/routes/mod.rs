pub mod admin_routes;
pub mod candidate_routes;
pub mod health;
