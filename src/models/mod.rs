pub mod account;
pub mod candidate;
pub mod profile;
