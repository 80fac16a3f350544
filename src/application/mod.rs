pub mod accounts;
pub mod error;
pub mod posts;
pub mod repos;
pub mod sessions;
