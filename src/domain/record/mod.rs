pub mod projection;
pub mod repository;
