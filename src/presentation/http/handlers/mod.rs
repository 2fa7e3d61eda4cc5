pub mod health;
pub mod paginate;
