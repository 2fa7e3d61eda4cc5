pub mod descriptor;
pub mod envelope;
pub mod errors;
pub mod request;
pub mod resolver;
pub mod search;
