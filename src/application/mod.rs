pub mod paginate;
