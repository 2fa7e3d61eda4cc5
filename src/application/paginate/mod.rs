pub mod dto;
pub mod registry;
pub mod use_case;
