pub mod api;
pub mod dtos;
