pub mod consensus;
pub mod dto;
pub mod handler;
pub mod tokens;
