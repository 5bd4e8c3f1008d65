pub mod dto;
pub mod handler;
