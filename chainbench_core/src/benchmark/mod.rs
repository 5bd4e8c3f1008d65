pub mod completeness;
pub mod dto;
pub mod error;
pub mod handler;
pub mod sampler;
pub mod throughput;
