pub mod adapter;
pub mod alchemy;
pub mod codex;
pub mod covalent;
pub mod dto;
pub mod error;
pub mod mobula;
pub mod moralis;
