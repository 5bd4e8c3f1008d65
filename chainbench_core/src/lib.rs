pub mod benchmark;
pub mod helpers;
pub mod keys;
pub mod pricing;
pub mod providers;
pub mod storage;
