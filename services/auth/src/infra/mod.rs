pub mod backend;
pub mod cache;
pub mod memory;
pub mod password;
