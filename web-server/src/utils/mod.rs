// web-server/src/utils/mod.rs
pub mod password;
