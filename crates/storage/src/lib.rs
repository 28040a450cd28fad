#![forbid(unsafe_code)]

pub mod assets;
pub mod repository;
pub mod sqlite;
