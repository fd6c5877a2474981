pub mod access;
pub mod auth;
pub mod cipher;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod routes;
pub mod storage;
