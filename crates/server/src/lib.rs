pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod game;
pub mod relationships;
pub mod routes;
pub mod store;
pub mod sync;
