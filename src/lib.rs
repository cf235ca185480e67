pub mod app;
pub mod config;
pub mod gateway;
pub mod models;
pub mod session;
pub mod tmdb;
pub mod trailer;
pub mod view;
