pub mod app;
pub mod cache;
pub mod card;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod observability;
pub mod screens;
pub mod terminal;
pub mod tmdb;
