pub mod app_state;
pub mod articles;
pub mod auth;
pub mod community;
pub mod config;
pub mod entities;
pub mod fetcher;
pub mod health;
pub mod metadata;
pub mod passwords;
pub mod repositories;
pub mod routes;
pub mod uploads;
pub mod videos;

#[cfg(test)]
pub mod test_support;
