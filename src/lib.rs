pub mod animals;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;
pub mod schema;
pub mod state;
pub mod users;

#[cfg(test)]
pub(crate) mod test_util;
