//! # Museo backend library

#[macro_use]
extern crate tracing;

use axum::extract::FromRef;
use common::DbPool;

mod config;
mod seeder;

pub mod controllers;
pub mod routes;
pub mod schemas;

pub use config::*;
pub use seeder::*;

/// Common state of the app
#[derive(Clone)]
pub struct AppState {
	pub config:        Config,
	pub database_pool: DbPool,
}

impl FromRef<AppState> for Config {
	fn from_ref(input: &AppState) -> Self { input.config.clone() }
}

impl FromRef<AppState> for DbPool {
	fn from_ref(input: &AppState) -> Self { input.database_pool.clone() }
}
