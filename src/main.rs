#[macro_use]
extern crate tracing;

use museo::{AppState, Config, SeedMuseum, Seeder, routes};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::signal::unix::SignalKind;
use tracing::Level;

#[tokio::main]
async fn main() {
	// Set up the tracing subscriber.
	// This will print out all logs to the console.
	tracing_subscriber::fmt()
		.pretty()
		.with_thread_names(true)
		.with_max_level(Level::INFO)
		.init();

	// Load the configuration from the environment,
	// and create a database pool.
	let config = Config::from_env();
	let database_pool = config.create_database_pool();

	// Load the museum catalogue on boot if a seed file is configured.
	if let Some(seed_file) = config.museum_seed_file.clone() {
		let conn = database_pool
			.get()
			.await
			.expect("COULD NOT GET DATABASE CONNECTION");
		let seeder = Seeder::new(&conn);

		seeder
			.populate(&seed_file, async |conn, museums| {
				for museum in museums {
					SeedMuseum::insert(museum, conn).await?;
				}

				Ok(())
			})
			.await;
	}

	// Create the app router and listener.
	let router = routes::get_app_router(AppState { config, database_pool });

	let listener = TcpListener::bind("0.0.0.0:80").await.unwrap();

	// Start the server.
	debug!("listening on {}", listener.local_addr().unwrap());
	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown_handler())
		.await
		.unwrap();
}

/// Gracefully shutdown the server on SIGINT or SIGTERM.
async fn shutdown_handler() {
	let ctrl_c = async {
		signal::ctrl_c().await.expect("COULD NOT INSTALL CTRL+C HANDLER");
	};

	let terminate = async {
		signal::unix::signal(SignalKind::terminate())
			.expect("COULD NOT INSTALL TERMINATE SIGNAL HANDLER")
			.recv()
			.await;
	};

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}
