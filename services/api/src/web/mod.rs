pub mod deadline;
pub mod response;
pub mod rest;
pub mod routes;
pub mod server;
pub mod state;

// Re-export what the binaries need to build the web server.
pub use routes::build_router;
pub use server::serve;
pub use state::AppState;
