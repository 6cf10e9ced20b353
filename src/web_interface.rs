// Web Interface module root
pub mod form;
pub mod handlers;
pub mod routes;
pub mod types;
pub mod web_server;

// Re-export commonly used items
pub use handlers::AppState;
pub use web_server::*;
