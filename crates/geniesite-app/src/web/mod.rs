// HTTP surface of the relay
pub mod routes;
pub mod server;

pub use routes::{create_router, AppError, AppState};
pub use server::{cors_layer, WebServer};
