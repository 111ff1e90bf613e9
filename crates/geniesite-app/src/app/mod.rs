pub mod generate;
pub mod web_server;

pub use generate::run_generate;
pub use web_server::run_web_server;
