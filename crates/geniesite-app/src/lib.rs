//! GenieSite application library
//!
//! The relay server (`geniesite serve`) and the command line client
//! (`geniesite generate`).

pub mod app;
pub mod cli;
pub mod config;
pub mod relay;
pub mod web;

pub use cli::{Cli, Commands, GenerateArgs, ServeArgs};
pub use config::{parse_origins, RelayConfig, ServerConfig};
pub use relay::{instruction_prompt, relay_events, GenerationRelay, RelayError};
pub use web::{create_router, AppState, WebServer};
