//! # geniesite-model
//!
//! The upstream side of GenieSite: a generative model that streams its
//! answer as a sequence of [`ModelPart`]s, each flagged as internal
//! reasoning or user-facing output.
//!
//! - [`PartSource`] is the seam the relay depends on.
//! - [`GeminiClient`] implements it against the Gemini streaming API.
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use geniesite_model::{GeminiClient, PartSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = GeminiClient::new(
//!         Some("your-api-key".to_string()),
//!         "gemini-2.5-flash".to_string(),
//!         None,
//!     );
//!
//!     let mut parts = client.stream_parts("Create a landing page").await?;
//!     while let Some(part) = parts.next().await {
//!         let part = part?;
//!         println!("[{}] {}", if part.is_reasoning { "thought" } else { "answer" }, part.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod gemini;

pub use client::{ModelError, ModelPart, PartSource, PartStream};
pub use gemini::{GeminiClient, DEFAULT_GEMINI_MODEL, GEMINI_API_URL};
