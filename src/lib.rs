//! askg - AI-powered shell command suggester.
//!
//! Turns a natural-language query into executable shell command
//! suggestions via a chat-completions API, lets the user pick or refine
//! one, executes it through the shell, and offers a consent-gated fix
//! loop when it fails.
//!
//! # Architecture
//!
//! - [`config`] - configuration (API key, model parameters, mock mode)
//! - [`suggestion`] - the `Suggestion` record, parsing, deduplication
//! - [`system_info`] - host identification for prompt context
//! - [`http_client`] - HTTP client abstraction
//! - [`generator`] - generate / improve / fix prompt variants
//! - [`menu`] - interactive suggestion menu and choice resolution
//! - [`executor`] - shell execution with captured stderr
//! - [`session`] - one invocation end to end, including the fix loop
//!
//! # Example
//!
//! ```ignore
//! use askg::config::Config;
//! use askg::executor::SystemProcessRunner;
//! use askg::generator::LlmGenerator;
//! use askg::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let session = Session::new(
//!         Box::new(LlmGenerator::new(config.api_key()?)),
//!         Box::new(SystemProcessRunner),
//!     );
//!
//!     let stdin = std::io::stdin();
//!     session
//!         .run("find large files", &mut stdin.lock(), &mut std::io::stdout())
//!         .await
//! }
//! ```
//!
//! # Fix loop
//!
//! When an executed suggestion exits non-zero, the session reports the
//! exit code and captured stderr, then asks for consent to regenerate a
//! corrected suggestion with that failure context. The loop is iterative
//! and runs as long as the user keeps accepting; declining at any prompt
//! aborts without executing anything further.

pub mod config;
pub mod executor;
pub mod generator;
pub mod http_client;
pub mod menu;
pub mod session;
pub mod suggestion;
pub mod system_info;
