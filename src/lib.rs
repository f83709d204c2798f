//! Conversational response engine: curated replies from a pattern-indexed
//! knowledge base, with a generative model as fallback.
//!
//! Incoming text is normalized and matched against a file-backed knowledge
//! base of categories, each holding groups of trigger patterns and candidate
//! responses. The first pattern that hits (by substring containment on
//! normalized text, or by token overlap on the raw text) yields a random
//! response from its group. When nothing hits, the caller asks a
//! [`generator::ResponseGenerator`] instead. Exchanges are appended to the same
//! JSON file unless the caller requests privacy.
//!
//! # Store file
//!
//! ```json
//! {
//!   "messages": [{"user_id": "..", "user_message": "..", "ai_response": "..", "timestamp": ".."}],
//!   "knowledge_base": {
//!     "greetings": [{"patterns": ["hello", "hi"], "responses": ["Hey there!"]}]
//!   }
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`store`]: Store file model, load-time validation, and write-through persistence
//! - [`engine`]: Normalizer, fuzzy scorer, response selector, conversation log, statistics
//! - [`generator`]: Generative fallback providers
//! - [`routes`] / [`server`]: HTTP boundary

pub mod config;
pub mod engine;
pub mod generator;
pub mod routes;
pub mod server;
pub mod store;
