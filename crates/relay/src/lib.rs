//! Completion relay client.
//!
//! Everything the language model ever sees goes through here: bounded
//! dataset snapshots, prompt construction, and one blocking HTTP call per
//! relay operation. The relay is an external collaborator — this crate
//! forwards text and payloads and relays the answer back, nothing more.

pub mod client;
pub mod prompt;
pub mod snapshot;

pub use client::{strip_code_fences, RelayClient, RelayError};
pub use snapshot::DatasetSnapshot;
