//! Streaming decoder for site-migration export archives.
//!
//! `exsite-core` extracts the contents of a site-export container: a
//! sequence of stored files packed into one byte stream, in one of two
//! incompatible layouts. The decoder detects the layout, streams payloads
//! to disk with bounded memory, guards against path traversal in stored
//! entry paths and distinguishes clean completion from partial or
//! corrupted extraction.
//!
//! # Examples
//!
//! ```no_run
//! use exsite_core::ExtractOptions;
//! use exsite_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = extract_archive("site-export.bin", "restored/", &ExtractOptions::default())?;
//! println!("{} files extracted", outcome.files_extracted());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
mod binary;
pub mod config;
pub mod detect;
pub mod error;
pub mod events;
pub mod header;
pub mod io;
pub mod outcome;
pub mod path;
pub mod session;
mod text;

// Re-export main API types
pub use api::detect_format;
pub use api::extract_archive;
pub use config::ExtractOptions;
pub use detect::ContainerFormat;
pub use error::ExtractionError;
pub use error::Result;
pub use events::EventSink;
pub use events::NoopSink;
pub use outcome::ExtractionOutcome;
pub use outcome::ExtractionStats;
pub use session::ExtractionSession;
