//! Core library: incremental ingestion of a delimited slide transcript
//! streamed out of a chat model, plus the session loop that drives it.

pub mod assembler;
pub mod assets;
pub mod client;
pub mod config;
pub mod decode;
pub mod driver;
pub mod error;
pub mod extract;
pub mod parser;
pub mod session;

pub use assembler::PresentationAssembler;
pub use client::{ModelClient, ResponseEvent};
pub use driver::StreamDriver;
pub use error::GenerationError;
pub use parser::StreamParser;
pub use session::{GenerationSession, SessionHandle};
