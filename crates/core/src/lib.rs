//! # Dossier Core
//!
//! Domain types, traits, and error definitions for the Dossier research
//! agent. This crate does no I/O. It defines the
//! contracts that the provider, tool, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the agent loop is a trait here:
//! - [`Provider`] / [`TextGenerator`] — the model service
//! - [`ScalarCapability`] / [`StructuredCapability`] — the tools
//!
//! This keeps the loop testable with scripted fakes and keeps the
//! dependency graph pointing inward.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, TextGenerator, Usage};
pub use tool::{
    ArgumentMode, Capability, FieldKind, FieldSpec, ParsedArguments, ScalarCapability,
    StructuredCapability, ToolDescriptor, ToolRegistry,
};
