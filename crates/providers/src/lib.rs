//! Model service implementations for Dossier.
//!
//! All chat backends implement the `dossier_core::Provider` trait. The
//! agent loop only sees a `TextGenerator`; [`ChatGenerator`] adapts a
//! provider to that contract, and [`router::build_from_config`] picks the
//! endpoint from configuration.

pub mod generator;
pub mod openai_compat;
pub mod router;

pub use generator::ChatGenerator;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, endpoint_for};
