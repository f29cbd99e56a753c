//! Compiler from operator properties to a validated OpenTelemetry
//! collector configuration.
//!
//! Stages: [`normalize`] → [`assemble::from_legacy`] (legacy input only) →
//! [`secrets::interpolate`] → [`validator::validate_document`] →
//! [`assemble::finalize`] → [`emit`]. [`Compiler`] runs them in order.

#![warn(clippy::pedantic)]

pub mod assemble;
pub mod compiler;
pub mod document;
pub mod emit;
pub mod error;
pub mod normalize;
pub mod properties;
pub mod secrets;
pub mod validator;

pub use compiler::{Compilation, Compiler, CompilerSettings};
pub use document::ConfigDocument;
pub use error::CompileError;
pub use normalize::normalize;
pub use properties::Properties;
