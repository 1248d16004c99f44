//! HTTP gateway that asks a local vision-language model how closely a
//! webpage screenshot implements a wireframe.
//!
//! A request carries two images. The gateway validates them and encodes
//! them as base64, then sends them to the model with a fixed prompt in a
//! single call. The reply is free text, so the JSON comparison object is
//! recovered on a best-effort basis. A reply that holds no usable JSON still
//! produces a result. Only a failed model call turns into an HTTP error.
//!
//! The model sits behind the [`VisionModel`] trait. [`OllamaModel`] talks
//! to an Ollama server; tests and other backends can provide their own.

/// Immutable gateway configuration and its defaults.
pub mod config;

/// Error taxonomy and its HTTP mapping.
pub mod error;

/// Recovery of the comparison object from model text.
pub mod extract;

/// Upload validation and comparison orchestration.
pub mod gateway;

/// Vision model seam and the Ollama client.
pub mod model;

/// axum application exposing the comparison endpoint.
pub mod server;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use extract::{BraceMatch, ComparisonReport, ComparisonResult, extract_comparison};
pub use gateway::{ComparisonGateway, ComparisonRequest, ImageUpload};
pub use model::{ModelError, ModelQuery, ModelReply, OllamaModel, VisionModel};
pub use server::{COMPARE_ROUTE, CompareResponse, router};
