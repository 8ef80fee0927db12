//! Narrative and diagram hints from a text-generation service
//!
//! The service is an opaque collaborator: it receives a prompt that embeds
//! JSON-serialized resources or findings and returns one text blob that must
//! parse as a known JSON shape. Every failure surfaces as an
//! [`InsightError`]; callers log it and carry on with deterministic output.

pub mod client;
pub mod prompts;
pub mod service;

pub use client::{CompletionRequest, OpenAiClient, TextGenerator};
pub use service::{
    ArchitectureDescription, ConnectionSuggestion, CostInsight, InsightService, LayoutSuggestion,
    SecurityInsight, SubnetSummary,
};

use thiserror::Error;

/// Errors from the narrative service boundary
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Insight service disabled: {0}")]
    Disabled(String),

    #[error("Insight request failed: {0}")]
    Request(String),

    #[error("Insight service returned an empty response")]
    EmptyResponse,

    #[error("Failed to parse {section} response: {message}")]
    Parse { section: String, message: String },
}

pub type Result<T> = std::result::Result<T, InsightError>;
