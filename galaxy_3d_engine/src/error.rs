//! Error types for the Galaxy3D engine
//!
//! This module defines the error types used throughout the engine,
//! including rendering, initialization, memory, physics, audio, and
//! resource management.

use std::fmt;

/// Result type for Galaxy3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// Pool allocator exhausted a size class and the host fallback also failed
    AllocationFailed(String),

    /// A handle passed back into a pool/allocator no longer refers to live storage
    InvalidHandle(String),

    /// Shader reflection could not make sense of a SPIR-V module
    ReflectionFailed(String),

    /// A settings/config file could not be parsed
    InvalidConfig(String),

    /// An audio or graphics device operation failed
    DeviceError(String),

    /// An internal invariant was violated; indicates a bug rather than bad input
    InvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::AllocationFailed(msg) => write!(f, "Allocation failed: {}", msg),
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
            Error::ReflectionFailed(msg) => write!(f, "Shader reflection failed: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::DeviceError(msg) => write!(f, "Device error: {}", msg),
            Error::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Backwards-compatible alias kept for code written against the earlier error type name.
pub type Galaxy3dError = Error;
/// Backwards-compatible alias kept for code written against the earlier result type name.
pub type Galaxy3dResult<T> = Result<T>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
