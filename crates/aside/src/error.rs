// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The dispatch error taxonomy.
//!
//! Every failure inside the cache-aside decision path is one of these kinds.
//! None of them ever reaches a caller: the fallback layer matches the kind,
//! records it, and invokes the underlying computation directly.

use crate::codec::CodecError;
use crate::directive::DirectiveError;
use crate::evaluate::EvalError;

/// An error raised inside the cache-aside decision path.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The directive is malformed: empty composed key, more than one
    /// multi-valued fragment, or a GET with a void result shape.
    #[error("invalid cache directive: {0}")]
    Configuration(#[from] DirectiveError),

    /// A key fragment expression could not be evaluated against the bound
    /// arguments.
    #[error("cache key derivation failed: {0}")]
    KeyDerivation(#[from] EvalError),

    /// The cache store failed.
    #[error("cache store operation failed: {0}")]
    Store(#[from] aside_store::Error),

    /// Encoding or decoding a cached value failed.
    #[error("cache value codec failed: {0}")]
    Serialization(#[from] CodecError),
}

impl DispatchError {
    /// A stable label for the error kind, used in logs and telemetry.
    ///
    /// The match is exhaustive on purpose: adding an error kind forces a
    /// decision about how the fallback layer reports it.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::KeyDerivation(_) => "key-derivation",
            Self::Store(_) => "store",
            Self::Serialization(_) => "serialization",
        }
    }
}
