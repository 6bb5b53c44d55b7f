// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The directive model: what to cache and how.
//!
//! A [`CacheDirective`] describes one cacheable call site: the operation kind,
//! the base key, TTL overrides, penetration-guard settings, and the
//! [`KeyFragment`]s that derive the final key(s) from call arguments.
//! Directives are immutable once constructed and read-only during dispatch.

/// The cache operation a directive performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Serve from cache on a hit; compute and store on a miss.
    Get,
    /// Recompute and refresh the cache unconditionally.
    Put,
    /// Evict the derived keys, then compute (write-through invalidation).
    Remove,
}

/// The shape the cached value decodes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ResultShape {
    /// The computation yields nothing cacheable. Invalid for GET.
    Void,
    /// A single value.
    #[default]
    Value,
    /// A sequence of values; required for batch dispatch.
    Sequence,
}

/// One key fragment, sourced from one call argument.
///
/// Fragments are evaluated in declaration order. Each contributes either one
/// suffix (scalar) or, when [`multi`](Self::multi) is set, one independent
/// final key per element of the evaluated sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyFragment {
    /// Name of the source argument.
    pub argument: String,
    /// Extraction expression over the argument; `None` means the whole
    /// argument.
    pub expression: Option<String>,
    /// Separator prefixed to each extracted value before concatenation.
    pub connector: Option<String>,
    /// Marks this fragment as producing a sequence of key suffixes.
    pub multi: bool,
}

impl KeyFragment {
    /// Creates a fragment that uses the whole named argument.
    #[must_use]
    pub fn new(argument: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            expression: None,
            connector: None,
            multi: false,
        }
    }

    /// Sets the extraction expression, e.g. `"account.id"`.
    #[must_use]
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Sets the connector prefixed to each extracted value, e.g. `":"`.
    #[must_use]
    pub fn connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = Some(connector.into());
        self
    }

    /// Marks this fragment as multi-valued.
    ///
    /// At most one fragment per directive may be multi-valued.
    #[must_use]
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }
}

/// Describes one cacheable call site.
///
/// Construct with [`CacheDirective::get`], [`CacheDirective::put`], or
/// [`CacheDirective::remove`], then adjust fields or chain the helpers.
///
/// # Examples
///
/// ```
/// use aside::{CacheDirective, KeyFragment};
///
/// let directive = CacheDirective::get("ACCOUNT")
///     .fragment(KeyFragment::new("id").connector(":"))
///     .expires_in(60);
/// assert_eq!(directive.base_key, "ACCOUNT");
/// ```
#[derive(Clone, Debug)]
pub struct CacheDirective {
    /// The operation kind.
    pub operation: Operation,
    /// The key prefix every derived key starts from.
    pub base_key: String,
    /// The shape cached values decode to. GET requires a non-void shape.
    pub result_shape: ResultShape,
    /// Per-call TTL override in seconds; negative means "use the process
    /// default".
    pub expire_seconds: i64,
    /// Per-call empty-marker TTL override in seconds; negative means "use
    /// the process default".
    pub empty_expire_seconds: i64,
    /// Whether a null computation result is cached as an empty-marker
    /// sentinel (penetration guard).
    pub cache_empty_result: bool,
    /// For PUT: whether to evict the key before invoking the computation.
    pub remove_before_write: bool,
    /// The key fragments, evaluated in order.
    pub fragments: Vec<KeyFragment>,
}

impl CacheDirective {
    fn new(operation: Operation, base_key: impl Into<String>, result_shape: ResultShape) -> Self {
        Self {
            operation,
            base_key: base_key.into(),
            result_shape,
            expire_seconds: crate::ttl::TTL_UNSET,
            empty_expire_seconds: crate::ttl::TTL_UNSET,
            cache_empty_result: true,
            remove_before_write: false,
            fragments: Vec::new(),
        }
    }

    /// Creates a GET directive with a value result shape.
    #[must_use]
    pub fn get(base_key: impl Into<String>) -> Self {
        Self::new(Operation::Get, base_key, ResultShape::Value)
    }

    /// Creates a PUT directive with a value result shape.
    #[must_use]
    pub fn put(base_key: impl Into<String>) -> Self {
        Self::new(Operation::Put, base_key, ResultShape::Value)
    }

    /// Creates a REMOVE directive.
    #[must_use]
    pub fn remove(base_key: impl Into<String>) -> Self {
        Self::new(Operation::Remove, base_key, ResultShape::Void)
    }

    /// Appends a key fragment.
    #[must_use]
    pub fn fragment(mut self, fragment: KeyFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Sets the result shape.
    #[must_use]
    pub fn shaped(mut self, result_shape: ResultShape) -> Self {
        self.result_shape = result_shape;
        self
    }

    /// Overrides the normal-value TTL for this call site, in seconds.
    #[must_use]
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expire_seconds = seconds;
        self
    }

    /// Overrides the empty-marker TTL for this call site, in seconds.
    #[must_use]
    pub fn empty_expires_in(mut self, seconds: i64) -> Self {
        self.empty_expire_seconds = seconds;
        self
    }

    /// Checks the directive's internal invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::VoidResult`] for a GET with a void result
    /// shape, and [`DirectiveError::MultipleMultiValued`] when more than one
    /// fragment is multi-valued. Both fail before any cache access.
    pub fn validate(&self) -> Result<(), DirectiveError> {
        if self.operation == Operation::Get && self.result_shape == ResultShape::Void {
            return Err(DirectiveError::VoidResult);
        }
        if self.fragments.iter().filter(|fragment| fragment.multi).count() > 1 {
            return Err(DirectiveError::MultipleMultiValued);
        }
        Ok(())
    }
}

/// A malformed directive.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// The final single key was empty after fragment composition.
    #[error("cache key is empty after fragment composition")]
    EmptyKey,
    /// More than one fragment is multi-valued.
    #[error("at most one key fragment may be multi-valued")]
    MultipleMultiValued,
    /// A GET directive declared a void result shape.
    #[error("GET requires a non-void result shape")]
    VoidResult,
    /// A multi-valued fragment reached the single-key dispatch path.
    #[error("a multi-valued key fragment requires batch dispatch")]
    MultiValuedSinglePath,
    /// Batch dispatch was requested for a directive that does not support it.
    #[error("batch dispatch requires a GET directive with a sequence result shape and a multi-valued fragment")]
    NotBatchable,
}
