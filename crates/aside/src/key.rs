// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The key builder: from a directive and bound arguments to final cache keys.

use crate::directive::{CacheDirective, DirectiveError};
use crate::error::DispatchError;
use crate::evaluate::{Evaluator, FragmentValue};

/// The final cache key(s) for one dispatch.
///
/// Either exactly one key, or an ordered sequence positionally aligned with
/// the elements of the directive's multi-valued argument. Constructed fresh
/// per dispatch and discarded afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedKeys {
    /// Exactly one final key.
    Single(String),
    /// One final key per element of the multi-valued argument, in order.
    Multi(Vec<String>),
}

impl ResolvedKeys {
    /// Returns the keys as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(key) => std::slice::from_ref(key),
            Self::Multi(keys) => keys,
        }
    }

    /// Iterates over the keys.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.as_slice().iter().map(String::as_str)
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if there are no keys.
    ///
    /// A `Multi` set may be empty when the source sequence was empty; a
    /// `Single` key never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Builds the final cache key(s) for a directive.
///
/// Scalar fragments append `connector + value` to the accumulated key. The
/// multi-valued fragment (at most one) expands the accumulated key into one
/// key per element; scalar fragments after it suffix every expanded key.
///
/// Pure function of its inputs; no store access happens here.
pub(crate) fn build_keys<A, E>(directive: &CacheDirective, evaluator: &E, args: &A) -> Result<ResolvedKeys, DispatchError>
where
    E: Evaluator<A> + ?Sized,
{
    if directive.fragments.iter().filter(|fragment| fragment.multi).count() > 1 {
        return Err(DirectiveError::MultipleMultiValued.into());
    }

    let mut single = directive.base_key.clone();
    let mut expanded: Option<Vec<String>> = None;

    for fragment in &directive.fragments {
        let connector = fragment.connector.as_deref().unwrap_or("");
        match evaluator.evaluate(fragment, args)? {
            FragmentValue::Sequence(elements) => {
                if expanded.is_some() {
                    return Err(DirectiveError::MultipleMultiValued.into());
                }
                expanded = Some(
                    elements
                        .iter()
                        .map(|element| format!("{single}{connector}{element}"))
                        .collect(),
                );
            }
            FragmentValue::Scalar(value) => {
                let suffix = format!("{connector}{value}");
                match &mut expanded {
                    Some(keys) => {
                        for key in keys {
                            key.push_str(&suffix);
                        }
                    }
                    None => single.push_str(&suffix),
                }
            }
        }
    }

    match expanded {
        Some(keys) => Ok(ResolvedKeys::Multi(keys)),
        None if single.is_empty() => Err(DirectiveError::EmptyKey.into()),
        None => Ok(ResolvedKeys::Single(single)),
    }
}
