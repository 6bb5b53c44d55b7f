// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The key-fragment evaluator capability.
//!
//! The key builder is agnostic to the concrete expression syntax; any
//! expression engine can be plugged in through [`Evaluator`]. The built-in
//! [`PathEvaluator`] resolves dotted field paths over JSON-shaped argument
//! bindings, which covers the common "take this field of that argument" case.

use serde_json::Value;

use crate::directive::KeyFragment;

/// Argument bindings for the built-in [`PathEvaluator`]: argument name to
/// JSON-shaped value.
pub type Bindings = serde_json::Map<String, Value>;

/// The result of evaluating one key fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentValue {
    /// One key suffix.
    Scalar(String),
    /// One key suffix per element, for multi-valued fragments.
    Sequence(Vec<String>),
}

/// A key-fragment expression could not be evaluated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The fragment names an argument that is not bound.
    #[error("argument `{0}` is not bound")]
    UnboundArgument(String),
    /// The expression does not resolve within the argument value.
    #[error("path `{path}` does not resolve within argument `{argument}`")]
    UnresolvedPath {
        /// The argument the path was applied to.
        argument: String,
        /// The path that failed to resolve.
        path: String,
    },
    /// A multi-valued fragment evaluated to something other than a sequence.
    #[error("multi-valued fragment for `{0}` did not evaluate to a sequence")]
    NotASequence(String),
}

/// Evaluates key fragments against bound call arguments.
///
/// Implementations must return [`FragmentValue::Sequence`] for fragments with
/// [`multi`](KeyFragment::multi) set and [`FragmentValue::Scalar`] otherwise.
pub trait Evaluator<A>: Send + Sync {
    /// Evaluates one fragment against the bound arguments.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] when the fragment cannot be evaluated; the
    /// dispatcher treats this as a key-derivation failure and falls open.
    fn evaluate(&self, fragment: &KeyFragment, args: &A) -> Result<FragmentValue, EvalError>;
}

/// A field-path evaluator over JSON-shaped argument bindings.
///
/// Expressions are dotted paths: `"account.id"` navigates object fields, and
/// a numeric segment indexes into an array. An absent expression selects the
/// whole argument. Strings render without quotes; every other value renders
/// as its JSON text.
///
/// # Examples
///
/// ```
/// use aside::{Bindings, Evaluator, FragmentValue, KeyFragment, PathEvaluator};
///
/// let mut args = Bindings::new();
/// args.insert("account".to_owned(), serde_json::json!({"id": 5}));
///
/// let fragment = KeyFragment::new("account").expression("id");
/// let value = PathEvaluator.evaluate(&fragment, &args)?;
/// assert_eq!(value, FragmentValue::Scalar("5".to_owned()));
/// # Ok::<(), aside::EvalError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PathEvaluator;

impl Evaluator<Bindings> for PathEvaluator {
    fn evaluate(&self, fragment: &KeyFragment, args: &Bindings) -> Result<FragmentValue, EvalError> {
        let root = args
            .get(&fragment.argument)
            .ok_or_else(|| EvalError::UnboundArgument(fragment.argument.clone()))?;

        let value = match fragment.expression.as_deref() {
            Some(path) => resolve_path(root, path).ok_or_else(|| EvalError::UnresolvedPath {
                argument: fragment.argument.clone(),
                path: path.to_owned(),
            })?,
            None => root,
        };

        if fragment.multi {
            match value {
                Value::Array(elements) => Ok(FragmentValue::Sequence(elements.iter().map(render).collect())),
                _ => Err(EvalError::NotASequence(fragment.argument.clone())),
            }
        } else {
            Ok(FragmentValue::Scalar(render(value)))
        }
    }
}

fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(fields) => fields.get(segment)?,
            Value::Array(elements) => elements.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(entries: &[(&str, Value)]) -> Bindings {
        entries.iter().map(|(name, value)| ((*name).to_owned(), value.clone())).collect()
    }

    #[test]
    fn whole_argument_renders_without_quotes() {
        let args = bindings(&[("name", serde_json::json!("alice"))]);
        let value = PathEvaluator
            .evaluate(&KeyFragment::new("name"), &args)
            .expect("evaluate failed");
        assert_eq!(value, FragmentValue::Scalar("alice".to_owned()));
    }

    #[test]
    fn numbers_render_as_json_text() {
        let args = bindings(&[("id", serde_json::json!(42))]);
        let value = PathEvaluator.evaluate(&KeyFragment::new("id"), &args).expect("evaluate failed");
        assert_eq!(value, FragmentValue::Scalar("42".to_owned()));
    }

    #[test]
    fn dotted_path_navigates_objects() {
        let args = bindings(&[("account", serde_json::json!({"owner": {"id": 7}}))]);
        let fragment = KeyFragment::new("account").expression("owner.id");
        let value = PathEvaluator.evaluate(&fragment, &args).expect("evaluate failed");
        assert_eq!(value, FragmentValue::Scalar("7".to_owned()));
    }

    #[test]
    fn numeric_segment_indexes_arrays() {
        let args = bindings(&[("tags", serde_json::json!(["a", "b", "c"]))]);
        let fragment = KeyFragment::new("tags").expression("1");
        let value = PathEvaluator.evaluate(&fragment, &args).expect("evaluate failed");
        assert_eq!(value, FragmentValue::Scalar("b".to_owned()));
    }

    #[test]
    fn unbound_argument_is_an_error() {
        let args = Bindings::new();
        let error = PathEvaluator
            .evaluate(&KeyFragment::new("missing"), &args)
            .expect_err("should fail");
        assert_eq!(error, EvalError::UnboundArgument("missing".to_owned()));
    }

    #[test]
    fn unresolved_path_is_an_error() {
        let args = bindings(&[("account", serde_json::json!({"id": 5}))]);
        let fragment = KeyFragment::new("account").expression("owner.id");
        let error = PathEvaluator.evaluate(&fragment, &args).expect_err("should fail");
        assert_eq!(
            error,
            EvalError::UnresolvedPath {
                argument: "account".to_owned(),
                path: "owner.id".to_owned(),
            }
        );
    }

    #[test]
    fn multi_fragment_yields_sequence() {
        let args = bindings(&[("ids", serde_json::json!([1, 2, 3]))]);
        let fragment = KeyFragment::new("ids").multi();
        let value = PathEvaluator.evaluate(&fragment, &args).expect("evaluate failed");
        assert_eq!(
            value,
            FragmentValue::Sequence(vec!["1".to_owned(), "2".to_owned(), "3".to_owned()])
        );
    }

    #[test]
    fn multi_fragment_over_scalar_is_an_error() {
        let args = bindings(&[("ids", serde_json::json!(1))]);
        let fragment = KeyFragment::new("ids").multi();
        let error = PathEvaluator.evaluate(&fragment, &args).expect_err("should fail");
        assert_eq!(error, EvalError::NotASequence("ids".to_owned()));
    }
}
