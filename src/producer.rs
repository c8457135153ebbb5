//! Value-or-function normalization
//!
//! Defaults and schemas may be handed over either as a literal value or as a
//! function computing one. Both end up as a [`Producer`], so initializers only
//! ever deal with one shape.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Keyword arguments forwarded to a default producer on `init`
pub type InitArgs = Map<String, Value>;

type ProduceFn<T> = dyn Fn(&InitArgs) -> Option<T> + Send + Sync;

/// Shared, cloneable producer of an optional value
///
/// `None` from a producer is the absence marker: no default file to write, or
/// no schema to manage.
pub struct Producer<T> {
    inner: Arc<ProduceFn<T>>,
}

impl<T> Producer<T> {
    /// Wrap a function that receives the init arguments
    pub fn with_args<F>(f: F) -> Self
    where
        F: Fn(&InitArgs) -> Option<T> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap a zero-argument function; init arguments are ignored
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Self::with_args(move |_| f())
    }

    /// Invoke the producer
    pub fn produce(&self, args: &InitArgs) -> Option<T> {
        (self.inner)(args)
    }
}

impl<T: Clone + Send + Sync + 'static> Producer<T> {
    /// Producer that always yields `value`, whatever the arguments
    pub fn value(value: impl Into<Option<T>>) -> Self {
        let value = value.into();
        Self::with_args(move |_| value.clone())
    }

    /// Producer that always yields absence
    #[must_use]
    pub fn none() -> Self {
        Self::value(Option::<T>::None)
    }
}

impl<T: Placeholders + Send + Sync + 'static> Producer<T> {
    /// Producer that yields `template` with `{key}` placeholders filled from
    /// the init arguments
    ///
    /// Placeholders without a matching argument are left as written.
    pub fn template(template: T) -> Self {
        Self::with_args(move |args| Some(template.fill(args)))
    }
}

/// Content that can carry `{key}` placeholders
pub trait Placeholders {
    /// Copy of `self` with every `{key}` present in `args` replaced
    #[must_use]
    fn fill(&self, args: &InitArgs) -> Self;
}

fn placeholder_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Placeholders for String {
    fn fill(&self, args: &InitArgs) -> Self {
        args.iter().fold(self.clone(), |filled, (key, value)| {
            filled.replace(&format!("{{{key}}}"), &placeholder_text(value))
        })
    }
}

/// Bytes are filled only when they are valid UTF-8
impl Placeholders for Vec<u8> {
    fn fill(&self, args: &InitArgs) -> Self {
        match std::str::from_utf8(self) {
            Ok(text) => text.to_string().fill(args).into_bytes(),
            Err(_) => self.clone(),
        }
    }
}

/// Placeholders are filled inside string values, keys are left alone
impl Placeholders for Value {
    fn fill(&self, args: &InitArgs) -> Self {
        match self {
            Value::String(s) => Value::String(s.fill(args)),
            Value::Array(items) => Value::Array(items.iter().map(|v| v.fill(args)).collect()),
            Value::Object(map) => Value::Object(map.fill(args)),
            other => other.clone(),
        }
    }
}

impl Placeholders for Map<String, Value> {
    fn fill(&self, args: &InitArgs) -> Self {
        self.iter()
            .map(|(key, value)| (key.clone(), value.fill(args)))
            .collect()
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> From<T> for Producer<T> {
    fn from(value: T) -> Self {
        Self::value(value)
    }
}

impl From<&str> for Producer<String> {
    fn from(value: &str) -> Self {
        Self::value(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_is_delegated() {
        let producer = Producer::from_fn(|| Some(5));
        assert_eq!(producer.produce(&InitArgs::new()), Some(5));
    }

    #[test]
    fn test_literal_value() {
        let producer = Producer::from(5);
        assert_eq!(producer.produce(&InitArgs::new()), Some(5));
    }

    #[test]
    fn test_literal_ignores_args() {
        let producer: Producer<String> = Producer::value("fixed".to_string());
        let mut args = InitArgs::new();
        args.insert("name".to_string(), json!("other"));
        assert_eq!(producer.produce(&args).as_deref(), Some("fixed"));
    }

    #[test]
    fn test_none_is_a_valid_literal() {
        let producer: Producer<String> = Producer::none();
        assert!(producer.produce(&InitArgs::new()).is_none());
    }

    #[test]
    fn test_args_are_forwarded() {
        let producer = Producer::with_args(|args| {
            let name = args.get("name").and_then(Value::as_str).unwrap_or("Test");
            Some(format!("name: {name}\n"))
        });

        assert_eq!(
            producer.produce(&InitArgs::new()).as_deref(),
            Some("name: Test\n")
        );

        let mut args = InitArgs::new();
        args.insert("name".to_string(), json!("test2"));
        assert_eq!(producer.produce(&args).as_deref(), Some("name: test2\n"));
    }

    #[test]
    fn test_template_fills_placeholders() {
        let producer = Producer::template("name: {name}\nport: {port}\nuser: {user}\n".to_string());

        let mut args = InitArgs::new();
        args.insert("name".to_string(), json!("test2"));
        args.insert("port".to_string(), json!(8080));

        assert_eq!(
            producer.produce(&args).as_deref(),
            Some("name: test2\nport: 8080\nuser: {user}\n")
        );
        assert_eq!(
            producer.produce(&InitArgs::new()).as_deref(),
            Some("name: {name}\nport: {port}\nuser: {user}\n")
        );
    }

    #[test]
    fn test_template_fills_json_string_values() {
        let template = match json!({"name": "{name}", "tags": ["{name}", 1], "{name}": true}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let producer = Producer::template(template);

        let mut args = InitArgs::new();
        args.insert("name".to_string(), json!("test2"));

        assert_eq!(
            producer.produce(&args).map(Value::Object),
            Some(json!({"name": "test2", "tags": ["test2", 1], "{name}": true}))
        );
    }

    #[test]
    fn test_template_leaves_invalid_utf8_bytes() {
        let bytes = vec![0xff, b'{', b'x', b'}'];
        let mut args = InitArgs::new();
        args.insert("x".to_string(), json!("y"));

        assert_eq!(bytes.fill(&args), bytes);
        assert_eq!(b"{x}".to_vec().fill(&args), b"y".to_vec());
    }

    #[test]
    fn test_clones_share_the_function() {
        let producer: Producer<String> = Producer::from("a");
        let cloned = producer.clone();
        assert_eq!(
            producer.produce(&InitArgs::new()),
            cloned.produce(&InitArgs::new())
        );
    }
}
