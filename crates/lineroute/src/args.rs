//! Formal parameters and converted arguments.
//!
//! A route declares the parameters its handler expects with [`Param`]s. At
//! dispatch time every parameter is filled in, in declaration order, and
//! the handler receives them as [`Arguments`]:
//!
//! - captured placeholders are converted to the parameter's kind;
//! - uncaptured parameters receive the kind's default value, or stay absent
//!   for kinds declared without one ([`Param::optional`]).

use std::any::Any;
use std::fmt;

use crate::convert::{AnyValue, ValueKind};

/// A formal handler parameter: name plus target kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    kind: ValueKind,
}

impl Param {
    /// A parameter that defaults to `T::default()` when not captured.
    pub fn new<T: Any + Send + Default>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::of::<T>(),
        }
    }

    /// A parameter that is absent when not captured.
    pub fn optional<T: Any + Send>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::required::<T>(),
        }
    }

    /// The parameter name, matched against placeholder names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter's target kind.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }
}

/// Converted arguments handed to a handler.
///
/// Values are retrieved by parameter name and type, in the manner of
/// clap's `ArgMatches`:
///
/// ```rust
/// use lineroute::Arguments;
///
/// let mut args = Arguments::new();
/// args.insert("count", 3u32);
///
/// assert_eq!(args.get_one::<u32>("count"), Some(&3));
/// assert_eq!(args.get_one::<String>("count"), None); // wrong type
/// assert_eq!(args.remove_one::<u32>("count"), Some(3));
/// ```
#[derive(Default)]
pub struct Arguments {
    values: Vec<(String, Option<AnyValue>)>,
}

impl Arguments {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value. Used by the dispatcher and handy in handler tests.
    pub fn insert<T: Any + Send>(&mut self, name: impl Into<String>, value: T) {
        self.push(name.into(), Some(Box::new(value)));
    }

    pub(crate) fn push(&mut self, name: String, value: Option<AnyValue>) {
        self.values.push((name, value));
    }

    /// Returns the value for `name` if it is present and of type `T`.
    pub fn get_one<T: Any>(&self, name: &str) -> Option<&T> {
        self.slot(name)
            .and_then(|value| value.as_ref())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Like [`get_one`](Self::get_one) but fails with a descriptive error.
    ///
    /// Convenient inside handlers, which return `anyhow::Result`.
    pub fn get_required<T: Any>(&self, name: &str) -> Result<&T, anyhow::Error> {
        self.get_one::<T>(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Argument missing: '{}' of type {} not present",
                name,
                std::any::type_name::<T>()
            )
        })
    }

    /// Takes the value for `name` out of the set if it is of type `T`.
    ///
    /// A value of a different type is left in place.
    pub fn remove_one<T: Any>(&mut self, name: &str) -> Option<T> {
        let slot = self
            .values
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)?;

        match slot.take()?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                *slot = Some(other);
                None
            }
        }
    }

    /// Returns `true` if a value is present for `name` (of any type).
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.slot(name), Some(Some(_)))
    }

    /// Parameter names in declaration order, including absent ones.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Number of parameters, including absent ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn slot(&self, name: &str) -> Option<&Option<AnyValue>> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.values
                    .iter()
                    .map(|(name, value)| (name, if value.is_some() { "<value>" } else { "<absent>" })),
            )
            .finish()
    }
}
