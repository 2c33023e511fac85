//! Argument conversion.
//!
//! Captured placeholder values arrive as raw text. Before a handler runs,
//! each one is converted to the kind its parameter declares:
//!
//! 1. a parser registered for that kind, if any;
//! 2. otherwise the built-in conversion for primitive kinds;
//! 3. otherwise the dispatch fails with [`ConvertError::NoConverter`].
//!
//! # Built-in Kinds
//!
//! | Kind | Accepted text |
//! |------|---------------|
//! | `String` | anything, unchanged |
//! | `bool` | `true` / `false`, any ASCII case |
//! | `char` | exactly one character |
//! | integers (`i8`..`i128`, `u8`..`u128`, `isize`, `usize`) | decimal, optional sign |
//! | `f32`, `f64` | decimal or exponent notation |
//!
//! Surrounding whitespace is ignored for every built-in kind except
//! `String` and `char`.
//!
//! # Custom Parsers
//!
//! ```rust
//! use lineroute::{ArgumentParser, ConverterRegistry, ValueKind};
//!
//! #[derive(Debug, PartialEq)]
//! struct Celsius(f64);
//!
//! struct CelsiusParser;
//!
//! impl ArgumentParser for CelsiusParser {
//!     type Output = Celsius;
//!
//!     fn parse(&self, _name: &str, raw: &str) -> anyhow::Result<Celsius> {
//!         let degrees = raw.trim().trim_end_matches("°C").parse()?;
//!         Ok(Celsius(degrees))
//!     }
//! }
//!
//! let mut registry = ConverterRegistry::new();
//! registry.add(CelsiusParser)?;
//!
//! let value = registry.convert(&ValueKind::required::<Celsius>(), "temp", "21.5°C")?;
//! assert_eq!(value.downcast_ref::<Celsius>(), Some(&Celsius(21.5)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::error::{ConvertError, RegistrationError};

/// A converted argument value.
pub type AnyValue = Box<dyn Any + Send>;

/// The target type of a parameter.
///
/// Identifies the type by [`TypeId`], carries a short display name used in
/// route listings (`String`, `u32`, `Ages`), and optionally knows how to
/// build the type's default value for parameters that were not captured.
#[derive(Clone, Copy)]
pub struct ValueKind {
    id: TypeId,
    type_name: &'static str,
    default: Option<fn() -> AnyValue>,
}

fn default_value<T: Any + Send + Default>() -> AnyValue {
    Box::new(T::default())
}

impl ValueKind {
    /// A kind whose uncaptured parameters receive `T::default()`.
    pub fn of<T: Any + Send + Default>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            default: Some(default_value::<T>),
        }
    }

    /// A kind without a default: uncaptured parameters are absent.
    pub fn required<T: Any + Send>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            default: None,
        }
    }

    /// The type identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns true if this kind is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Short type name, with module paths removed.
    pub fn name(&self) -> String {
        short_type_name(self.type_name)
    }

    /// Builds the default value, if this kind has one.
    pub fn default_value(&self) -> Option<AnyValue> {
        self.default.map(|make| make())
    }
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueKind {}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueKind")
            .field("name", &self.name())
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Strips module paths from a type name, including inside generics.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;

    for (i, c) in full.char_indices() {
        if matches!(c, '<' | '>' | ',' | '(' | ')' | '[' | ']' | '&' | ';' | ' ') {
            out.push_str(last_path_segment(&full[segment_start..i]));
            out.push(c);
            segment_start = i + c.len_utf8();
        }
    }
    out.push_str(last_path_segment(&full[segment_start..]));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Converts raw captured text into a typed value.
///
/// Register implementations with [`ConverterRegistry::add`] or
/// [`CommandService::add_parser`](crate::CommandService::add_parser). At
/// most one parser may exist per output type.
pub trait ArgumentParser: Send + Sync + 'static {
    /// The type this parser produces.
    type Output: Any + Send;

    /// Parses the raw text captured for the argument called `name`.
    fn parse(&self, name: &str, raw: &str) -> anyhow::Result<Self::Output>;
}

/// An [`ArgumentParser`] backed by a closure.
///
/// Created by [`ConverterRegistry::add_fn`].
pub struct FnParser<F, T> {
    f: F,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, T> FnParser<F, T>
where
    F: Fn(&str, &str) -> anyhow::Result<T> + Send + Sync + 'static,
    T: Any + Send,
{
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<F, T> ArgumentParser for FnParser<F, T>
where
    F: Fn(&str, &str) -> anyhow::Result<T> + Send + Sync + 'static,
    T: Any + Send,
{
    type Output = T;

    fn parse(&self, name: &str, raw: &str) -> anyhow::Result<T> {
        (self.f)(name, raw)
    }
}

type ErasedParseFn = Box<dyn Fn(&str, &str) -> anyhow::Result<AnyValue> + Send + Sync>;

/// Parsers keyed by the kind they produce, with built-in fallbacks.
#[derive(Default)]
pub struct ConverterRegistry {
    parsers: HashMap<TypeId, ErasedParseFn>,
}

impl ConverterRegistry {
    /// Creates an empty registry. Built-in conversions are always available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parser for `P::Output`.
    ///
    /// Fails if a parser for the same type already exists; the registry is
    /// left unchanged in that case.
    pub fn add<P: ArgumentParser>(&mut self, parser: P) -> Result<(), RegistrationError> {
        let kind = ValueKind::required::<P::Output>();
        if self.parsers.contains_key(&kind.id()) {
            return Err(RegistrationError::DuplicateConverter(kind.name()));
        }

        tracing::debug!(kind = %kind, "registered argument parser");
        self.parsers.insert(
            kind.id(),
            Box::new(move |name: &str, raw: &str| {
                parser.parse(name, raw).map(|v| Box::new(v) as AnyValue)
            }),
        );
        Ok(())
    }

    /// Registers a closure as the parser for `T`.
    pub fn add_fn<T, F>(&mut self, f: F) -> Result<(), RegistrationError>
    where
        T: Any + Send,
        F: Fn(&str, &str) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.add(FnParser::new(f))
    }

    /// Returns `true` if a parser is registered for `kind`.
    ///
    /// Built-in conversions are not counted.
    pub fn contains(&self, kind: &ValueKind) -> bool {
        self.parsers.contains_key(&kind.id())
    }

    /// Returns `true` if `kind` has a registered parser or a built-in
    /// conversion.
    pub fn can_convert(&self, kind: &ValueKind) -> bool {
        self.contains(kind) || is_builtin(kind)
    }

    /// Number of registered parsers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Returns `true` if no parsers are registered.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Converts `raw` to `kind`.
    ///
    /// A registered parser takes precedence over the built-in conversion
    /// for the same kind.
    pub fn convert(
        &self,
        kind: &ValueKind,
        name: &str,
        raw: &str,
    ) -> Result<AnyValue, ConvertError> {
        let result = match self.parsers.get(&kind.id()) {
            Some(parse) => parse(name, raw),
            None => match convert_builtin(kind, raw) {
                Some(result) => result,
                None => {
                    return Err(ConvertError::NoConverter {
                        name: name.to_string(),
                        kind: kind.name(),
                    })
                }
            },
        };

        result.map_err(|source| ConvertError::Failed {
            name: name.to_string(),
            kind: kind.name(),
            source: source.into(),
        })
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("parsers", &self.parsers.len())
            .finish()
    }
}

/// Returns `true` if `kind` has a built-in conversion.
pub(crate) fn is_builtin(kind: &ValueKind) -> bool {
    convert_builtin(kind, "").is_some()
}

macro_rules! parse_trimmed {
    ($kind:expr, $raw:expr; $($ty:ty),+ $(,)?) => {
        $(
            if $kind.is::<$ty>() {
                return Some(
                    $raw.trim()
                        .parse::<$ty>()
                        .map(|v| Box::new(v) as AnyValue)
                        .map_err(anyhow::Error::from),
                );
            }
        )+
    };
}

/// Built-in textual conversion. `None` means the kind is not built in.
fn convert_builtin(kind: &ValueKind, raw: &str) -> Option<anyhow::Result<AnyValue>> {
    if kind.is::<String>() {
        return Some(Ok(Box::new(raw.to_string()) as AnyValue));
    }

    if kind.is::<bool>() {
        let value = raw.trim();
        return Some(if value.eq_ignore_ascii_case("true") {
            Ok(Box::new(true) as AnyValue)
        } else if value.eq_ignore_ascii_case("false") {
            Ok(Box::new(false) as AnyValue)
        } else {
            Err(anyhow::anyhow!("'{}' is not a valid boolean", raw))
        });
    }

    if kind.is::<char>() {
        let mut chars = raw.chars();
        return Some(match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Box::new(c) as AnyValue),
            _ => Err(anyhow::anyhow!("'{}' is not exactly one character", raw)),
        });
    }

    parse_trimmed!(kind, raw;
        i8, i16, i32, i64, i128, isize,
        u8, u16, u32, u64, u128, usize,
        f32, f64,
    );

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert<T: Any + Send + Default>(raw: &str) -> Result<AnyValue, ConvertError> {
        ConverterRegistry::new().convert(&ValueKind::of::<T>(), "arg", raw)
    }

    #[test]
    fn test_short_type_names() {
        assert_eq!(ValueKind::of::<String>().name(), "String");
        assert_eq!(ValueKind::of::<u32>().name(), "u32");
        assert_eq!(ValueKind::of::<Vec<String>>().name(), "Vec<String>");
        assert_eq!(
            ValueKind::of::<Option<(i32, String)>>().name(),
            "Option<(i32, String)>"
        );
    }

    #[test]
    fn test_kind_default_value() {
        let value = ValueKind::of::<u32>().default_value().unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&0));
        assert!(ValueKind::required::<u32>().default_value().is_none());
    }

    #[test]
    fn test_kind_equality_ignores_default() {
        assert_eq!(ValueKind::of::<u8>(), ValueKind::required::<u8>());
        assert_ne!(ValueKind::of::<u8>(), ValueKind::of::<i8>());
    }

    #[test]
    fn test_builtin_string_untrimmed() {
        let value = convert::<String>("  spaced ").unwrap();
        assert_eq!(value.downcast_ref::<String>().unwrap(), "  spaced ");
    }

    #[test]
    fn test_builtin_integers() {
        let value = convert::<i32>(" -42 ").unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&-42));

        let value = convert::<u64>("18446744073709551615").unwrap();
        assert_eq!(value.downcast_ref::<u64>(), Some(&u64::MAX));
    }

    #[test]
    fn test_builtin_integer_overflow_fails() {
        let err = convert::<u8>("256").unwrap_err();
        assert!(matches!(err, ConvertError::Failed { ref kind, .. } if kind == "u8"));
    }

    #[test]
    fn test_builtin_float() {
        let value = convert::<f64>("2.5e3").unwrap();
        assert_eq!(value.downcast_ref::<f64>(), Some(&2500.0));
    }

    #[test]
    fn test_builtin_bool_ignores_case() {
        let value = convert::<bool>("True").unwrap();
        assert_eq!(value.downcast_ref::<bool>(), Some(&true));
        let value = convert::<bool>(" FALSE").unwrap();
        assert_eq!(value.downcast_ref::<bool>(), Some(&false));
        assert!(convert::<bool>("yes").is_err());
    }

    #[test]
    fn test_builtin_char() {
        let value = convert::<char>("é").unwrap();
        assert_eq!(value.downcast_ref::<char>(), Some(&'é'));
        assert!(convert::<char>("ab").is_err());
        assert!(convert::<char>("").is_err());
    }

    #[test]
    fn test_unknown_kind_has_no_converter() {
        #[derive(Default)]
        struct Opaque;

        let err = convert::<Opaque>("x").unwrap_err();
        match err {
            ConvertError::NoConverter { name, kind } => {
                assert_eq!(name, "arg");
                assert_eq!(kind, "Opaque");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registered_parser_overrides_builtin() {
        let mut registry = ConverterRegistry::new();
        registry
            .add_fn(|_name, raw: &str| Ok(raw.len() as u32 * 100))
            .unwrap();

        let value = registry
            .convert(&ValueKind::of::<u32>(), "n", "abc")
            .unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&300));
    }

    #[test]
    fn test_parser_receives_argument_name() {
        let mut registry = ConverterRegistry::new();
        registry
            .add_fn(|name: &str, raw: &str| Ok(vec![name.to_string(), raw.to_string()]))
            .unwrap();

        let value = registry
            .convert(&ValueKind::of::<Vec<String>>(), "tags", "a")
            .unwrap();
        assert_eq!(
            value.downcast_ref::<Vec<String>>().unwrap(),
            &vec!["tags".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn test_duplicate_parser_rejected() {
        let mut registry = ConverterRegistry::new();
        registry.add_fn(|_, raw: &str| Ok(raw.to_uppercase())).unwrap();

        let err = registry
            .add_fn(|_, raw: &str| Ok(raw.to_lowercase()))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateConverter(ref k) if k == "String"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_parser_failure_wrapped() {
        let mut registry = ConverterRegistry::new();
        registry
            .add_fn(|_, _raw: &str| -> anyhow::Result<Vec<u8>> { anyhow::bail!("bad bytes") })
            .unwrap();

        let err = registry
            .convert(&ValueKind::of::<Vec<u8>>(), "payload", "zz")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument 'payload' could not be converted to Vec<u8>: bad bytes"
        );
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin(&ValueKind::of::<usize>()));
        assert!(is_builtin(&ValueKind::of::<String>()));
        assert!(!is_builtin(&ValueKind::of::<Vec<u8>>()));
    }

    #[test]
    fn test_can_convert_counts_parsers_and_builtins() {
        let mut registry = ConverterRegistry::new();
        let bytes = ValueKind::of::<Vec<u8>>();
        assert!(registry.can_convert(&ValueKind::of::<bool>()));
        assert!(!registry.can_convert(&bytes));

        registry
            .add_fn(|_, raw: &str| -> anyhow::Result<Vec<u8>> { Ok(raw.as_bytes().to_vec()) })
            .unwrap();
        assert!(registry.can_convert(&bytes));
        assert!(!registry.contains(&ValueKind::of::<bool>()));
    }
}
