//! Error types for route compilation, registration and dispatch.
//!
//! Registration problems surface synchronously from the registering call
//! ([`RouteError`] wrapped in [`RegistrationError`]). Everything that goes
//! wrong while executing a line is reported as a single [`CommandError`],
//! whose [`ErrorKind`] tells the caller what happened.

use std::fmt;

use thiserror::Error;

/// Boxed error used as the underlying cause of a [`CommandError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The template string was empty.
    #[error("route template cannot be empty")]
    EmptyTemplate,

    /// Two placeholders follow each other without literal text in between.
    #[error("multiple placeholders need to be separated by literal text (at byte {position})")]
    AdjacentPlaceholders { position: usize },

    /// The same placeholder name appears more than once.
    #[error("placeholder '{name}' is used more than once")]
    DuplicatePlaceholder { name: String },
}

/// Errors raised while registering controllers or argument parsers.
///
/// A failed registration leaves the service unchanged.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// One of the controller's route templates could not be compiled.
    #[error("route '{template}' of controller '{controller}' is malformed: {source}")]
    MalformedTemplate {
        controller: String,
        template: String,
        #[source]
        source: RouteError,
    },

    /// A controller of the same type is already registered.
    #[error("a controller of type '{0}' has already been registered")]
    DuplicateController(String),

    /// An argument parser for the same value kind is already registered.
    #[error("an argument parser for '{0}' has already been added")]
    DuplicateConverter(String),

    /// Per-command instantiation was requested for a controller built from
    /// a single instance.
    #[error("controller '{0}' is instantiated per command but has no factory")]
    MissingFactory(String),
}

/// Errors raised while converting a captured value to its target kind.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Neither a registered parser nor a built-in conversion exists.
    #[error("could not find a way to parse argument '{name}' of kind {kind}")]
    NoConverter { name: String, kind: String },

    /// The conversion ran and failed.
    #[error("argument '{name}' could not be converted to {kind}: {source}")]
    Failed {
        name: String,
        kind: String,
        #[source]
        source: BoxError,
    },
}

/// What went wrong during [`execute`](crate::CommandService::execute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No input line was supplied.
    EmptyInput,
    /// No registered route matched the line.
    UnknownCommand,
    /// A captured value could not be converted to its parameter's kind.
    ArgumentConversion,
    /// No conversion exists for a parameter's kind.
    NoConverter,
    /// The handler itself failed.
    HandlerExecution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::UnknownCommand => "UnknownCommand",
            ErrorKind::ArgumentConversion => "ArgumentConversion",
            ErrorKind::NoConverter => "NoConverter",
            ErrorKind::HandlerExecution => "HandlerExecution",
        };
        f.write_str(name)
    }
}

/// The uniform error returned when executing a line fails.
///
/// Carries the original input line, the [`ErrorKind`] and, when there is
/// one, the underlying cause (available through
/// [`std::error::Error::source`]).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    kind: ErrorKind,
    line: Option<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CommandError {
    pub(crate) fn new(kind: ErrorKind, line: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: line.map(str::to_string),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub(crate) fn empty_input(line: Option<&str>) -> Self {
        Self::new(ErrorKind::EmptyInput, line, "no command line specified")
    }

    pub(crate) fn unknown_command(line: &str) -> Self {
        Self::new(
            ErrorKind::UnknownCommand,
            Some(line),
            "no route matched the input",
        )
    }

    pub(crate) fn conversion(line: &str, err: ConvertError) -> Self {
        let kind = match err {
            ConvertError::NoConverter { .. } => ErrorKind::NoConverter,
            ConvertError::Failed { .. } => ErrorKind::ArgumentConversion,
        };
        Self::new(kind, Some(line), err.to_string()).with_source(err)
    }

    pub(crate) fn handler(line: &str, err: anyhow::Error) -> Self {
        Self::new(
            ErrorKind::HandlerExecution,
            Some(line),
            "an error occurred while executing the command handler",
        )
        .with_source(err)
    }

    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The input line being executed, if one was supplied.
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Human-readable description, without the cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}
