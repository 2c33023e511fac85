//! Command handler types.
//!
//! A handler is the code bound to one or more routes of a controller. It
//! receives the controller instance, a [`CommandContext`] describing the
//! current dispatch and the converted [`Arguments`], and returns any
//! serializable value. That value becomes the *last result* seen by the
//! next dispatch.
//!
//! # Core Types
//!
//! - [`CommandContext`]: Environment information passed to handlers
//! - [`Handler`]: Trait for command handlers bound to a controller type
//! - [`FnHandler`]: Wrapper turning a closure or method into a [`Handler`]
//! - [`DispatchResult`]: What a successful dispatch reports back

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::args::Arguments;
use crate::describe::{describe, RouteDescription};
use crate::events::ExitRequest;
use crate::registry::RegisteredCommand;

/// Context passed to command handlers.
///
/// Borrowed from the service for the duration of a single dispatch.
///
/// ```rust
/// use lineroute::{Arguments, CommandContext};
///
/// fn goodbye(_: &mut (), ctx: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<String> {
///     ctx.request_exit();
///     Ok(format!("bye ({})", ctx.line()))
/// }
/// ```
pub struct CommandContext<'a> {
    line: &'a str,
    controller: &'a str,
    route: &'a str,
    last_result: Option<&'a Value>,
    commands: &'a [RegisteredCommand],
    exit_requested: bool,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(
        line: &'a str,
        command: &'a RegisteredCommand,
        last_result: Option<&'a Value>,
        commands: &'a [RegisteredCommand],
    ) -> Self {
        Self {
            line,
            controller: command.controller_name(),
            route: command.route().as_str(),
            last_result,
            commands,
            exit_requested: false,
        }
    }

    /// The input line being executed.
    pub fn line(&self) -> &str {
        self.line
    }

    /// Name of the controller that owns the matched route.
    pub fn controller(&self) -> &str {
        self.controller
    }

    /// Full template of the matched route, prefix included.
    pub fn route(&self) -> &str {
        self.route
    }

    /// Value returned by the previous successful handler, if any.
    pub fn last_result(&self) -> Option<&Value> {
        self.last_result
    }

    /// The previous result, deserialized into `T`.
    ///
    /// Returns `None` when there is no previous result or it does not
    /// have the shape of `T`.
    pub fn last_result_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.last_result
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Descriptions of every registered route, in registration order.
    pub fn describe_routes(&self) -> Vec<RouteDescription> {
        describe(self.commands)
    }

    /// Asks the host to stop its command loop once this dispatch completes.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Returns `true` if [`request_exit`](Self::request_exit) was called.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

impl fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("line", &self.line)
            .field("controller", &self.controller)
            .field("route", &self.route)
            .field("has_last_result", &self.last_result.is_some())
            .field("exit_requested", &self.exit_requested)
            .finish_non_exhaustive()
    }
}

/// The result type produced by an erased handler: the serialized output,
/// or `None` for a unit or null result.
pub type HandlerResult = Result<Option<Value>, anyhow::Error>;

/// Trait for command handlers of controller type `C`.
///
/// ```rust
/// use lineroute::{Arguments, CommandContext, Handler, HandlerResult};
///
/// struct Counter { count: u32 }
/// struct Increment;
///
/// impl Handler<Counter> for Increment {
///     fn handle(&self, c: &mut Counter, _: &mut CommandContext<'_>, _: Arguments) -> HandlerResult {
///         c.count += 1;
///         Ok(Some(c.count.into()))
///     }
/// }
/// ```
pub trait Handler<C>: Send + Sync + 'static {
    /// Execute the handler against a controller instance.
    fn handle(
        &self,
        controller: &mut C,
        ctx: &mut CommandContext<'_>,
        args: Arguments,
    ) -> HandlerResult;
}

/// A wrapper that implements [`Handler`] for closures and methods.
///
/// The wrapped function may return any `Result<T, E>` where `T` is
/// serializable and `E` converts into `anyhow::Error`.
pub struct FnHandler<F, T, E> {
    f: F,
    _phantom: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> FnHandler<F, T, E> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<C, F, T, E> Handler<C> for FnHandler<F, T, E>
where
    F: Fn(&mut C, &mut CommandContext<'_>, Arguments) -> Result<T, E> + Send + Sync + 'static,
    T: Serialize + 'static,
    E: Into<anyhow::Error> + 'static,
{
    fn handle(
        &self,
        controller: &mut C,
        ctx: &mut CommandContext<'_>,
        args: Arguments,
    ) -> HandlerResult {
        let output = (self.f)(controller, ctx, args).map_err(Into::into)?;
        match serde_json::to_value(output)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }
}

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    /// The handler's serialized return value; `None` for unit or null.
    pub value: Option<Value>,
    /// Name of the controller that handled the line.
    pub controller: String,
    /// Full template of the matched route.
    pub route: String,
    /// Set when the handler asked the host to exit.
    pub exit: Option<ExitRequest>,
}

impl DispatchResult {
    /// Returns `true` if the handler asked the host to exit.
    pub fn is_exit(&self) -> bool {
        self.exit.is_some()
    }

    /// The value deserialized into `T`, if present and of that shape.
    pub fn value_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.value
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
