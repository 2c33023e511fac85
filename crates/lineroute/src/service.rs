//! The command service: registration and dispatch.
//!
//! [`CommandService`] owns the registered controllers, their routes, the
//! argument parsers and the last handler result. All of it sits behind one
//! lock, so registration, dispatch and listing are serialized and the
//! service can be shared between threads.
//!
//! # Dispatch
//!
//! ```text
//! line
//!   → first matching route (registration order)
//!   → bind arguments (convert captures, fill defaults)
//!   → invoke handler (shared or per-command instance)
//!   → store result as "last result"
//!   → notify exit listeners (outside the lock)
//! ```
//!
//! Handlers run while the lock is held and must not call back into the
//! service. [`CommandContext`] exposes what a handler needs instead,
//! including [`describe_routes`](CommandContext::describe_routes).

use std::any::{Any, TypeId};
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::controller::{Controller, ErasedController};
use crate::convert::{ArgumentParser, ConverterRegistry};
use crate::describe::{describe, RouteDescription};
use crate::error::{CommandError, RegistrationError};
use crate::events::{ExitListeners, ExitRequest};
use crate::handler::{CommandContext, DispatchResult};
use crate::input::LineSource;
use crate::registry::RegisteredCommand;

#[derive(Default)]
struct Inner {
    controllers: Vec<Box<dyn ErasedController>>,
    controller_types: Vec<TypeId>,
    commands: Vec<RegisteredCommand>,
    converters: ConverterRegistry,
    last_result: Option<Value>,
}

impl Inner {
    fn dispatch(
        &mut self,
        line: &str,
        exit: &mut Option<ExitRequest>,
    ) -> Result<DispatchResult, CommandError> {
        let Inner {
            controllers,
            commands,
            converters,
            last_result,
            ..
        } = self;
        let commands: &[RegisteredCommand] = commands;

        let (command, captures) = commands
            .iter()
            .find_map(|command| {
                tracing::trace!(route = %command.route(), "trying route");
                command.matches(line).map(|captures| (command, captures))
            })
            .ok_or_else(|| {
                tracing::warn!(line, "no route matched");
                CommandError::unknown_command(line)
            })?;

        tracing::debug!(
            line,
            route = %command.route(),
            controller = command.controller_name(),
            "route matched"
        );

        let args = command
            .bind(&captures, converters)
            .map_err(|err| CommandError::conversion(line, err))?;

        let mut ctx = CommandContext::new(line, command, last_result.as_ref(), commands);
        let outcome = controllers[command.controller()].invoke(command.handler(), &mut ctx, args);

        if ctx.exit_requested() {
            *exit = Some(ExitRequest {
                controller: command.controller_name().to_string(),
                route: command.route().to_string(),
            });
        }

        let value = outcome.map_err(|err| CommandError::handler(line, err))?;
        *last_result = value.clone();

        Ok(DispatchResult {
            value,
            controller: command.controller_name().to_string(),
            route: command.route().to_string(),
            exit: exit.clone(),
        })
    }
}

/// Registers controllers and dispatches input lines to their handlers.
///
/// # Example
///
/// ```rust
/// use lineroute::{Arguments, CommandContext, CommandService, Controller, Route};
///
/// struct Greeting;
///
/// let service = CommandService::new();
/// service
///     .register(Controller::new(Greeting).route(
///         Route::new("hello {name}").param::<String>("name"),
///         |_: &mut Greeting, _: &mut CommandContext<'_>, args: Arguments| {
///             Ok::<_, anyhow::Error>(format!("Hello, {}!", args.get_required::<String>("name")?))
///         },
///     ))
///     .unwrap();
///
/// let result = service.execute("hello Ada").unwrap();
/// assert_eq!(result.value_as::<String>().as_deref(), Some("Hello, Ada!"));
/// ```
pub struct CommandService {
    inner: Mutex<Inner>,
    listeners: Mutex<ExitListeners>,
    exit_requested: AtomicBool,
}

impl CommandService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            listeners: Mutex::new(ExitListeners::default()),
            exit_requested: AtomicBool::new(false),
        }
    }

    /// Registers a controller and all of its routes.
    ///
    /// Fails if a controller of the same type is already registered, if any
    /// route template is malformed, or if per-command instantiation was
    /// requested without a factory. On failure nothing is registered.
    pub fn register<C: Send + 'static>(
        &self,
        controller: Controller<C>,
    ) -> Result<(), RegistrationError> {
        let mut inner = self.inner.lock();

        if inner.controller_types.contains(&TypeId::of::<C>()) {
            return Err(RegistrationError::DuplicateController(
                controller.name().to_string(),
            ));
        }

        let name = controller.name().to_string();
        let index = inner.controllers.len();
        let (commands, bound) = controller.compile(index)?;

        tracing::debug!(controller = %name, routes = commands.len(), "registered controller");
        for command in &commands {
            tracing::trace!(controller = %name, route = %command.route(), "registered route");
            for param in command.params() {
                if !inner.converters.can_convert(param.kind()) {
                    tracing::warn!(
                        route = %command.route(),
                        param = param.name(),
                        kind = %param.kind(),
                        "no converter for parameter kind yet"
                    );
                }
            }
        }

        inner.commands.extend(commands);
        inner.controllers.push(bound);
        inner.controller_types.push(TypeId::of::<C>());
        Ok(())
    }

    /// Adds a parser for the parser's output kind.
    pub fn add_parser<P: ArgumentParser>(&self, parser: P) -> Result<(), RegistrationError> {
        self.inner.lock().converters.add(parser)
    }

    /// Adds a closure-based parser for kind `T`.
    pub fn add_parser_fn<T, F>(&self, f: F) -> Result<(), RegistrationError>
    where
        T: Any + Send,
        F: Fn(&str, &str) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.inner.lock().converters.add_fn(f)
    }

    /// Executes one input line.
    ///
    /// `None` and the empty string are rejected with
    /// [`ErrorKind::EmptyInput`](crate::ErrorKind::EmptyInput). Otherwise
    /// the first matching route, in registration order, is dispatched.
    pub fn execute<'a>(&self, line: impl Into<Option<&'a str>>) -> Result<DispatchResult, CommandError> {
        let line = match line.into() {
            Some(line) if !line.is_empty() => line,
            other => return Err(CommandError::empty_input(other)),
        };

        let mut exit = None;
        let result = self.inner.lock().dispatch(line, &mut exit);

        if let Some(request) = exit {
            self.signal_exit(&request);
        }
        result
    }

    /// Reads a line with `read` and executes it.
    pub fn read_and_execute<F>(&self, read: F) -> Result<DispatchResult, CommandError>
    where
        F: FnOnce() -> Option<String>,
    {
        let line = read();
        self.execute(line.as_deref())
    }

    /// Runs the command loop until end of input or an exit request.
    ///
    /// Every failed line is reported to `on_error` and the loop goes on.
    /// Only an I/O error from `source` ends the loop with an error.
    pub fn run<S, F>(&self, source: &mut S, mut on_error: F) -> io::Result<()>
    where
        S: LineSource + ?Sized,
        F: FnMut(&CommandError),
    {
        while !self.exit_requested() {
            let Some(line) = source.read_line()? else {
                tracing::debug!("end of input");
                break;
            };
            if let Err(err) = self.execute(line.as_str()) {
                on_error(&err);
            }
        }
        Ok(())
    }

    /// Describes every registered route, in registration order.
    pub fn describe_routes(&self) -> Vec<RouteDescription> {
        describe(&self.inner.lock().commands)
    }

    /// The value returned by the last successful handler.
    pub fn last_result(&self) -> Option<Value> {
        self.inner.lock().last_result.clone()
    }

    /// Number of registered routes.
    pub fn route_count(&self) -> usize {
        self.inner.lock().commands.len()
    }

    /// Adds a listener called whenever a handler requests an exit.
    pub fn on_exit<F>(&self, f: F)
    where
        F: Fn(&ExitRequest) + Send + Sync + 'static,
    {
        self.listeners.lock().push(f);
    }

    /// Returns `true` once any handler has requested an exit.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::SeqCst)
    }

    /// Lowers the exit flag so the loop can be run again.
    pub fn clear_exit_request(&self) {
        self.exit_requested.store(false, Ordering::SeqCst);
    }

    fn signal_exit(&self, request: &ExitRequest) {
        tracing::debug!(controller = %request.controller, route = %request.route, "exit requested");
        self.exit_requested.store(true, Ordering::SeqCst);
        let listeners = self.listeners.lock().clone();
        listeners.notify(request);
    }
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CommandService")
            .field("controllers", &inner.controllers.len())
            .field("routes", &inner.commands.len())
            .field("converters", &inner.converters)
            .field("exit_listeners", &self.listeners.lock().len())
            .field("exit_requested", &self.exit_requested())
            .finish()
    }
}
