//! Controllers and their routes.
//!
//! A [`Controller`] groups the routes handled by one type, along with the
//! policies shared by those routes:
//!
//! - an optional **prefix**, prepended to every route that opts into it;
//! - a default **case sensitivity**, which routes may override;
//! - an **instantiation policy**: one shared instance for the life of the
//!   service, or a fresh instance (built by a factory) per executed command.
//!
//! # Example
//!
//! ```rust
//! use lineroute::{Arguments, CommandContext, Controller, Route};
//!
//! #[derive(Default)]
//! struct Greeting {
//!     greeted: u32,
//! }
//!
//! impl Greeting {
//!     fn hello(&mut self, _: &mut CommandContext<'_>, args: Arguments) -> anyhow::Result<String> {
//!         self.greeted += 1;
//!         Ok(format!("Hello, {}!", args.get_required::<String>("name")?))
//!     }
//! }
//!
//! let controller = Controller::new(Greeting::default())
//!     .prefix("Say ")
//!     .case_sensitive(true)
//!     .route(
//!         Route::new("hello to {name}.").param::<String>("name"),
//!         Greeting::hello,
//!     );
//! assert_eq!(controller.name(), "Greeting");
//! ```

use std::any::{type_name, Any};
use std::fmt;

use serde::Serialize;

use crate::args::{Arguments, Param};
use crate::convert::short_type_name;
use crate::error::RegistrationError;
use crate::handler::{CommandContext, FnHandler, Handler, HandlerResult};
use crate::registry::RegisteredCommand;
use crate::route::RouteTemplate;

/// A route template plus the metadata of the handler bound to it.
#[derive(Debug, Clone)]
pub struct Route {
    template: String,
    description: Option<String>,
    use_prefix: bool,
    case_sensitive: Option<bool>,
    params: Vec<Param>,
}

impl Route {
    /// Creates a route for `template`. The controller prefix applies.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            description: None,
            use_prefix: true,
            case_sensitive: None,
            params: Vec::new(),
        }
    }

    /// Sets the human-readable description shown in route listings.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the controller prefix is prepended. Defaults to `true`.
    pub fn use_prefix(mut self, use_prefix: bool) -> Self {
        self.use_prefix = use_prefix;
        self
    }

    /// Overrides the controller's case sensitivity for this route.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    /// Declares a parameter that defaults to `T::default()` when uncaptured.
    pub fn param<T: Any + Send + Default>(self, name: impl Into<String>) -> Self {
        self.with_param(Param::new::<T>(name))
    }

    /// Declares a parameter that is absent when uncaptured.
    pub fn optional_param<T: Any + Send>(self, name: impl Into<String>) -> Self {
        self.with_param(Param::optional::<T>(name))
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// The template as written, without the controller prefix.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The route description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared parameters, in handler order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

type Factory<C> = Box<dyn Fn() -> C + Send>;

enum Source<C> {
    Instance(C),
    Factory(Factory<C>),
}

/// A controller definition, ready to be registered with a
/// [`CommandService`](crate::CommandService).
pub struct Controller<C> {
    name: String,
    prefix: String,
    case_sensitive: bool,
    per_command: bool,
    source: Source<C>,
    routes: Vec<(Route, usize)>,
    handlers: Vec<Box<dyn Handler<C>>>,
}

impl<C: Send + 'static> Controller<C> {
    /// A controller backed by a single shared instance.
    pub fn new(instance: C) -> Self {
        Self::with_source(Source::Instance(instance))
    }

    /// A controller whose instances are built by `factory`.
    ///
    /// Unless [`instantiate_per_command`](Self::instantiate_per_command) is
    /// set, the factory runs once, at registration.
    pub fn from_factory<F>(factory: F) -> Self
    where
        F: Fn() -> C + Send + 'static,
    {
        Self::with_source(Source::Factory(Box::new(factory)))
    }

    /// A controller built with `C::default()`.
    pub fn from_default() -> Self
    where
        C: Default,
    {
        Self::from_factory(C::default)
    }

    fn with_source(source: Source<C>) -> Self {
        Self {
            name: short_type_name(type_name::<C>()),
            prefix: String::new(),
            case_sensitive: false,
            per_command: false,
            source,
            routes: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Overrides the controller name used in listings and errors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Text prepended to every route that uses the prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Default case sensitivity for this controller's routes.
    /// Routes are case-insensitive unless told otherwise.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Build a fresh instance for every executed command.
    ///
    /// Requires a controller created with
    /// [`from_factory`](Self::from_factory) or
    /// [`from_default`](Self::from_default).
    pub fn instantiate_per_command(mut self, per_command: bool) -> Self {
        self.per_command = per_command;
        self
    }

    /// Binds `handler` to `route`.
    ///
    /// The handler may be a closure or a method taking `&mut self`, and may
    /// return any `Result<T, E>` with a serializable `T`.
    pub fn route<F, T, E>(self, route: Route, handler: F) -> Self
    where
        F: Fn(&mut C, &mut CommandContext<'_>, Arguments) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        self.routes([route], handler)
    }

    /// Binds one handler to several routes.
    pub fn routes<I, F, T, E>(self, routes: I, handler: F) -> Self
    where
        I: IntoIterator<Item = Route>,
        F: Fn(&mut C, &mut CommandContext<'_>, Arguments) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<anyhow::Error> + 'static,
    {
        self.handler_routes(routes, FnHandler::new(handler))
    }

    /// Binds a [`Handler`] implementation to several routes.
    pub fn handler_routes<I, H>(mut self, routes: I, handler: H) -> Self
    where
        I: IntoIterator<Item = Route>,
        H: Handler<C>,
    {
        let index = self.handlers.len();
        self.handlers.push(Box::new(handler));
        self.routes
            .extend(routes.into_iter().map(|route| (route, index)));
        self
    }

    /// The controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of routes bound so far.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Compiles every route and resolves the instantiation policy.
    ///
    /// Nothing is returned unless every route compiles, so a failed
    /// registration has no effect on the service.
    pub(crate) fn compile(
        self,
        index: usize,
    ) -> Result<(Vec<RegisteredCommand>, Box<dyn ErasedController>), RegistrationError> {
        let mut commands = Vec::with_capacity(self.routes.len());

        for (route, handler) in self.routes {
            let full = if route.use_prefix {
                format!("{}{}", self.prefix, route.template)
            } else {
                route.template
            };
            let case_sensitive = route.case_sensitive.unwrap_or(self.case_sensitive);
            let template = RouteTemplate::parse(&full)
                .and_then(|template| {
                    template.check_placeholders(case_sensitive)?;
                    Ok(template)
                })
                .map_err(|source| RegistrationError::MalformedTemplate {
                    controller: self.name.clone(),
                    template: full.clone(),
                    source,
                })?;

            commands.push(RegisteredCommand::new(
                index,
                self.name.clone(),
                handler,
                template,
                case_sensitive,
                route.description,
                route.params,
            ));
        }

        let instance = match (self.source, self.per_command) {
            (Source::Instance(_), true) => return Err(RegistrationError::MissingFactory(self.name)),
            (Source::Instance(instance), false) => Instance::Shared(instance),
            (Source::Factory(factory), false) => Instance::Shared(factory()),
            (Source::Factory(factory), true) => Instance::PerCommand(factory),
        };

        let bound = BoundController {
            name: self.name,
            instance,
            handlers: self.handlers,
        };
        Ok((commands, Box::new(bound)))
    }
}

impl<C> fmt::Debug for Controller<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("case_sensitive", &self.case_sensitive)
            .field("per_command", &self.per_command)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

/// A registered controller with its concrete type erased.
pub(crate) trait ErasedController: Send {
    /// Runs handler number `handler` against the controller instance.
    fn invoke(
        &mut self,
        handler: usize,
        ctx: &mut CommandContext<'_>,
        args: Arguments,
    ) -> HandlerResult;
}

enum Instance<C> {
    Shared(C),
    PerCommand(Factory<C>),
}

struct BoundController<C> {
    name: String,
    instance: Instance<C>,
    handlers: Vec<Box<dyn Handler<C>>>,
}

impl<C: Send + 'static> ErasedController for BoundController<C> {
    fn invoke(
        &mut self,
        handler: usize,
        ctx: &mut CommandContext<'_>,
        args: Arguments,
    ) -> HandlerResult {
        let handler = self
            .handlers
            .get(handler)
            .ok_or_else(|| anyhow::anyhow!("controller '{}' has no handler #{}", self.name, handler))?;

        match &mut self.instance {
            Instance::Shared(instance) => handler.handle(instance, ctx, args),
            Instance::PerCommand(factory) => {
                tracing::trace!(controller = %self.name, "creating controller instance");
                let mut instance = factory();
                handler.handle(&mut instance, ctx, args)
            }
        }
    }
}
