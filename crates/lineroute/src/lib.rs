//! Route templates and command dispatch for line-oriented interactive CLIs.
//!
//! `lineroute` maps free-form input lines such as `Say hello to Ada.` onto
//! handler functions. Routes are plain text templates with `{name}`
//! placeholders; the captured text is converted to typed arguments before
//! the handler runs.
//!
//! # Features
//!
//! - **Route templates**: literal text interleaved with placeholders, matched
//!   greedy-forward with per-route case sensitivity
//! - **Controllers**: group routes under a shared prefix, case policy and
//!   instantiation policy (shared instance or one per command)
//! - **Argument conversion**: built-in primitives plus registered parsers
//!   for any type
//! - **Dispatch**: first match wins, uniform [`CommandError`]s, last-result
//!   chaining and exit requests
//! - **Command loop**: [`CommandService::run`] over any [`LineSource`]
//!
//! # Example
//!
//! ```rust
//! use lineroute::{Arguments, CommandContext, CommandService, Controller, Route};
//!
//! #[derive(Default)]
//! struct Greeting;
//!
//! impl Greeting {
//!     fn hello(&mut self, _: &mut CommandContext<'_>, args: Arguments) -> anyhow::Result<String> {
//!         let name = args.get_required::<String>("name")?;
//!         Ok(format!("Hello, {name}!"))
//!     }
//!
//!     fn goodbye(&mut self, ctx: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<()> {
//!         ctx.request_exit();
//!         Ok(())
//!     }
//! }
//!
//! let service = CommandService::new();
//! service.register(
//!     Controller::new(Greeting)
//!         .prefix("Say ")
//!         .case_sensitive(true)
//!         .route(Route::new("hello to {name}.").param::<String>("name"), Greeting::hello)
//!         .route(
//!             Route::new("Say goodbye, please.").use_prefix(false).case_sensitive(false),
//!             Greeting::goodbye,
//!         ),
//! )?;
//!
//! let result = service.execute("Say hello to Ada.")?;
//! assert_eq!(result.value_as::<String>().as_deref(), Some("Hello, Ada!"));
//!
//! assert!(service.execute("say hello to Ada.").is_err());
//!
//! service.execute("SAY GOODBYE, PLEASE.")?;
//! assert!(service.exit_requested());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Concurrency
//!
//! A [`CommandService`] is `Send + Sync`. Registration, dispatch and route
//! listing are serialized by a single lock, which is held while a handler
//! runs. Handlers must not call back into the service.

mod args;
mod controller;
mod convert;
mod describe;
mod error;
mod events;
mod handler;
mod input;
mod registry;
mod route;
mod service;

pub use args::{Arguments, Param};
pub use controller::{Controller, Route};
pub use convert::{AnyValue, ArgumentParser, ConverterRegistry, FnParser, ValueKind};
pub use describe::{render_route, RouteDescription};
pub use error::{BoxError, CommandError, ConvertError, ErrorKind, RegistrationError, RouteError};
pub use events::{ExitFn, ExitRequest};
pub use handler::{CommandContext, DispatchResult, FnHandler, Handler, HandlerResult};
pub use input::{LineSource, MockLines, ReaderLines, StdinLines};
pub use route::{Captures, RoutePart, RouteTemplate};
pub use service::CommandService;
