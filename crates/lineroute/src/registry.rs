//! Registered commands.
//!
//! Registering a controller flattens its routes into [`RegisteredCommand`]
//! entries, kept in registration order. Dispatch walks them front to back
//! and the first matching route wins.

use crate::args::{Arguments, Param};
use crate::convert::ConverterRegistry;
use crate::error::ConvertError;
use crate::route::{Captures, RouteTemplate};

/// One dispatchable route, bound to a handler of a registered controller.
#[derive(Debug)]
pub(crate) struct RegisteredCommand {
    controller: usize,
    controller_name: String,
    handler: usize,
    route: RouteTemplate,
    case_sensitive: bool,
    description: Option<String>,
    params: Vec<Param>,
}

impl RegisteredCommand {
    pub(crate) fn new(
        controller: usize,
        controller_name: String,
        handler: usize,
        route: RouteTemplate,
        case_sensitive: bool,
        description: Option<String>,
        params: Vec<Param>,
    ) -> Self {
        Self {
            controller,
            controller_name,
            handler,
            route,
            case_sensitive,
            description,
            params,
        }
    }

    pub(crate) fn controller(&self) -> usize {
        self.controller
    }

    pub(crate) fn controller_name(&self) -> &str {
        &self.controller_name
    }

    pub(crate) fn handler(&self) -> usize {
        self.handler
    }

    pub(crate) fn route(&self) -> &RouteTemplate {
        &self.route
    }

    pub(crate) fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn params(&self) -> &[Param] {
        &self.params
    }

    pub(crate) fn matches(&self, line: &str) -> Option<Captures> {
        self.route.matches(line, self.case_sensitive)
    }

    /// Builds the handler arguments, in parameter order.
    ///
    /// Captured parameters are converted; the others get their kind's
    /// default or stay absent. The first failing conversion aborts.
    pub(crate) fn bind(
        &self,
        captures: &Captures,
        converters: &ConverterRegistry,
    ) -> Result<Arguments, ConvertError> {
        let mut args = Arguments::new();
        for param in &self.params {
            let value = match captures.get(param.name()) {
                Some(raw) => Some(converters.convert(param.kind(), param.name(), raw)?),
                None => param.kind().default_value(),
            };
            args.push(param.name().to_string(), value);
        }
        Ok(args)
    }

    #[cfg(test)]
    pub(crate) fn for_test(controller_name: &str, template: &str) -> Self {
        Self::new(
            0,
            controller_name.to_string(),
            0,
            RouteTemplate::parse(template).expect("valid template"),
            false,
            None,
            Vec::new(),
        )
    }
}
