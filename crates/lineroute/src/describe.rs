//! Human-readable route listings.
//!
//! Each registered route is rendered as its literal text with placeholders
//! shown as `{name:Kind}` (or `{name}` when no parameter of that name is
//! declared), all parts separated by single spaces:
//!
//! ```text
//! Say hello to {name:String} .
//! ```

use serde::Serialize;

use crate::args::Param;
use crate::registry::RegisteredCommand;
use crate::route::{RoutePart, RouteTemplate};

/// One line of a route listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescription {
    /// The rendered route.
    pub route: String,
    /// The route's description, if one was given.
    pub description: Option<String>,
    /// Name of the controller owning the route.
    pub controller: String,
}

pub(crate) fn describe(commands: &[RegisteredCommand]) -> Vec<RouteDescription> {
    commands
        .iter()
        .map(|command| RouteDescription {
            route: render_route(command.route(), command.params()),
            description: command.description().map(str::to_string),
            controller: command.controller_name().to_string(),
        })
        .collect()
}

/// Renders a compiled route for display.
///
/// Literal parts are trimmed and whitespace-only literals are skipped.
pub fn render_route(route: &RouteTemplate, params: &[Param]) -> String {
    let mut pieces: Vec<String> = Vec::with_capacity(route.parts().len());

    for part in route.parts() {
        match part {
            RoutePart::Literal(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    pieces.push(text.to_string());
                }
            }
            RoutePart::Placeholder(name) => {
                let piece = match params.iter().find(|p| p.name() == name) {
                    Some(param) => format!("{{{}:{}}}", name, param.kind().name()),
                    None => format!("{{{}}}", name),
                };
                pieces.push(piece);
            }
        }
    }

    pieces.join(" ")
}
