use lineroute::{Arguments, CommandContext, Controller, Route};

use crate::ui::Console;

const DESCRIPTION: &str = "Shows all available commands";

/// Lists every registered route.
pub struct HelpController {
    console: Console,
}

impl HelpController {
    fn show_commands(&mut self, ctx: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<()> {
        self.console.line("Available commands:")?;
        for route in ctx.describe_routes() {
            self.console.line(&route.route)?;
            if let Some(description) = &route.description {
                self.console.line(format!("    {}", description))?;
            }
        }
        Ok(())
    }
}

pub fn controller(console: Console) -> Controller<HelpController> {
    Controller::new(HelpController { console }).routes(
        ["show commands", "help", "/?"].map(|template| Route::new(template).describe(DESCRIPTION)),
        HelpController::show_commands,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineroute::CommandService;

    #[test]
    fn test_every_alias_lists_routes() {
        let (console, lines) = Console::memory();
        let service = CommandService::new();
        service.register(controller(console)).unwrap();

        for alias in ["show commands", "HELP", "/?"] {
            lines.lock().clear();
            service.execute(alias).unwrap();
            assert_eq!(
                *lines.lock(),
                vec![
                    "Available commands:",
                    "show commands",
                    "    Shows all available commands",
                    "help",
                    "    Shows all available commands",
                    "/?",
                    "    Shows all available commands",
                ]
            );
        }
    }

    #[test]
    fn test_help_returns_nothing() {
        let (console, _) = Console::memory();
        let service = CommandService::new();
        service.register(controller(console)).unwrap();

        let result = service.execute("help").unwrap();
        assert!(result.value.is_none());
        assert!(service.last_result().is_none());
    }
}
