use lineroute::{Arguments, CommandContext, Controller, Route};

use crate::ui::Console;

/// Greets people. All routes start with `Say ` and are case-sensitive,
/// except the goodbye route, which also ends the session.
pub struct GreetingController {
    console: Console,
}

impl GreetingController {
    fn hello(&mut self, _: &mut CommandContext<'_>, args: Arguments) -> anyhow::Result<()> {
        let name = args.get_required::<String>("name")?;
        self.console.line(format!("Hello there, {}!", name))?;
        Ok(())
    }

    fn bye(&mut self, ctx: &mut CommandContext<'_>, args: Arguments) -> anyhow::Result<()> {
        let name = args.get_required::<String>("name")?;
        self.console
            .line(format!("Goodbye, {}. I'm sorry you have to leave.", name))?;
        ctx.request_exit();
        Ok(())
    }
}

pub fn controller(console: Console) -> Controller<GreetingController> {
    Controller::new(GreetingController { console })
        .prefix("Say ")
        .case_sensitive(true)
        .route(
            Route::new("hello to {name}.").param::<String>("name"),
            GreetingController::hello,
        )
        // The prefix would turn this into "Say Say goodbye ..."
        .route(
            Route::new("Say goodbye to {name}, please.")
                .use_prefix(false)
                .case_sensitive(false)
                .param::<String>("name"),
            GreetingController::bye,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineroute::{CommandService, ErrorKind};

    fn service() -> (CommandService, std::sync::Arc<parking_lot::Mutex<Vec<String>>>) {
        let (console, lines) = Console::memory();
        let service = CommandService::new();
        service.register(controller(console)).unwrap();
        (service, lines)
    }

    #[test]
    fn test_hello() {
        let (service, lines) = service();
        service.execute("Say hello to World.").unwrap();
        assert_eq!(*lines.lock(), vec!["Hello there, World!"]);
    }

    #[test]
    fn test_hello_is_case_sensitive() {
        let (service, lines) = service();
        let err = service.execute("say hello to World.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownCommand);
        assert!(lines.lock().is_empty());
    }

    #[test]
    fn test_goodbye_requests_exit() {
        let (service, lines) = service();
        let result = service.execute("say GOODBYE to Ada, please.").unwrap();

        assert!(result.is_exit());
        assert!(service.exit_requested());
        assert_eq!(
            *lines.lock(),
            vec!["Goodbye, Ada. I'm sorry you have to leave."]
        );
    }
}
