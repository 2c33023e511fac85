use lineroute::{Arguments, CommandContext, Controller, Route};

use crate::ui::{Console, SecretReader};

const PROMPT: &str = "Password: ";

/// Reads a password without echoing it.
pub struct PasswordController {
    console: Console,
    secrets: Box<dyn SecretReader>,
}

impl PasswordController {
    fn show(&mut self, _: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<String> {
        let password = self.secrets.read_secret(PROMPT)?;
        self.console.line(format!("Your password is: {}", password))?;
        Ok(password)
    }

    fn hide(&mut self, _: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<usize> {
        let length = self.secrets.read_secret(PROMPT)?.chars().count();
        self.console
            .line(format!("Your secure password length: {}", length))?;
        Ok(length)
    }
}

pub fn controller(console: Console, secrets: Box<dyn SecretReader>) -> Controller<PasswordController> {
    Controller::new(PasswordController { console, secrets })
        .route(Route::new("read and show my password"), PasswordController::show)
        .route(Route::new("read but hide my password"), PasswordController::hide)
}
