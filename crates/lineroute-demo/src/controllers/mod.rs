//! Example controllers wired into the demo console.

mod age;
mod greeting;
mod help;
mod password;

use lineroute::{CommandService, RegistrationError};

use crate::ui::{Console, SecretReader};

use self::age::AgesParser;

/// Registers the demo parsers and controllers, help first.
pub fn register_all(
    service: &CommandService,
    console: &Console,
    secrets: Box<dyn SecretReader>,
) -> Result<(), RegistrationError> {
    service.add_parser(AgesParser)?;

    service.register(help::controller(console.clone()))?;
    service.register(greeting::controller(console.clone()))?;
    service.register(password::controller(console.clone(), secrets))?;
    service.register(age::controller(console.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockSecrets;

    #[test]
    fn test_register_all() {
        let service = CommandService::new();
        let (console, _) = Console::memory();
        register_all(&service, &console, Box::new(MockSecrets::default())).unwrap();

        let controllers: Vec<String> = service
            .describe_routes()
            .into_iter()
            .map(|route| route.controller)
            .collect();
        assert_eq!(controllers.first().map(String::as_str), Some("HelpController"));
        assert_eq!(controllers.last().map(String::as_str), Some("AgeController"));
        assert_eq!(service.route_count(), 8);
    }

    #[test]
    fn test_register_all_twice_fails() {
        let service = CommandService::new();
        let (console, _) = Console::memory();
        register_all(&service, &console, Box::new(MockSecrets::default())).unwrap();

        let err = register_all(&service, &console, Box::new(MockSecrets::default())).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateConverter(_)));
    }
}
