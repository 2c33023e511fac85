use console::Style;
use lineroute::{ArgumentParser, Arguments, CommandContext, Controller, Route};
use serde::{Deserialize, Serialize};

use crate::ui::Console;

/// Name/age pairs, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ages(pub Vec<(String, String)>);

/// Parses `name1=age1;name2=age2` into [`Ages`].
///
/// Empty entries and entries without both a name and an age are skipped.
pub struct AgesParser;

impl ArgumentParser for AgesParser {
    type Output = Ages;

    fn parse(&self, _name: &str, raw: &str) -> anyhow::Result<Ages> {
        let pairs = raw
            .split(';')
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| entry.split_once('='))
            .filter(|(name, age)| !name.is_empty() && !age.is_empty())
            .map(|(name, age)| (name.to_string(), age.to_string()))
            .collect();
        Ok(Ages(pairs))
    }
}

/// Keeps track of ages. A fresh instance handles every command.
pub struct AgeController {
    console: Console,
    created_by: &'static str,
    announced: bool,
}

impl AgeController {
    fn new(created_by: &'static str, console: Console) -> Self {
        Self {
            console,
            created_by,
            announced: false,
        }
    }

    fn announce(&mut self) -> std::io::Result<()> {
        if !self.announced {
            self.announced = true;
            self.console.line(format!(
                "[A new instance of the {} has been created.]",
                self.created_by
            ))?;
        }
        Ok(())
    }

    fn set(&mut self, ctx: &mut CommandContext<'_>, args: Arguments) -> anyhow::Result<Ages> {
        self.announce()?;
        let ages = args.get_one::<Ages>("collection").cloned().unwrap_or_default();

        self.console.line("Here it is:")?;
        let current = Style::new().cyan();
        for (name, age) in &ages.0 {
            self.console
                .styled(format!("{} is {} years old.", name, age), &current)?;
        }

        if let Some(previous) = ctx.last_result_as::<Ages>() {
            self.console.line("Previous:")?;
            let past = Style::new().white();
            for (name, age) in &previous.0 {
                self.console
                    .styled(format!("{} was {} years old.", name, age), &past)?;
            }
        }

        Ok(ages)
    }
}

pub fn controller(console: Console) -> Controller<AgeController> {
    Controller::from_factory(move || AgeController::new("factory-built AgeController", console.clone()))
        .instantiate_per_command(true)
        .route(
            Route::new("Set ages: {collection}").optional_param::<Ages>("collection"),
            AgeController::set,
        )
}
