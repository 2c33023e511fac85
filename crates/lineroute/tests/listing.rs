//! Route listing output.

use insta::{assert_json_snapshot, assert_snapshot};
use lineroute::{Arguments, CommandContext, CommandService, Controller, Route};

struct Greeting;
struct Help;

fn ok(_: &mut Greeting, _: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<()> {
    Ok(())
}

fn help(_: &mut Help, ctx: &mut CommandContext<'_>, _: Arguments) -> anyhow::Result<String> {
    Ok(listing(&ctx.describe_routes()))
}

fn listing(routes: &[lineroute::RouteDescription]) -> String {
    routes
        .iter()
        .map(|r| match &r.description {
            Some(description) => format!("{}  -- {}", r.route, description),
            None => r.route.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn service() -> CommandService {
    let service = CommandService::new();
    service
        .register(
            Controller::new(Help).routes(
                [
                    Route::new("show commands").describe("Shows all available commands"),
                    Route::new("help").describe("Shows all available commands"),
                    Route::new("/?").describe("Shows all available commands"),
                ],
                help,
            ),
        )
        .unwrap();
    service
        .register(
            Controller::new(Greeting)
                .prefix("Say ")
                .route(
                    Route::new("hello to {name}.")
                        .param::<String>("name")
                        .describe("Greets someone"),
                    ok,
                )
                .route(
                    Route::new("Repeat {text} {times} times")
                        .use_prefix(false)
                        .param::<String>("text")
                        .param::<u32>("times"),
                    ok,
                )
                .route(Route::new("wave at {who}"), ok),
        )
        .unwrap();
    service
}

#[test]
fn test_route_listing() {
    assert_snapshot!(listing(&service().describe_routes()), @r"
    show commands  -- Shows all available commands
    help  -- Shows all available commands
    /?  -- Shows all available commands
    Say hello to {name:String} .  -- Greets someone
    Repeat {text:String} {times:u32} times
    Say wave at {who}
    ");
}

#[test]
fn test_handler_sees_same_listing() {
    let service = service();
    let from_handler = service.execute("help").unwrap();
    assert_eq!(
        from_handler.value_as::<String>(),
        Some(listing(&service.describe_routes()))
    );
}

#[test]
fn test_route_listing_json() {
    let routes = service().describe_routes();
    assert_json_snapshot!(routes[3], @r#"
    {
      "route": "Say hello to {name:String} .",
      "description": "Greets someone",
      "controller": "Greeting"
    }
    "#);
}
