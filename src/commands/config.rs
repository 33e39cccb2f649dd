use anyhow::Result;

use crate::Context;
use crate::cli::ConfigCommand;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    ui::header("Configuration");

    let file = paths::config_file()?;
    println!();
    ui::kv("Config file", &file.display().to_string());
    if !file.exists() {
        ui::dim("Not found; using defaults");
    }

    println!();
    let unset = "(SDK default)".to_string();
    ui::kv(
        "Region",
        ctx.connection.region.as_ref().unwrap_or(&unset),
    );
    ui::kv(
        "Profile",
        ctx.connection.profile.as_ref().unwrap_or(&unset),
    );
    ui::kv(
        "Endpoint URL",
        ctx.connection.endpoint_url.as_ref().unwrap_or(&unset),
    );
    ui::kv(
        "ECS page size",
        &ctx.config
            .ecs
            .page_size
            .unwrap_or(awskit::types::DEFAULT_PAGE_SIZE)
            .to_string(),
    );

    println!();
    ui::dim("Flags and AWS_* environment variables override the config file.");

    Ok(())
}
