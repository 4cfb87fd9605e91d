pub mod args;
pub mod commands;

pub use args::{FormatsArgs, RenderArgs, ValidateArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
DEFINITION COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "itemdef")]
#[command(version = crate::VERSION)]
#[command(about = "Render and validate item definition parts")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: validate a manifest, then render it to files or an upload payload."
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file (default: itemdef.toml next to the manifest)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Transform every definition part",
        long_about = "Render validates the manifest, processes each part (none, template tokens or parameter rules) and writes the results.",
        after_help = "Example:\n    itemdef render ./eventstream.toml --out build/eventstream"
    )]
    Render(RenderArgs),
    #[command(
        about = "Check part configuration without transforming",
        long_about = "Validate runs the configuration checks and the allowed-path check for the manifest's definition format.",
        after_help = "Example:\n    itemdef validate ./eventstream.toml"
    )]
    Validate(ValidateArgs),
    #[command(
        about = "List known definition formats",
        long_about = "Formats prints the built-in formats overlaid with those declared in itemdef.toml.",
        after_help = "Example:\n    itemdef formats --item-type Notebook"
    )]
    Formats(FormatsArgs),
}

pub async fn run(args: Args) -> crate::Result<()> {
    let config = args.config;
    match args.command {
        Command::Render(render_args) => commands::render(render_args, config.as_deref()).await,
        Command::Validate(validate_args) => {
            commands::validate(validate_args, config.as_deref()).await
        }
        Command::Formats(formats_args) => commands::formats(formats_args, config.as_deref()).await,
    }
}
