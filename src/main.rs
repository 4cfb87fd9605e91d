use clap::Parser;
use itemdef::cli::{self, Args};
use itemdef::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = logging::init(&args)?;
    cli::run(args).await
}
