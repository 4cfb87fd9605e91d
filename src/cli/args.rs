use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Definition manifest (TOML, YAML or JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Directory receiving rendered parts (default: render.output_dir from itemdef.toml)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Print the base64 upload payload to stdout instead of writing files
    #[arg(long)]
    pub payload: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Definition manifest (TOML, YAML or JSON)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,
}

#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Only list formats of this item type
    #[arg(long, value_name = "TYPE")]
    pub item_type: Option<String>,
}
