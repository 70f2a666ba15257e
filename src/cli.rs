//! Command-line arguments of the `grantwise` binary.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(name = "grantwise")]
#[command(about = "Resume a Grantwise assessment page and print its states as JSON")]
#[command(version)]
pub struct Args {
    /// TOML configuration file; skipped when it does not exist
    #[arg(short, long, default_value = "grantwise.toml")]
    pub config: PathBuf,

    /// Bearer token of the signed-in session
    #[arg(long, env = "GRANTWISE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// URL the page is loaded at, typically the payment return leg
    #[arg(default_value = "http://localhost:3000/dashboard")]
    pub page_url: Url,
}
