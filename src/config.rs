use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hifzd")]
#[command(about = "Hifz tracking sidecar speaking JSON lines over stdin/stdout", long_about = None)]
#[command(version)]
pub struct Args {
    /// Open a file-backed store in this directory instead of the in-memory one
    #[arg(long, env = "HIFZD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log filter directives, written to stderr
    #[arg(long, env = "HIFZD_LOG", default_value = "hifzd=info")]
    pub log: String,
}

pub fn init_logging(filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hifzd=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
