use clap::Parser;

#[derive(Parser)]
#[command(name = "secure-headers")]
#[command(about = "Resolve and serve HTTP security headers from layered configuration")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// When no subcommand is provided, these args are used for 'serve'
    #[command(flatten)]
    pub start_args: StartArgs,
}

#[derive(Parser)]
pub enum Commands {
    /// Start the demo server with the configured headers applied
    Serve(StartArgs),
    /// Print the headers a request would receive
    Check(CheckArgs),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct StartArgs {
    /// Configuration file path
    #[arg(short, long, env = "SECURE_HEADERS_CONFIG")]
    pub config: Option<String>,

    /// Server bind address
    #[arg(long, env = "SECURE_HEADERS_ADDRESS")]
    pub address: Option<String>,

    /// Server port
    #[arg(short, long, env = "SECURE_HEADERS_PORT")]
    pub port: Option<u16>,

    /// Treat every request as arriving over HTTPS
    #[arg(long, env = "SECURE_HEADERS_ASSUME_SECURE")]
    pub assume_secure: bool,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    pub log_level: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub start_args: StartArgs,

    /// User-Agent of the simulated request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Simulate a plaintext (http://) request
    #[arg(long)]
    pub insecure: bool,

    /// Named configuration to resolve against
    #[arg(long)]
    pub profile: Option<String>,

    /// Request a CSP nonce before resolving
    #[arg(long)]
    pub nonce: bool,
}
