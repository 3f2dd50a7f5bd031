use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use secure_headers::{CheckArgs, Cli, Commands, Config, RequestContext, SecureHeaders, Server, StartArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => start_server(args).await,
        Some(Commands::Check(args)) => check_headers(args),
        None => start_server(cli.start_args).await, // Default to serve
    }
}

fn init_logging(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(level)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn start_server(args: StartArgs) -> Result<()> {
    // Load configuration
    let config = Config::load(&args)?;

    // Initialize logging
    init_logging(&config.logging.level)?;

    info!("Starting secure-headers v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate()?;

    // Log configuration details
    info!("📊 Configuration loaded:");
    info!("  Server: {}:{}", config.server.address, config.server.port);
    if config.headers.named.is_empty() {
        info!("  Named configurations: none");
    } else {
        let names: Vec<&str> = config.headers.named.keys().map(String::as_str).collect();
        info!("  Named configurations: [{}]", names.join(", "));
    }

    if config.server.trust_forwarded_proto {
        warn!("⚠️  Trusting X-Forwarded-Proto - make sure only your proxy can reach this server");
    }

    // Start server
    let server = Server::new(config, Arc::new(SecureHeaders::new()))?;
    server.serve().await?;

    Ok(())
}

fn check_headers(args: CheckArgs) -> Result<()> {
    let config = Config::load(&args.start_args)?;
    init_logging(&config.logging.level)?;
    config.validate()?;

    let engine = SecureHeaders::new();
    config.apply(&engine)?;

    let mut context = RequestContext::new(!args.insecure, args.user_agent.clone());
    if let Some(profile) = &args.profile {
        engine.use_named(&mut context, profile)?;
    }
    if args.nonce {
        let nonce = engine.nonce_for_script(&context);
        info!("🔑 Nonce for this request: {}", nonce);
    }

    let headers = engine.resolve_headers(&context)?;
    info!(
        "Resolved {} header(s) for a {} request (client tier: {:?})",
        headers.len(),
        if args.insecure { "plaintext" } else { "secure" },
        context.tier()
    );

    for (name, value) in &headers {
        println!("{name}: {value}");
    }

    Ok(())
}
