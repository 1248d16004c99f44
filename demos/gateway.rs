use argh::FromArgs;
use std::{sync::Arc, time::Duration};
use wireframe_gateway::{BraceMatch, ComparisonGateway, GatewayConfig, config, router};

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

#[derive(FromArgs)]
/// Compares wireframes with webpage screenshots using a local vision model.
struct GatewayArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the generate endpoint of the model service
    #[argh(option, default = "config::DEFAULT_OLLAMA_URL.to_string()")]
    ollama_url: String,

    /// the model to query
    #[argh(option, short = 'm', default = "config::DEFAULT_MODEL.to_string()")]
    model: String,

    /// seconds to wait for the model before failing the request
    #[argh(option, default = "config::DEFAULT_TIMEOUT.as_secs()")]
    timeout_secs: u64,

    /// extract the first balanced JSON object instead of the greedy match
    #[argh(switch)]
    balanced: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: GatewayArgs = argh::from_env();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    let brace_match = if args.balanced {
        BraceMatch::Balanced
    } else {
        BraceMatch::Greedy
    };

    let config = GatewayConfig::default()
        .with_ollama_url(args.ollama_url)
        .with_model(args.model)
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_brace_match(brace_match);

    let gateway = Arc::new(ComparisonGateway::ollama(config)?);
    log::info!(
        "Using model {} at {}",
        gateway.config().model,
        gateway.model().url()
    );

    let app = router(gateway);

    log::info!("Starting the server");
    log::info!("Listening on: {}", addr);
    log::info!("Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
