use argh::FromArgs;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use wireframe_gateway::COMPARE_ROUTE;

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5000;

#[derive(FromArgs)]
/// Uploads a wireframe and a webpage screenshot for comparison
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the path to the wireframe image
    #[argh(option, short = 'w')]
    wireframe: PathBuf,

    /// the path to the webpage screenshot
    #[argh(option, short = 's')]
    webpage: PathBuf,
}

async fn image_part(path: &Path) -> Result<Part, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("Invalid file name: {}", path.display()))?
        .to_string();

    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "image/png",
    };

    Ok(Part::bytes(bytes).file_name(filename).mime_str(mime)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    let form = Form::new()
        .part("wireframe", image_part(&args.wireframe).await?)
        .part("webpage", image_part(&args.webpage).await?);

    let response = client
        .post(format!("http://{}:{}{}", args.host, args.port, COMPARE_ROUTE))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    let result = response.json::<serde_json::Value>().await?;
    println!("Status: {status}");
    println!("Result: {}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
