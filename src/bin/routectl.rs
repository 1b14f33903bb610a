use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Inspect a running route engine through its admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "ROUTE_ENGINE_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Engine status and uptime
    Status,
    /// Bound routes in binding order, plus the endpoint table
    Routes {
        /// Print one `METHOD endpoint (id, order)` line per route instead of JSON
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let path = match cli.command {
        Commands::Status => "status",
        Commands::Routes { .. } => "routes",
    };
    let res = client
        .get(format!("{}/admin/{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;

    let Some(body) = read_json(res).await? else {
        std::process::exit(1);
    };

    match cli.command {
        Commands::Routes { plain: true } => print_routes(&body),
        _ => println!("{}", serde_json::to_string_pretty(&body)?),
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        return Ok(None);
    }
    Ok(Some(res.json().await?))
}

fn print_routes(body: &Value) {
    let Some(bound) = body.get("bound").and_then(Value::as_array) else {
        return;
    };
    for route in bound {
        println!(
            "{:<7} {} ({}, order {})",
            route["method"].as_str().unwrap_or("?"),
            route["endpoint"].as_str().unwrap_or("?"),
            route["id"].as_str().unwrap_or("?"),
            route["order"].as_i64().unwrap_or_default(),
        );
    }
}
