use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Inspection CLI for the secure IPC gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "GATEWAY_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway status and registered channels
    Status,
    /// Dump the audit log
    Audit,
    /// Aggregate security statistics
    Stats {
        /// Number of most-blocked channels to list
        #[arg(long)]
        top: Option<usize>,
    },
    /// Per-channel performance statistics
    Performance,
    /// Most recent completed calls
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Clear the audit log
    ClearAudit,
    /// Clear performance statistics and history
    ClearPerformance,
}

impl Commands {
    fn request(&self) -> (Method, String) {
        match self {
            Commands::Status => (Method::GET, "/admin/status".into()),
            Commands::Audit => (Method::GET, "/admin/audit".into()),
            Commands::Stats { top: Some(n) } => (Method::GET, format!("/admin/audit/stats?top={n}")),
            Commands::Stats { top: None } => (Method::GET, "/admin/audit/stats".into()),
            Commands::Performance => (Method::GET, "/admin/performance".into()),
            Commands::Recent { limit } => {
                (Method::GET, format!("/admin/performance/recent?limit={limit}"))
            }
            Commands::ClearAudit => (Method::DELETE, "/admin/audit".into()),
            Commands::ClearPerformance => (Method::DELETE, "/admin/performance".into()),
        }
    }
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

    let (method, path) = cli.command.request();
    let res = client
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("OK");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
