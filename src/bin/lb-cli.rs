use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "lb-cli")]
#[command(about = "Management CLI for the load balancing gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token for the admin endpoints (admin.api_key on the gateway).
    #[arg(long, env = "LB_ADMIN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full status report
    Status,
    /// List backend health and connections
    Backends,
    /// Return every unhealthy backend to rotation
    ResetHealth,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/ping", cli.url)).send().await?;
            if let Some(json) = read_json(res).await? {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Commands::Backends => {
            let res = client.get(format!("{}/ping", cli.url)).send().await?;
            if let Some(json) = read_json(res).await? {
                print_backends(&json);
            }
        }
        Commands::ResetHealth => {
            let api_key = cli
                .api_key
                .as_deref()
                .ok_or("reset-health needs --api-key or LB_ADMIN_API_KEY")?;
            let res = client
                .post(format!("{}/admin/reset-health", cli.url))
                .bearer_auth(api_key)
                .send()
                .await?;
            if let Some(json) = read_json(res).await? {
                println!("Revived {} backend(s)", json["revived"]);
            }
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    Ok(Some(res.json().await?))
}

fn print_backends(report: &Value) {
    println!("Strategy: {}", report["strategy"].as_str().unwrap_or("unknown"));
    let Some(backends) = report["backends"].as_array() else {
        return;
    };
    for b in backends {
        println!(
            "{:<32} weight={:<3} active={:<5} total={:<8} {}",
            b["url"].as_str().unwrap_or("?"),
            b["weight"],
            b["active_connections"],
            b["total_requests"],
            if b["healthy"].as_bool().unwrap_or(false) { "healthy" } else { "UNHEALTHY" },
        );
    }
}
