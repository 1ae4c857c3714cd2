use clap::{Parser, Subcommand};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "hello-cli")]
#[command(about = "Query a running hello-server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for a greeting
    Greet {
        /// Name to greet
        name: Option<String>,
    },
    /// Show what the server sees about this request
    Info,
    /// Classify a user agent
    Agent {
        /// User-Agent header to send instead of the client default
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Dump the request headers as received
    Headers,
    /// Show the resolved client IP
    Ip,
    /// Echo a message (GET) or a body (POST with --post)
    Echo {
        message: Option<String>,
        #[arg(long)]
        post: bool,
    },
    /// Look a key up in the server's cache
    Get { key: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Greet { name } => {
            let mut req = client.get(format!("{}/", base));
            if let Some(name) = name {
                req = req.query(&[("name", name)]);
            }
            req
        }
        Commands::Info => client.get(format!("{}/info", base)),
        Commands::Agent { user_agent } => {
            let mut req = client.get(format!("{}/agent", base));
            if let Some(ua) = user_agent {
                req = req.header(USER_AGENT, ua);
            }
            req
        }
        Commands::Headers => client.get(format!("{}/headers", base)),
        Commands::Ip => client.get(format!("{}/ip", base)),
        Commands::Echo { message, post: true } => client
            .post(format!("{}/echo", base))
            .body(message.unwrap_or_default()),
        Commands::Echo { message, post: false } => {
            let mut req = client.get(format!("{}/echo", base));
            if let Some(msg) = message {
                req = req.query(&[("msg", msg)]);
            }
            req
        }
        Commands::Get { key } => client.get(format!("{}/redis", base)).query(&[("key", key)]),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprint!("{}", text);
        }
        std::process::exit(1);
    }

    if is_json {
        let json: Value = res.json().await?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", res.text().await?);
    }
    Ok(())
}
