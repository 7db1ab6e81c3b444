use clap::{Parser, Subcommand};
use dnschat_domain::{ChatRequest, CliOverrides, DnsError, TransportAttempt, TransportKind};
use serde::Serialize;
use tracing::{error, info};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "dnschat")]
#[command(version)]
#[command(about = "DNSChat - chat with an LLM over DNS TXT queries")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a message and print the reply
    Ask {
        message: String,

        /// Server host from the allow-list (defaults to the registry default)
        #[arg(short, long)]
        server: Option<String>,

        /// Conversation id appended to the query name
        #[arg(long, default_value = "")]
        conversation: String,

        /// Transports to try, in order (native, udp, tcp, https)
        #[arg(long, value_delimiter = ',')]
        transports: Option<Vec<TransportKind>>,

        /// Per-attempt timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print the transport attempt log as JSON
        #[arg(long)]
        attempts: bool,
    },

    /// List the allowed servers
    Servers,
}

#[derive(Serialize)]
struct AttemptReport<'a> {
    reply: Option<&'a str>,
    error: Option<&'a DnsError>,
    attempts: &'a [TransportAttempt],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        ..CliOverrides::default()
    };
    if let Command::Ask {
        transports,
        timeout_ms,
        ..
    } = &cli.command
    {
        cli_overrides.transports = transports.clone();
        cli_overrides.timeout_ms = *timeout_ms;
    }

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config.logging);

    info!("Starting DNSChat v{}", env!("CARGO_PKG_VERSION"));

    let services = di::ChatServices::new(&config)?;

    match cli.command {
        Command::Servers => {
            let registry = services.client.registry();
            for entry in registry.entries() {
                let marker = if entry.default { "*" } else { " " };
                let doh = if entry.doh { "doh" } else { "no-doh" };
                println!("{} {:<20} {:<30} {}", marker, entry.host, entry.label, doh);
            }
            Ok(())
        }
        Command::Ask {
            message,
            server,
            conversation,
            attempts: true,
            ..
        } => {
            let message = message.trim();
            if message.is_empty() {
                return Err(DnsError::query_failed("Message cannot be empty").into());
            }

            let outcome = services
                .client
                .query_with_attempts(message, conversation.trim(), server.as_deref())
                .await;
            let report = AttemptReport {
                reply: outcome.result.as_deref().ok(),
                error: outcome.result.as_ref().err(),
                attempts: &outcome.attempts,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);

            outcome.result.map(|_| ()).map_err(Into::into)
        }
        Command::Ask {
            message,
            server,
            conversation,
            ..
        } => {
            let mut request = ChatRequest::new(message, conversation);
            if let Some(server) = server {
                request = request.with_server(server);
            }

            match services.send_message.execute(&request).await {
                Ok(reply) => {
                    info!(server = %reply.server, reply_len = reply.text.len(), "Reply received");
                    println!("{}", reply.text);
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "Query failed");
                    Err(e.into())
                }
            }
        }
    }
}
