use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use nasdl::api::{self, Context};
use nasdl::config::{KEY_NAS_URL, KEY_RESOLUTION, KEY_USER_ID, KEY_USER_PW};
use nasdl::dirs;
use nasdl::messages;
use nasdl::rpc::client::Client;
use nasdl::rpc::server::run_server;
use nasdl::storage::Storage;

#[derive(Parser)]
#[command(name = "nasdl")]
#[command(about = "Send page and media URLs to a NAS download station")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the settings and the login cache
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the background service the shells talk to
    Server {
        /// Server address
        #[arg(long, default_value = "127.0.0.1:0")]
        addr: String,
    },
    /// Queue a URL for download on the NAS
    Download {
        url: String,
        /// Resolution override for this request
        #[arg(short, long)]
        resolution: Option<String>,
        /// Send through a running service instead of in-process
        #[arg(long)]
        remote: Option<String>,
    },
    /// Probe the NAS for connectivity
    TestConnection {
        #[arg(long)]
        remote: Option<String>,
    },
    /// Show connection, login-cache and configuration state
    Status {
        #[arg(long)]
        remote: Option<String>,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current settings (password masked)
    Show,
    /// Write settings; a running service can be notified of the change
    Set {
        #[arg(long)]
        nas_url: Option<String>,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        user_pw: Option<String>,
        #[arg(long)]
        resolution: Option<String>,
        /// Address of a running service to notify
        #[arg(long)]
        notify: Option<String>,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|_| PathBuf::from("./data"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    match cli.command {
        Commands::Server { addr } => {
            let ctx = Context::new(&data_dir).await;
            let is_running = Arc::new(AtomicBool::new(true));
            let (url, handle) = run_server(&addr, ctx, is_running.clone()).await?;
            println!("Service started at {}", url);

            tokio::signal::ctrl_c().await?;
            println!("Shutting down...");
            is_running.store(false, Ordering::SeqCst);
            handle.stop()?;
        }

        Commands::Download {
            url,
            resolution,
            remote,
        } => {
            let outcome = match remote {
                Some(server_url) => {
                    Client::new(&server_url)?
                        .download(&url, resolution.as_deref())
                        .await?
                }
                None => {
                    let ctx = Context::new(&data_dir).await;
                    api::download(&ctx, &url, resolution.as_deref()).await
                }
            };
            if outcome.success {
                println!("✓ {}", outcome.message.unwrap_or_default());
            } else {
                println!("✗ {}", outcome.error.unwrap_or_default());
                std::process::exit(1);
            }
        }

        Commands::TestConnection { remote } => {
            let status = match remote {
                Some(server_url) => Client::new(&server_url)?.check_connection().await?,
                None => {
                    let ctx = Context::new(&data_dir).await;
                    api::check_connection(&ctx).await
                }
            };
            if status.success {
                println!("✓ {}", messages::MSG_CONNECTED);
            } else {
                println!("✗ {}", status.error.unwrap_or_default());
                std::process::exit(1);
            }
        }

        Commands::Status { remote } => {
            let (login, connection) = match remote {
                Some(server_url) => {
                    let client = Client::new(&server_url)?;
                    (
                        client.check_login_status().await?,
                        client.check_connection().await?,
                    )
                }
                None => {
                    let ctx = Context::new(&data_dir).await;
                    (
                        api::check_login_status(&ctx).await,
                        api::check_connection(&ctx).await,
                    )
                }
            };
            if login.nas_url.is_empty() {
                println!("NAS address: (not set)");
            } else {
                println!("NAS address: {}", login.nas_url);
            }
            if !login.has_config {
                println!("⚠ {}", messages::MSG_SETUP_REQUIRED);
            }
            println!(
                "Login cache: {}",
                if login.is_logged_in { "valid" } else { "expired" }
            );
            match connection.error {
                None => println!("Connection: ✓ {}", messages::MSG_CONNECTED),
                Some(error) => println!("Connection: ✗ {}", error),
            }
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let ctx = Context::new(&data_dir).await;
                let config = ctx.config.get().await;
                println!("nasUrl:     {}", config.nas_url);
                println!("userId:     {}", config.user_id);
                println!(
                    "userPw:     {}",
                    if config.user_pw.is_empty() {
                        "(not set)"
                    } else {
                        "********"
                    }
                );
                println!("resolution: {}", config.resolution);
            }
            ConfigCommands::Set {
                nas_url,
                user_id,
                user_pw,
                resolution,
                notify,
            } => {
                let mut entries: Vec<(String, Value)> = Vec::new();
                if let Some(value) = nas_url {
                    entries.push((KEY_NAS_URL.to_string(), Value::String(value)));
                }
                if let Some(value) = user_id {
                    entries.push((KEY_USER_ID.to_string(), Value::String(value)));
                }
                if let Some(value) = user_pw {
                    entries.push((KEY_USER_PW.to_string(), Value::String(value)));
                }
                if let Some(value) = resolution {
                    entries.push((KEY_RESOLUTION.to_string(), Value::String(value)));
                }
                if entries.is_empty() {
                    println!("Nothing to change");
                    return Ok(());
                }

                let ctx = Context::new(&data_dir).await;
                ctx.storage.set_many(entries).await?;
                println!("✓ Settings saved");

                if let Some(server_url) = notify {
                    match Client::new(&server_url)?.update_settings().await {
                        Ok(_) => println!("✓ Service notified"),
                        Err(err) => eprintln!("⚠ Could not notify service: {}", err),
                    }
                }
            }
        },
    }

    Ok(())
}
