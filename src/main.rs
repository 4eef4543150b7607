//! Lead Desk - contact and Kundli lead submission
//!
//! Collects leads for the shop from the terminal or a local web API:
//! - Validates each form before anything leaves the machine
//! - Posts contact messages and Kundli requests to the lead backend
//! - Hands every Kundli request to WhatsApp, even when the backend is down

mod api;
mod api_routes;
mod config;
mod feedback;
mod flow;
mod idempotency;
mod leads;
mod notify;
mod server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use crate::leads::cli::{is_interactive, run_contact_flow, run_kundli_flow};
use crate::leads::{ContactDraft, ContactService, KundliDraft, KundliService, DEFAULT_COUNTRY};

/// Lead Desk - send contact messages and Kundli requests
#[derive(Parser)]
#[command(name = "lead-desk")]
#[command(author = "Shree Mayank Computers")]
#[command(version)]
#[command(about = "Submit contact and Kundli leads, with WhatsApp as the fallback channel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a contact message (prompts for anything missing)
    Contact {
        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Phone number
        #[arg(short, long)]
        phone: Option<String>,

        /// Service code (hardware, banking, web, consultation)
        #[arg(short, long)]
        service: Option<String>,

        /// Message for the team
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Request a Kundli reading (prompts for anything missing)
    Kundli {
        /// Full name
        #[arg(short, long)]
        name: Option<String>,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Phone number (10-15 characters)
        #[arg(short, long)]
        phone: Option<String>,

        /// Gender (male, female, other)
        #[arg(short, long)]
        gender: Option<String>,

        /// Date of birth (e.g. 1994-03-21)
        #[arg(long)]
        dob: Option<String>,

        /// Time of birth (e.g. 06:45)
        #[arg(long)]
        tob: Option<String>,

        /// Place of birth
        #[arg(long)]
        place: Option<String>,

        /// State
        #[arg(long)]
        state: Option<String>,

        /// Country
        #[arg(long, default_value = DEFAULT_COUNTRY)]
        country: String,

        /// Service code (see `lead-desk services`)
        #[arg(short, long)]
        service: Option<String>,

        /// Additional requests or questions
        #[arg(long)]
        notes: Option<String>,

        /// Print the WhatsApp link instead of opening it
        #[arg(long, default_value_t = false)]
        no_open: bool,
    },

    /// Start the local lead API
    Serve {
        /// Port to run the server on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not auto-open the browser
        #[arg(long, default_value_t = false)]
        no_open: bool,
    },

    /// List the services offered, with Kundli prices
    Services,

    /// Show direct ways to reach the shop
    Reach,

    /// Show configuration path and settings
    Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lead_desk=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = config::Config::load().context("failed to load configuration")?;

    match cli.command {
        Some(Commands::Contact {
            name,
            email,
            phone,
            service,
            message,
        }) => {
            let seed = ContactDraft {
                name: name.unwrap_or_default(),
                email: email.unwrap_or_default(),
                phone: phone.unwrap_or_default(),
                service: service.unwrap_or_default(),
                message: message.unwrap_or_default(),
            };
            let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            run_contact_flow(&rt, &cfg, seed, is_interactive())?;
        }
        Some(Commands::Kundli {
            name,
            email,
            phone,
            gender,
            dob,
            tob,
            place,
            state,
            country,
            service,
            notes,
            no_open,
        }) => {
            if no_open {
                cfg.messaging.open_links = false;
            }
            let seed = KundliDraft {
                name: name.unwrap_or_default(),
                email: email.unwrap_or_default(),
                phone: phone.unwrap_or_default(),
                gender: gender.unwrap_or_default(),
                date_of_birth: dob.unwrap_or_default(),
                time_of_birth: tob.unwrap_or_default(),
                place_of_birth: place.unwrap_or_default(),
                state: state.unwrap_or_default(),
                country,
                service_type: service.unwrap_or_default(),
                additional_requests: notes.unwrap_or_default(),
            };
            let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            run_kundli_flow(&rt, &cfg, seed, is_interactive())?;
        }
        Some(Commands::Serve { port, no_open }) => {
            let port = port.unwrap_or(cfg.server.port);
            let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            rt.block_on(server::start_server(&cfg, port, !no_open))?;
        }
        Some(Commands::Services) | None => {
            print_services();
        }
        Some(Commands::Reach) => {
            print_reach(&cfg);
        }
        Some(Commands::Config) => {
            show_config_info(&cfg)?;
        }
    }

    Ok(())
}

fn print_services() {
    println!("{}", "Contact services\n".bright_cyan().bold());
    for service in ContactService::ALL {
        println!(
            "  {:<14} {}",
            service.code().bright_black(),
            service.label().bright_white()
        );
    }

    println!("\n{}", "Kundli services\n".bright_magenta().bold());
    for service in KundliService::ALL {
        println!(
            "  {:<26} {:<36} {}",
            service.code().bright_black(),
            service.label().bright_white(),
            service.price().bright_green()
        );
    }

    println!(
        "\n{} {}",
        "Send one with:".bright_yellow(),
        "lead-desk contact  |  lead-desk kundli".bright_white()
    );
}

fn print_reach(cfg: &config::Config) {
    let links = notify::contact_links(&cfg.business, &cfg.messaging);

    println!("{}", cfg.business.name.bright_cyan().bold());
    println!();
    println!("  {} {}", "Call:    ".bright_yellow(), links.call.bright_white());
    println!("  {} {}", "WhatsApp:".bright_yellow(), links.whatsapp.bright_white());
    println!("  {} {}", "Email:   ".bright_yellow(), links.email.bright_white());
}

fn show_config_info(cfg: &config::Config) -> Result<()> {
    println!("{}", "Lead Desk Configuration\n".bright_cyan().bold());

    match config::get_config_path() {
        Ok(path) => {
            println!("{} {}", "Config file:".bright_yellow(), path.bright_white());
            if std::path::Path::new(&path).exists() {
                println!("  {} {}", "Status:".bright_cyan(), "Exists".bright_green());
            } else {
                println!(
                    "  {} {}",
                    "Status:".bright_cyan(),
                    "Not created yet (will use defaults)".bright_yellow()
                );
            }
        }
        Err(e) => {
            println!(
                "{} Could not determine config path: {}",
                "Error:".bright_red(),
                e
            );
        }
    }

    if let Err(err) = config::init_config() {
        println!(
            "  {} {}",
            "Note:".bright_yellow(),
            format!("Could not create config file yet: {}", err).bright_black()
        );
    }

    println!("\n{}", "API settings:".bright_white().bold());
    println!("  {} {}", "Base URL:".bright_cyan(), cfg.api.base_url);
    match cfg.api.timeout_seconds {
        Some(secs) => println!("  {} {}s", "Timeout:".bright_cyan(), secs),
        None => println!("  {} {}", "Timeout:".bright_cyan(), "transport default".bright_black()),
    }
    println!("  {} {}", "Verify SSL:".bright_cyan(), cfg.api.verify_ssl);

    println!("\n{}", "Messaging:".bright_white().bold());
    println!("  {} {}", "WhatsApp number:".bright_cyan(), cfg.messaging.whatsapp_number);
    println!("  {} {}", "Source label:".bright_cyan(), cfg.messaging.source_label);
    println!("  {} {}", "Open links:".bright_cyan(), cfg.messaging.open_links);

    println!("\n{}", "Local API:".bright_white().bold());
    println!("  {} {}", "Port:".bright_cyan(), cfg.server.port);
    let origins = if cfg.server.allowed_origins.is_empty() {
        "none".to_string()
    } else {
        cfg.server.allowed_origins.join(", ")
    };
    println!("  {} {}", "Allowed origins:".bright_cyan(), origins);
    println!("  {} {}", "Open links:".bright_cyan(), cfg.server.open_links);

    Ok(())
}
