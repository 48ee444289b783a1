//! dispatch-kernel
//!
//! Serves the built-in components and whatever `[[routes]]` the config
//! declares.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────▶ axum (trace, request-id, timeout) ──▶ Application::handle
//!                                                          │
//!                                          RouteTable::resolve (first match)
//!                                            │                       │
//!                                         matched                 no match
//!                                            ▼                       ▼
//!                          global ++ route middleware      NotFoundController
//!                                            ▼
//!                                       controller
//!     Client Response ◀──────────────────────┘
//!
//!     Background: CyclicScheduler (one tokio task per job)
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dispatch_kernel::config::ConfigLoader;
use dispatch_kernel::controller::StatusController;
use dispatch_kernel::middleware::builtin::{AccessLog, ResponseHeaders};
use dispatch_kernel::observability::logging;
use dispatch_kernel::{lifecycle, AppConfig, AppContext, Application, PathParams, Registry, RouteDeclaration};

#[derive(Parser)]
#[command(name = "dispatch-kernel")]
#[command(about = "HTTP dispatch and background job kernel", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and cyclic jobs
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override listener.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Build and validate the application, then exit
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the resolved route table
    Routes {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load(path: Option<PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut loader = ConfigLoader::new().process_env().dotenv(".env");
    if let Some(path) = path {
        loader = loader.file(path);
    }
    Ok(loader.load()?)
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .controller(
            RouteDeclaration::new("GET", "/status", StatusController::NAME),
            |_params: PathParams, ctx: &AppContext| StatusController::new(ctx.clone()),
        )
        .middleware(AccessLog::NAME, || AccessLog)
        .configurable_middleware(ResponseHeaders::NAME, ResponseHeaders::from_options);
    registry
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => {
            let mut config = load(config)?;
            if let Some(bind) = bind {
                config.listener.bind_address = bind;
            }
            logging::init(&config.observability)?;
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "dispatch-kernel starting");
            lifecycle::run(config, registry()).await?;
        }
        Commands::Check { config } => {
            let app = Application::build(load(config)?, registry())?;
            println!(
                "ok: {} routes, {} global middleware, {} cyclic jobs configured",
                app.routes().len(),
                app.global_middlewares().len(),
                app.config().cyclic_jobs.len()
            );
        }
        Commands::Routes { config } => {
            let app = Application::build(load(config)?, registry())?;
            for route in app.routes().iter() {
                let middlewares: Vec<&str> = route.middlewares().iter().map(|m| m.name.as_str()).collect();
                println!(
                    "{:<7} {:<40} {:<24} [{}]",
                    route.method(),
                    route.pattern(),
                    route.controller(),
                    middlewares.join(", ")
                );
            }
        }
    }

    Ok(())
}
