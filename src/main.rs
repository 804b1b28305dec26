use clap::Parser;
use routesmith::cli::{run_create, run_remove, run_serve, Cli, Commands, RouteAction};
use routesmith::Settings;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("routesmith=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let outcome = match cli.command {
        Commands::Route { action } => match action {
            RouteAction::Create {
                name,
                table,
                auth,
                summary,
            } => run_create(&settings, &name, table, auth, summary).await,
            RouteAction::Remove { name } => run_remove(&settings, &name),
        },
        Commands::Serve { addr } => {
            if let Err(e) = run_serve(&settings, addr).await {
                eprintln!("server error: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
