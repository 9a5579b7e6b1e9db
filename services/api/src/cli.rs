use crate::demo::{run_demo, run_resolve, DemoArgs, ResolveArgs};
use crate::server;
use artisan_ops::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Artisan Ops",
    about = "Run the artisan back-office service or resolve dossier snapshots from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with dossier snapshots without starting the service
    Dossier {
        #[command(subcommand)]
        command: DossierCommand,
    },
    /// Run a CLI demo walking sample dossiers through the resolver
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DossierCommand {
    /// Resolve the next action for a dossier snapshot stored as JSON
    Resolve(ResolveArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Dossier {
            command: DossierCommand::Resolve(args),
        } => run_resolve(args),
        Command::Demo(args) => run_demo(args),
    }
}
