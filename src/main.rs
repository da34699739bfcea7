use clap::Parser;
use statusboard::cli::{
    handle_add, handle_completions, handle_config_init, handle_status, run_watch, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => statusboard::cli::serve::run_serve(args).await,
        Commands::Status(args) => handle_status(&args).await.map(|output| println!("{}", output)),
        Commands::Add(args) => handle_add(&args).await.map(|msg| println!("{}", msg)),
        Commands::Watch(args) => run_watch(args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
