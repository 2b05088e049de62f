use dockstrap::cli::commands::{CliArgs, Commands};
use dockstrap::cli::handlers::{
    handle_compose, handle_config, handle_detect, handle_dockerfile, handle_install,
    handle_scaffold, handle_setup, CliContext,
};
use dockstrap::cli::StdinPrompter;
use dockstrap::error::EXIT_FAILURE;
use dockstrap::util::logging::{init_logging, LoggingConfig};
use dockstrap::{DockstrapConfig, NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = DockstrapConfig::default();
    init_logging(LoggingConfig::resolve(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
        &config.log_level,
    ));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    if let Commands::Config(format_args) = &args.command {
        process::exit(handle_config(&config, format_args));
    }

    let ctx = match CliContext::from_env(config, args.work_dir.clone(), args.quiet) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("\u{2717} {:#}", e);
            process::exit(EXIT_FAILURE);
        }
    };

    let exit_code = match &args.command {
        Commands::Setup => handle_setup(&ctx, &StdinPrompter).await,
        Commands::Install(install_args) => handle_install(&ctx, install_args).await,
        Commands::Scaffold(scaffold_args) => handle_scaffold(&ctx, scaffold_args).await,
        Commands::Dockerfile(dockerfile_args) => handle_dockerfile(&ctx, dockerfile_args),
        Commands::Compose(compose_args) => handle_compose(&ctx, compose_args),
        Commands::Detect(detect_args) => handle_detect(&ctx, detect_args),
        Commands::Config(format_args) => handle_config(&ctx.config, format_args),
    };

    process::exit(exit_code);
}
