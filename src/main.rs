use apply_copilot::cli::commands::{
    cmd_export, cmd_fill, cmd_history_csv, cmd_history_delete, cmd_history_list,
    cmd_history_set_status, cmd_import, cmd_page, cmd_profile_load, cmd_profile_show, cmd_settings,
};
use apply_copilot::cli::config::{
    Cli, Commands, HistoryCommand, ProfileCommand, load_config, resolve_config,
};
use apply_copilot::copilot::protocol::Message;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli, load_config(cli.config.as_deref()));

    let output = match cli.command {
        Commands::Context { target, format } => {
            cmd_page(&Message::GetPageContext, &target, format, &config)?
        }
        Commands::Preview { target, format } => {
            cmd_page(&Message::PreviewFields, &target, format, &config)?
        }
        Commands::Fill {
            target,
            overwrite,
            format,
        } => cmd_fill(&target, overwrite, format, &config)?,
        Commands::Undo { target, format } => {
            cmd_page(&Message::UndoLastFill, &target, format, &config)?
        }
        Commands::CheckConfirmation { target, format } => {
            cmd_page(&Message::CheckConfirmation, &target, format, &config)?
        }
        Commands::MarkApplied { target, format } => {
            cmd_page(&Message::MarkAsApplied, &target, format, &config)?
        }
        Commands::Profile { action } => match action {
            ProfileCommand::Show => cmd_profile_show(&config)?,
            ProfileCommand::Load { file } => cmd_profile_load(&file, &config)?,
        },
        Commands::Settings {
            overwrite_existing,
            preview_before_fill,
        } => cmd_settings(overwrite_existing, preview_before_fill, &config)?,
        Commands::History { action } => match action {
            HistoryCommand::List => cmd_history_list(&config)?,
            HistoryCommand::SetStatus { id, status, notes } => {
                cmd_history_set_status(&id, status, notes, &config)?
            }
            HistoryCommand::Delete { id } => cmd_history_delete(&id, &config)?,
            HistoryCommand::Csv { output } => cmd_history_csv(output.as_deref(), &config)?,
        },
        Commands::Export { output } => cmd_export(output.as_deref(), &config)?,
        Commands::Import { input } => cmd_import(&input, &config)?,
    };

    print!("{}", output);
    Ok(())
}
