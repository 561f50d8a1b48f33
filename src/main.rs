use std::path::Path;

use clap::Parser;
use color_eyre::Result;
use jplan::{
    Config, Database, Profile,
    cli::{self, Cli, CliContext, Commands},
    logging::{self, LogTarget},
    utils,
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    // An explicit --config file wins over the profile's config
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file
    let log_target = match command {
        Commands::Tui => {
            let dir = utils::get_data_dir(profile)
                .or_else(|| config.get_database_path().parent().map(Path::to_path_buf))
                .unwrap_or_else(|| ".".into());
            LogTarget::File(logging::log_file_path(&dir))
        }
        _ => LogTarget::Stderr,
    };
    logging::init(&config.log_level, log_target);

    // Initialize database
    let db_path = config.get_database_path();
    let db = Database::new(
        db_path.to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?
    )?;

    // Dispatch to appropriate command handler
    match command {
        Commands::Tui => {
            let app = jplan::tui::App::new(config, db, cli.week)?;
            jplan::tui::run_event_loop(app)?;
        }
        Commands::Weeks => {
            print!("{}", cli::handle_weeks(&db)?);
        }
        Commands::Planner(cmd) => {
            let today = chrono::Local::now().date_naive();
            let mut ctx = CliContext::new(db, config, today, cli.week)?;
            let mut confirm = |question: &str| cli.yes || cli::prompt_confirm(question);
            let output = cli::run(cmd, &mut ctx, &mut confirm)?;
            if output.ends_with('\n') {
                print!("{}", output);
            } else {
                println!("{}", output);
            }
        }
    }

    Ok(())
}
