// Kickabout entry point.
//
// 1. Initialize tracing (stderr, so command output on stdout stays clean)
// 2. Parse the command line
// 3. Load config, seeding it from defaults on first run
// 4. Open the database
// 5. Run the command and print its output

use anyhow::Context;
use clap::Parser;
use tracing::info;

use kickabout::app::App;
use kickabout::cli::Cli;
use kickabout::config;
use kickabout::db::Database;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = config::load_config(&cli.base_dir).context("failed to load configuration")?;
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => config.resolve_db_path(&cli.base_dir),
    };

    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    let app = App::new(db, &config);
    let output = app.run(&cli.command)?;
    println!("{output}");
    Ok(())
}

/// Initialize tracing to stderr, filtered by `RUST_LOG`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kickabout=info,kickabout_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
