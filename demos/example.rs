use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use dragon_cfg::config::{drop_args_after_target, DEFAULT_PASSTHROUGH};
use dragon_cfg::{ConfigError, Configurable, Field, Kind, Loader, Schema};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct AppConfig {
    database_url: String,
    backup_database_url: String,
    api_key: String,
    max_retries: u32,
    timeout: Duration,
}

impl Configurable for AppConfig {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field(
                Field::new("database_url", Kind::Text)
                    .file("dbURL")
                    .env("DB_URL")
                    .arg("db-url")
                    .required()
                    .desc("Database URL"),
                |c| &mut c.database_url,
            )
            .field(
                Field::new("backup_database_url", Kind::Text)
                    .file("backupDBURL")
                    .env("BACKUP_DB_URL")
                    .arg("backup-db-url")
                    .depends("database_url")
                    .desc("Backup Database URL"),
                |c| &mut c.backup_database_url,
            )
            .field(
                Field::new("api_key", Kind::Text)
                    .file("apiKey")
                    .env("API_KEY")
                    .arg("api-key")
                    .required()
                    .desc("API Key"),
                |c| &mut c.api_key,
            )
            .field(
                Field::new("max_retries", Kind::Uint)
                    .file("maxRetries")
                    .env("MAX_RETRIES")
                    .arg("max-retries")
                    .default("3")
                    .desc("Maximum number of retries"),
                |c| &mut c.max_retries,
            )
            .field(
                Field::new("timeout", Kind::Duration)
                    .file("timeout")
                    .env("TIMEOUT")
                    .arg("timeout")
                    .default("5s")
                    .desc("Timeout duration"),
                |c| &mut c.timeout,
            )
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = AppConfig::default();
    let result = Loader::builder()
        .with_file(Path::new("demos/app.config"))
        .load(&mut config);

    match result {
        Ok(_) => {}
        Err(ConfigError::HelpRequested(usage)) => {
            print!("{usage}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    }

    let args: Vec<String> = std::env::args().collect();
    let remaining = drop_args_after_target(&args, DEFAULT_PASSTHROUGH);

    println!("Database URL: {}", config.database_url);
    println!("Backup Database URL: {}", config.backup_database_url);
    println!("API Key: {}", config.api_key);
    println!("Max Retries: {}", config.max_retries);
    println!("Timeout: {:?}", config.timeout);
    println!("Remaining arguments: {remaining:?}");

    ExitCode::SUCCESS
}
