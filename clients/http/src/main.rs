use std::{io, process, time::Duration};

use actix_cors::Cors;
use actix_web::{
    middleware::{self, Condition},
    web::{self, Data},
    App, HttpServer,
};
use clap::{Parser, ValueEnum};
use database::{
    database::options::{DatabaseOptions, StorageEngine},
    persistence,
};
use thiserror::Error;

mod errors;
mod routes;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Storage {
    /// Keeps people for the lifetime of the process
    Memory,
    /// Keeps people in postgres, requires a database url
    Postgres,
}

/// 📇 Phonebook Server, a small JSON API for keeping names and phone numbers
#[derive(Parser, Debug)]
struct Cli {
    /// Where people are stored
    #[clap(long, env = "PHONEBOOK_STORAGE", value_enum, default_value = "postgres")]
    storage: Storage,

    /// Postgres connection string, e.g. "host=localhost user=phonebook password=secret"
    #[clap(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Port the server will run on
    #[clap(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Address the server will run on
    #[clap(short, long, default_value = "0.0.0.0")]
    address: String,

    /// Logs every http request
    #[clap(long)]
    log_http: bool,

    #[clap(long, default_value_t = 2)]
    http_workers: usize,

    /// Starts the in-memory storage with a few sample people
    #[clap(long)]
    sample_data: bool,

    /// How long a request waits on the in-memory storage before failing
    #[clap(long, default_value_t = 2000)]
    request_timeout_ms: u64,
}

#[derive(Error, Debug, PartialEq)]
enum ConfigError {
    #[error("A database url is required for postgres storage, pass --database-url or set DATABASE_URL")]
    MissingDatabaseUrl,
}

impl Cli {
    fn database_options(&self) -> Result<DatabaseOptions, ConfigError> {
        let storage_engine = match (self.storage, &self.database_url) {
            (Storage::Memory, _) => StorageEngine::Memory,
            (Storage::Postgres, Some(database_url)) if !database_url.is_empty() => {
                StorageEngine::Postgres(database_url.clone())
            }
            (Storage::Postgres, _) => return Err(ConfigError::MissingDatabaseUrl),
        };

        Ok(DatabaseOptions::default()
            .set_storage_engine(storage_engine)
            .set_sample_data(self.sample_data)
            .set_request_timeout(Duration::from_millis(self.request_timeout_ms)))
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let database_options = match args.database_options() {
        Ok(options) => options,
        Err(err) => {
            log::error!("{}", err);
            process::exit(1);
        }
    };

    // Created once and shared by every worker until the server stops
    let store = match persistence::connect(database_options).await {
        Ok(store) => store,
        Err(err) => {
            log::error!("Unable to start storage: {}", err);
            process::exit(1);
        }
    };

    log::info!("starting HTTP server on {}:{}", args.address, args.port);

    let log_http = args.log_http;
    let server_store = store.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(server_store.clone()))
            .configure(routes::configure)
            .default_service(web::to(routes::unknown_endpoint))
            .wrap(Cors::permissive())
            .wrap(Condition::new(log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address.as_str(), args.port))?
    .run()
    .await?;

    if let Err(err) = store.shutdown().await {
        log::error!("Unable to shutdown storage cleanly: {}", err);
    }

    Ok(())
}
