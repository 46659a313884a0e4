use std::process;

use clap::Parser;
use database::{
    database::options::{DatabaseOptions, StorageEngine},
    model::person::{Person, PersonFields},
    persistence::{self, PersonStore, StoreResult},
};

/// 📇 Phonebook seeding tool, lists every person or adds a single one
///
/// Shares its storage with the phonebook server, both are configured with the same postgres
/// connection string.
#[derive(Parser, Debug)]
struct Cli {
    /// Postgres connection string, e.g. "host=localhost user=phonebook password=secret"
    #[clap(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Name of the person to add
    #[clap(requires = "number")]
    name: Option<String>,

    /// Number of the person to add
    #[clap(requires = "name")]
    number: Option<String>,
}

enum Command {
    List,
    Add(PersonFields),
}

impl Cli {
    fn seed_command(&self) -> Command {
        match (&self.name, &self.number) {
            (Some(name), Some(number)) => Command::Add(PersonFields::new(name, number)),
            _ => Command::List,
        }
    }
}

fn format_person(person: &Person) -> String {
    format!("{} {}", person.name, person.number)
}

async fn run(store: &dyn PersonStore, command: Command) -> StoreResult<()> {
    match command {
        Command::List => {
            println!("phonebook:");

            for person in store.list_all().await? {
                println!("{}", format_person(&person));
            }
        }
        Command::Add(fields) => {
            let person = store.create(fields).await?;

            println!("added {} number {} to phonebook", person.name, person.number);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let args = Cli::parse();

    let database_url = match args.database_url.as_deref() {
        Some(database_url) if !database_url.is_empty() => database_url.to_string(),
        _ => {
            eprintln!("give a database url as argument (--database-url or DATABASE_URL)");
            process::exit(1);
        }
    };

    let options =
        DatabaseOptions::default().set_storage_engine(StorageEngine::Postgres(database_url));

    let store = match persistence::connect(options).await {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Unable to connect to the phonebook: {}", err);
            process::exit(1);
        }
    };

    let result = run(store.as_ref(), args.seed_command()).await;

    // One shot tool, always release the connection before exiting
    if let Err(err) = store.shutdown().await {
        log::warn!("Unable to close the phonebook cleanly: {}", err);
    }

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}
