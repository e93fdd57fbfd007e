//! CLI smoke entry point.
//!
//! Without arguments, prints linkage info. With `<db_path> <username>`,
//! opens (and seeds, when empty) the catalog database and prints the
//! storefront and metadata views as JSON. An optional third argument
//! enables file logging into that directory.

use catalog_core::api::{get_metadata, get_storefront, ApiResponse};
use catalog_core::db::open_db;
use catalog_core::db::seed::{is_seeded, seed_sample_data};
use catalog_core::{
    init_logging_from_config, Clock, CoreConfig, MemoryCacheStore, MetadataService,
    SqliteCatalogRepository, SqliteListingRepository, SqliteProfileRepository, StorefrontService,
    SystemClock,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("catalog_core ping={}", catalog_core::ping());
    println!("catalog_core version={}", catalog_core::core_version());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (db_path, username) = match args.as_slice() {
        [] => return ExitCode::SUCCESS,
        [db_path, username, ..] => (db_path.as_str(), username.as_str()),
        _ => {
            eprintln!("usage: catalog_cli <db_path> <username> [log_dir]");
            return ExitCode::from(2);
        }
    };

    match run(db_path, username, args.get(2).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("catalog_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &str, username: &str, log_dir: Option<&str>) -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = log_dir {
        init_logging_from_config(&config, log_dir)?;
    }

    let mut conn = open_db(db_path)?;
    if !is_seeded(&conn)? {
        seed_sample_data(&mut conn, SystemClock.now())?;
        info!("event=cli_seed module=cli status=ok db_path={db_path}");
    }

    let cache = MemoryCacheStore::new(config.cache.max_capacity, config.cache.default_ttl);
    let storefront = StorefrontService::new(
        SqliteProfileRepository::new(&conn),
        SqliteListingRepository::new(&conn),
        &cache,
        config.storefront,
    );
    let metadata = MetadataService::new(SqliteCatalogRepository::new(&conn), &cache);

    print_response("storefront", &get_storefront(&storefront, username))?;
    print_response("metadata", &get_metadata(&metadata))?;
    Ok(())
}

fn print_response(label: &str, response: &ApiResponse) -> Result<(), serde_json::Error> {
    println!("{label} status={}", response.status);
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    Ok(())
}
