use dotenvy::dotenv;

use trashcan_map::config::Config;
use trashcan_map::database::{self, schema};
use trashcan_map::services::seed_service::{self, SEED_FIXTURES, SEED_ORIGIN};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match database::connect(&config.database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("cannot connect to {}: {}", config.database_url, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = schema::ensure_schema(&pool).await {
        eprintln!("schema setup failed: {}", e);
        std::process::exit(1);
    }

    match seed_service::seed_trash_cans(&pool).await {
        Ok(report) => {
            for row in &report.inserted {
                println!("✅ #{} {} ({:.2} km)", row.id, row.address, row.distance_km);
            }
            println!(
                "seed: cleared={}, images_removed={}, inserted={}/{}, failed={}",
                report.cleared,
                report.images_removed,
                report.inserted.len(),
                SEED_FIXTURES.len(),
                report.failed
            );
            println!(
                "📍 origin: {:.8}, {:.8}",
                SEED_ORIGIN.latitude, SEED_ORIGIN.longitude
            );
        }
        Err(e) => {
            eprintln!("seed failed: {}", e);
            std::process::exit(1);
        }
    }
}
