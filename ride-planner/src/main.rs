use std::path::PathBuf;
use std::sync::Arc;

use ride_planner::cache::Caches;
use ride_planner::config::LocationDirectory;
use ride_planner::domain::LocationKey;
use ride_planner::facade::ExternalLookup;
use ride_planner::providers::{NominatimConfig, NominatimGeocoder, OrsConfig, OrsRouter};
use ride_planner::roster::load_roster;

/// Directory holding localita.json and quartieri.json.
const DEFAULT_CONFIG_DIR: &str = "data/config";

/// Directory holding the coordinate and route cache files.
const DEFAULT_CACHE_DIR: &str = "data/cache";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(roster_path), Some(destination)) = (args.next(), args.next()) else {
        eprintln!("Usage: ride-planner <roster.json> <DESTINATION_KEY>");
        std::process::exit(2);
    };
    let destination = LocationKey::parse(&destination).expect("Invalid destination key");

    let api_key = std::env::var("ORS_API_KEY").unwrap_or_else(|_| {
        eprintln!("Warning: ORS_API_KEY not set. Route requests will fail.");
        String::new()
    });
    let user_agent =
        std::env::var("NOMINATIM_USER_AGENT").unwrap_or_else(|_| "ride-planner".to_string());

    let directory = Arc::new(
        LocationDirectory::load(DEFAULT_CONFIG_DIR).expect("Failed to load location config"),
    );
    println!("Loaded {} locations", directory.len());

    let students =
        load_roster(PathBuf::from(&roster_path), &directory).expect("Failed to load roster");
    println!("Loaded {} students", students.len());

    let caches = Caches::open(DEFAULT_CACHE_DIR).expect("Failed to open caches");
    let geocoder = NominatimGeocoder::new(NominatimConfig::new(user_agent), directory.clone())
        .expect("Failed to create geocoder");
    let planner = OrsRouter::new(OrsConfig::new(api_key)).expect("Failed to create router");
    let lookup = ExternalLookup::new(caches, geocoder, planner);

    // One route request per unique pickup location
    let mut locations: Vec<LocationKey> = students.iter().map(|s| s.location.clone()).collect();
    locations.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    locations.dedup();

    for location in &locations {
        match lookup.resolve_route(location, &destination).await {
            Some(route) => println!(
                "{} -> {}: {:.1} km, {:.0} min",
                location,
                destination,
                route.distance_km(),
                route.duration_mins()
            ),
            None => println!("{} -> {}: unresolvable", location, destination),
        }
    }

    lookup.save_caches().await.expect("Failed to save caches");
    println!("Caches saved");
}
