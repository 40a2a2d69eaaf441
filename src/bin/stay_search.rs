use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stay_finder::supplier::DEFAULT_CATALOG_URL;
use stay_finder::{
    search, AccommodationUnit, BookingWindow, CachedCatalog, CatalogSupplier,
    FileCatalogSupplier, FilterCriteria, FilterInput, HttpCatalogSupplier, PriceCalculator,
    PriceDisplay, ReservationSummary, SearchResults, SupplierConfig, UnitId,
};

/// Filter the accommodation catalog and price a stay
#[derive(Debug, Parser)]
#[command(name = "stay-search", version)]
struct Cli {
    /// Listing endpoint
    #[arg(long, env = "CATALOG_URL")]
    url: Option<String>,

    /// Read the listing JSON from a file instead of the endpoint
    #[arg(long)]
    file: Option<PathBuf>,

    /// First day of the stay (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last day of the stay, charged as a night (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Minimum number of guests
    #[arg(long)]
    guests: Option<String>,

    /// Required amenity, repeatable (airConditioning, parkingSpace, pets, pool, wifi, tv)
    #[arg(long = "amenity", value_name = "KEY")]
    amenities: Vec<String>,

    /// Reserve the unit with this id for the chosen stay
    #[arg(long, value_name = "ID")]
    reserve: Option<String>,

    /// Accept dates outside the 2024 booking calendar
    #[arg(long)]
    any_year: bool,

    /// Drop catalog units that fail validation
    #[arg(long)]
    drop_invalid: bool,

    #[arg(long, default_value_t = 10000)]
    timeout_ms: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let catalog = CachedCatalog::new(build_supplier(&cli)?);
    let units = catalog
        .catalog()
        .await
        .context("failed to load the accommodation catalog")?;

    let window = if cli.any_year {
        BookingWindow::unbounded()
    } else {
        BookingWindow::default()
    };
    let criteria = FilterCriteria::from_input(&form_input(&cli), &window);
    tracing::debug!(?criteria, "applying filters");

    let calculator = PriceCalculator::default();
    let results = search(&units, &criteria, &calculator);

    if let Some(id) = &cli.reserve {
        let summary = reserve(&units, &results, &criteria, &calculator, id)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!("{summary}");
        }
        return Ok(());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_supplier(cli: &Cli) -> anyhow::Result<Box<dyn CatalogSupplier>> {
    if let Some(path) = &cli.file {
        return Ok(Box::new(
            FileCatalogSupplier::new(path).dropping_invalid_units(cli.drop_invalid),
        ));
    }

    let config = SupplierConfig {
        url: cli
            .url
            .clone()
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
        timeout_ms: cli.timeout_ms,
        drop_invalid_units: cli.drop_invalid,
        ..SupplierConfig::default()
    };
    let supplier = HttpCatalogSupplier::new(config).context("failed to build HTTP client")?;
    Ok(Box::new(supplier))
}

// Raw flag values go through the same tolerant parsing as the search form
fn form_input(cli: &Cli) -> FilterInput {
    FilterInput {
        start_date: cli.start.clone().unwrap_or_default(),
        end_date: cli.end.clone().unwrap_or_default(),
        num_guests: cli.guests.clone().unwrap_or_default(),
        amenities: cli
            .amenities
            .iter()
            .map(|key| (key.clone(), true))
            .collect(),
    }
}

fn reserve(
    units: &[AccommodationUnit],
    results: &SearchResults,
    criteria: &FilterCriteria,
    calculator: &PriceCalculator,
    id: &str,
) -> anyhow::Result<ReservationSummary> {
    let Some((start, end)) = criteria.stay() else {
        bail!("reserving needs both --start and --end");
    };

    let id = UnitId::from(id);
    if results.find(&id).is_none() {
        bail!("no accommodation with id {id} matches the filters");
    }
    let Some(unit) = units.iter().find(|unit| unit.id == id) else {
        bail!("no accommodation with id {id}");
    };

    ReservationSummary::for_stay(unit, start, end, calculator)
        .with_context(|| format!("cannot reserve {}", unit.title))
}

fn print_results(results: &SearchResults) {
    if results.is_empty() {
        println!("No accommodations found.");
        return;
    }

    for listing in &results.listings {
        println!("{} [{}]", listing.title, listing.id);
        println!("  Capacity: {}", listing.capacity);
        if let Some(meters) = listing.beach_distance_meters {
            println!("  Distance to Beach: {meters}m");
        }
        let amenities: Vec<String> = listing
            .amenities
            .iter()
            .map(|(amenity, present)| {
                format!("{}: {}", amenity.label(), if *present { "Yes" } else { "No" })
            })
            .collect();
        println!("  Amenities: {}", amenities.join(", "));

        match &listing.price {
            PriceDisplay::Range(range) => {
                println!("  Price Range: {} € - {} €", range.min, range.max);
            }
            PriceDisplay::NotPriced => println!("  Price unavailable"),
            PriceDisplay::Total(quote) => println!(
                "  Total Price: {} € ({} nights)",
                quote.total,
                quote.night_count()
            ),
            PriceDisplay::Unavailable { reason } => println!("  Price unavailable: {reason}"),
        }
        println!();
    }
}
