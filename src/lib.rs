// Accommodation search engine: availability filtering and stay pricing over a
// rentable-unit catalog, plus the supplier and presentation layers around it

pub mod catalog_cache;
pub mod criteria;
pub mod filter;
pub mod listing;
pub mod model;
pub mod pricing;
pub mod supplier;

// Re-export key types for convenience
pub use catalog_cache::{CacheStatsReport, CachedCatalog};
pub use criteria::{BookingWindow, FilterCriteria, FilterInput};
pub use filter::{filter_catalog, filter_catalog_refs, matches};
pub use listing::{search, ListingView, PriceDisplay, ReservationSummary, SearchResults};
pub use model::{
    parse_day, validate_catalog, AccommodationUnit, Amenities, Amenity, DateInterval,
    PriceInterval, UnitId, ValidationIssue,
};
pub use pricing::{
    nightly_rate_at, price_range, price_stay, NightlyCharge, PriceCalculator, PriceRange,
    PricingConfig, PricingError, StayQuote,
};
pub use supplier::{
    CatalogSupplier, FileCatalogSupplier, HttpCatalogSupplier, RetryConfig,
    StaticCatalogSupplier, SupplierConfig, SupplierError,
};
