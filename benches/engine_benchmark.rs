use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use rust_decimal::Decimal;
use stay_finder::{
    filter_catalog_refs, price_stay, AccommodationUnit, Amenity, DateInterval, FilterCriteria,
    PriceInterval,
};

fn season_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

// Random catalog with one to three availability windows and a price list
// tiling the whole year in two-week intervals
fn random_catalog(size: usize) -> Vec<AccommodationUnit> {
    let mut rng = thread_rng();
    let start = season_start();

    (0..size)
        .map(|i| {
            let availability = (0..rng.gen_range(0..=3))
                .map(|_| {
                    let from = start + Days::new(rng.gen_range(0..300));
                    DateInterval::new(from, from + Days::new(rng.gen_range(7..60)))
                })
                .collect();

            let prices = (0..27)
                .map(|block| {
                    let from = start + Days::new(block * 14);
                    PriceInterval::new(
                        from,
                        from + Days::new(14),
                        Decimal::from(rng.gen_range(40u32..400)),
                    )
                })
                .collect();

            let mut amenities = Amenity::ALL.to_vec();
            amenities.shuffle(&mut rng);
            amenities.truncate(rng.gen_range(0..=Amenity::ALL.len()));

            AccommodationUnit::new(format!("unit{i}"), format!("Unit {i}"), rng.gen_range(1..=10))
                .with_availability(availability)
                .with_prices(prices)
                .with_amenities(amenities)
        })
        .collect()
}

pub fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("availability_filter");
    let criteria = FilterCriteria::new()
        .with_dates(
            season_start() + Days::new(150),
            season_start() + Days::new(157),
        )
        .with_min_guests(3)
        .requiring(Amenity::Wifi);

    for size in [100, 1_000, 10_000].iter() {
        let catalog = random_catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| black_box(filter_catalog_refs(catalog, &criteria).len()));
        });
    }

    group.finish();
}

pub fn pricing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("stay_pricing");
    let unit = random_catalog(1).remove(0);

    for nights in [1u64, 7, 30, 365].iter() {
        let start = season_start();
        let end = start + Days::new(nights - 1);
        group.bench_with_input(BenchmarkId::from_parameter(nights), &end, |b, end| {
            b.iter(|| black_box(price_stay(&unit, start, *end).map(|quote| quote.total)));
        });
    }

    group.finish();
}

criterion_group!(benches, filter_benchmark, pricing_benchmark);
criterion_main!(benches);
