//! Vegetation track demo: greenness along a synthetic migration
//!
//! Builds a 50x50 NDVI stack of 23 layers (16-day composites over one year)
//! where a green-up wave sweeps north through the season, then follows a
//! track of 12 fixes heading north and prints for every fix:
//!   1. the nearest composite within ±8 days (single cell)
//!   2. the nearest composite with a 150 m smoothing radius
//!   3. the NDVI trend over ±32 days (least-squares slope per day)
//!
//! NDVI is stored as scaled integers (×10000), as delivered by most
//! composite products.
//!
//! Run:
//!   cargo run -p trackfuse-algorithms --example vegetation_track
//!   cargo run -p trackfuse-algorithms --example vegetation_track -- -v

use chrono::{Days, NaiveDate};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use trackfuse_algorithms::temporal::{
    Environment, QueryParams, TimeWindow, TrendParams, data_query, time_dir,
};
use trackfuse_core::raster::Extraction;
use trackfuse_core::{CRS, GeoTransform, Raster, RasterStack, SampleSet};

const ROWS: usize = 50;
const COLS: usize = 50;
const CELL: f64 = 100.0;
const LAYERS: u64 = 23;
const NODATA: i16 = -3000;

fn main() {
    let verbose = std::env::args().any(|a| a == "-v");
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let layer_dates: Vec<NaiveDate> = (0..LAYERS).map(|k| start + Days::new(16 * k)).collect();
    let stack = build_stack();
    info!(
        "NDVI stack: {} layers of {}x{}, {} to {}",
        stack.len(),
        COLS,
        ROWS,
        layer_dates[0],
        layer_dates[layer_dates.len() - 1]
    );

    let (samples, obs_dates) = build_track(start);
    info!("Track: {} fixes", samples.len());

    let windowed = QueryParams {
        window: Some(TimeWindow::symmetric(8.0)),
    };
    let point = data_query(
        &obs_dates,
        &Environment::stack(&samples, &stack),
        &layer_dates,
        &windowed,
    )
    .expect("point query failed");

    let smoothed_env = Environment::Stack {
        samples: &samples,
        stack: &stack,
        extraction: Extraction::buffered(150.0),
    };
    let smoothed =
        data_query(&obs_dates, &smoothed_env, &layer_dates, &windowed).expect("smoothed query failed");

    let trend = time_dir(
        &obs_dates,
        &Environment::stack(&samples, &stack),
        &layer_dates,
        &TrendParams::new(TimeWindow::symmetric(32.0)),
    )
    .expect("trend failed");

    println!(
        "\n{:>3}  {:>10}  {:>10}  {:>7}  {:>6}  {:>7}  {:>10}  {:>2}",
        "fix", "observed", "layer", "offset", "ndvi", "smooth", "trend/day", "n"
    );
    for i in 0..samples.len() {
        let p = &point[i];
        println!(
            "{:>3}  {:>10}  {:>10}  {:>7}  {:>6}  {:>7}  {:>10}  {:>2}",
            i,
            obs_dates[i].to_string(),
            p.date.map_or("-".into(), |d| d.to_string()),
            p.offset_days.map_or("-".into(), |o| format!("{o:+}")),
            fmt_opt(p.value, 0),
            fmt_opt(smoothed[i].value, 0),
            fmt_opt(trend[i].value, 2),
            trend[i].count,
        );
    }

    let resolved = point.iter().filter(|r| !r.is_missing()).count();
    info!("{resolved}/{} fixes matched a composite within ±8 days", samples.len());
}

/// Scaled-integer NDVI (×10000) with a green-up wave moving north.
///
/// Every seventh cell of each composite is cloud-masked.
fn build_stack() -> RasterStack<i16> {
    let transform = GeoTransform::new(500_000.0, 6_105_000.0, CELL, -CELL);
    let layers = (0..LAYERS as usize)
        .map(|k| {
            let mut r = Raster::new(ROWS, COLS)
                .with_transform(transform)
                .with_crs(CRS::from_epsg(32633))
                .with_nodata(NODATA);
            for row in 0..ROWS {
                for col in 0..COLS {
                    let v = if (row * COLS + col + k) % 7 == 0 {
                        NODATA
                    } else {
                        ndvi(row, col, k)
                    };
                    r.set(row, col, v).expect("cell inside grid");
                }
            }
            r
        })
        .collect();
    RasterStack::new(layers).expect("layers share one grid")
}

fn ndvi(row: usize, col: usize, layer: usize) -> i16 {
    // southern rows (high row index) green up first
    let peak = 6.0 + (ROWS - row) as f64 * 0.2;
    let phase = (layer as f64 - peak) / 4.0;
    let base = 0.15 + 0.65 * (-phase * phase).exp();
    let texture = ((row * 31 + col * 17) % 11) as f64 * 0.004;
    ((base + texture) * 10_000.0).round() as i16
}

/// Twelve fixes moving north at roughly the speed of the green-up wave.
fn build_track(start: NaiveDate) -> (SampleSet, Vec<NaiveDate>) {
    let fixes = 12;
    let coords = (0..fixes).map(|i| {
        let x = 500_000.0 + 2_000.0 + i as f64 * 60.0;
        let y = 6_105_000.0 - 4_800.0 + i as f64 * 380.0;
        (x, y)
    });
    let samples = SampleSet::from_xy(coords).with_crs(CRS::from_epsg(32633));
    let dates = (0..fixes)
        .map(|i| start + Days::new(60 + i as u64 * 10))
        .collect();
    (samples, dates)
}

fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(v) => format!("{v:.precision$}"),
        None => "-".into(),
    }
}
