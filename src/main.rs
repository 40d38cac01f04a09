//! Proximity clustering tool
//!
//! Reads sites from a CSV file, groups them into work clusters and writes
//! each site's cluster assignment. With `--legs` it instead treats the sites
//! as an ordered route and writes per-leg travel time and distance.

use anyhow::{Context, Result};
use clap::Parser;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::info;

use proximity_cluster::cluster::{ClusterResult, Entity, Point, Site, cluster_entities};
use proximity_cluster::config::{ACCESS_TOKEN_ENV, Settings};
use proximity_cluster::logging::configure_logging;
use proximity_cluster::matrix::{
    LegTime, MapboxMatrixProvider, MatrixCache, MatrixOptions, SystemClock, sequential_times_with,
};


const NOISE_LABEL: i32 = -1;

#[derive(Parser)]
#[command(name = "proximity_cluster")]
#[command(about = "Field-service site clustering tool", long_about = None)]
struct Args {
    /// Input CSV file with id,latitude,longitude,area columns
    #[arg(short, long, default_value = "sites.csv")]
    input: PathBuf,

    /// Output CSV file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long, default_value = "proximity_cluster.json")]
    settings: PathBuf,

    /// Clustering radius in km, overrides the settings file
    #[arg(short, long)]
    eps: Option<f64>,

    /// Write travel time and distance between consecutive sites instead of clusters
    #[arg(short, long)]
    legs: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    configure_logging(args.debug);

    let settings = Settings::load(&args.settings)?;
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let sites = read_sites(file)?;
    info!("Read {} sites from {}", sites.len(), args.input.display());

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    if args.legs {
        let legs = route_legs(&sites, &settings).await?;
        write_legs(out, &legs)?;
        return Ok(());
    }

    let eps = args.eps.unwrap_or(settings.epsilon_km);
    let result = cluster_entities(&sites, eps);
    info!(
        "Found {} clusters and {} unclustered sites ({:?})",
        result.summary.cluster_count, result.summary.noise_count, result.strategy
    );
    for (i, cluster) in result.clusters.iter().enumerate() {
        info!(
            "Cluster {}: {} sites, {} (radius {:.2} km)",
            i,
            cluster.members.len(),
            cluster.area_label,
            cluster.radius_km
        );
    }

    let labels = build_labels(&sites, &result);
    write_labels(out, &sites, &labels, &result)?;
    Ok(())
}

/// Reads sites from CSV
///
/// Expected format: `id,latitude,longitude[,area]` (header row is optional).
/// Empty or unparseable coordinates are kept as absent so the site still shows
/// up as unclustered.
fn read_sites<R: Read>(reader: R) -> Result<Vec<Site>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sites = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() < 3 {
            continue;
        }

        let lat = record[1].parse::<f64>().ok();
        let lng = record[2].parse::<f64>().ok();
        // A first row with no numeric coordinates is a header
        if row == 0 && lat.is_none() && lng.is_none() {
            continue;
        }

        let area = record.get(3).filter(|a| !a.is_empty()).map(str::to_string);
        sites.push(Site {
            id: record[0].to_string(),
            lat,
            lng,
            area,
        });
    }

    Ok(sites)
}

/// `labels[i]` = cluster position for site i, or -1 for noise
///
/// Members are matched to sites by address, so two sites with equal fields
/// still get their own labels.
fn build_labels<'a>(sites: &'a [Site], result: &ClusterResult<'a, Site>) -> Vec<i32> {
    let mut labels = vec![NOISE_LABEL; sites.len()];
    for (c, cluster) in result.clusters.iter().enumerate() {
        for member in &cluster.members {
            if let Some(i) = sites.iter().position(|s| std::ptr::eq(s, *member)) {
                labels[i] = c as i32;
            }
        }
    }

    labels
}

fn write_labels<W: Write>(
    out: W,
    sites: &[Site],
    labels: &[i32],
    result: &ClusterResult<'_, Site>,
) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(["id", "cluster", "area_label"])?;
    for (site, &label) in sites.iter().zip(labels) {
        let area_label = usize::try_from(label)
            .ok()
            .and_then(|c| result.clusters.get(c))
            .map_or("", |cluster| cluster.area_label.as_str());
        let cluster = label.to_string();
        writer.write_record([site.id(), cluster.as_str(), area_label])?;
    }
    writer.flush()?;
    Ok(())
}

/// Travel legs along the sites that have coordinates, in input order
async fn route_legs(sites: &[Site], settings: &Settings) -> Result<Vec<(String, String, LegTime)>> {
    let token = std::env::var(ACCESS_TOKEN_ENV)
        .with_context(|| format!("{} must be set to compute travel legs", ACCESS_TOKEN_ENV))?;
    let provider = MapboxMatrixProvider::new(
        settings.matrix.base_url.clone(),
        token,
        settings.matrix.timeout(),
    )?;
    let cache = MatrixCache::with_clock(provider, SystemClock, settings.matrix.ttl());

    let stops: Vec<(&Site, Point)> = sites
        .iter()
        .filter_map(|s| s.point().map(|p| (s, p)))
        .collect();
    let points: Vec<Point> = stops.iter().map(|(_, p)| *p).collect();
    let options = MatrixOptions::with_profile(settings.matrix.profile);
    let legs = sequential_times_with(&cache, &points, &options).await;

    Ok(stops
        .windows(2)
        .zip(legs)
        .map(|(pair, leg)| (pair[0].0.id.clone(), pair[1].0.id.clone(), leg))
        .collect())
}

fn write_legs<W: Write>(out: W, legs: &[(String, String, LegTime)]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(["from", "to", "duration_sec", "distance_m"])?;
    for (from, to, leg) in legs {
        let duration = leg.duration_sec.to_string();
        let distance = leg.distance_m.to_string();
        writer.write_record([from.as_str(), to.as_str(), duration.as_str(), distance.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
