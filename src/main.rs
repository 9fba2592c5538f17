//! Fog of War mission tool CLI.

use clap::{Parser, Subcommand};
use fow_mission::config::{PlotConfig, WeatherSettings, DEFAULT_PLOT_HEIGHT, DEFAULT_PLOT_WIDTH};
use fow_mission::mission::MissionDocument;
use fow_mission::plot::{load_routes, render_routes, routes_from_document};
use fow_mission::report::{write_json_report, MissionSummary};
use fow_mission::sampler::WeightedSampler;
use fow_mission::util::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fow-mission")]
#[command(about = "Fog of War: randomize mission weather, inspect missions, plot routes")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw cloud type and height from a weight table and write <mission>-fow.mis.
    Randomize {
        #[arg(long, value_name = "PATH")]
        mission: PathBuf,
        #[arg(
            long,
            value_name = "PATH",
            help = "Weight table (.fow/.json or .toml); built-in weights are used if missing or invalid"
        )]
        settings: Option<PathBuf>,
        #[arg(long, help = "Seed for reproducible draws")]
        seed: Option<u64>,
        #[arg(long, value_name = "PATH", help = "Write here instead of <mission>-fow.mis")]
        out: Option<PathBuf>,
    },
    /// Print the typed view of a mission.
    Inspect {
        #[arg(long, value_name = "PATH")]
        mission: PathBuf,
        #[arg(long, value_name = "PATH", help = "Also write a JSON summary")]
        json: Option<PathBuf>,
    },
    /// Draw flight routes from a mission's wings or a route file.
    Plot {
        #[arg(long, value_name = "PATH", conflicts_with = "routes", required_unless_present = "routes")]
        mission: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        routes: Option<PathBuf>,
        #[arg(long, value_name = "IMAGE", default_value = "routes.png")]
        out: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PLOT_WIDTH)]
        width: u32,
        #[arg(long, default_value_t = DEFAULT_PLOT_HEIGHT)]
        height: u32,
    },
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Randomize {
            mission,
            settings,
            seed,
            out,
        } => run_randomize(mission, settings, seed, out),
        Commands::Inspect { mission, json } => run_inspect(mission, json),
        Commands::Plot {
            mission,
            routes,
            out,
            width,
            height,
        } => run_plot(
            mission,
            routes,
            out,
            PlotConfig {
                width,
                height,
                ..PlotConfig::default()
            },
        ),
    }
}

fn load_settings(path: Option<PathBuf>) -> WeatherSettings {
    let Some(path) = path else {
        tracing::info!("no settings file given; using built-in weights");
        return WeatherSettings::default();
    };
    let load = WeatherSettings::load_or_default(&path);
    if let Some(e) = &load.fallback {
        tracing::warn!("{}; using built-in weights", e);
    }
    load.settings
}

fn run_randomize(
    mission: PathBuf,
    settings: Option<PathBuf>,
    seed: Option<u64>,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let mut doc = MissionDocument::load(&mission).map_err(|e| e.to_string())?;
    println!("Cloud Type: {}", display_opt(doc.cloud_type()));
    println!("Cloud Height: {}", display_opt(doc.cloud_height()));

    let settings = load_settings(settings);
    let (mut types, mut heights) = match seed {
        Some(s) => (
            WeightedSampler::seeded(s),
            WeightedSampler::seeded(s.wrapping_add(1)),
        ),
        None => (WeightedSampler::from_entropy(), WeightedSampler::from_entropy()),
    };
    types.load(settings.cloud_type_weights);
    heights.load(settings.cloud_height_weights);

    let cloud_type = types.sample().map_err(|e| format!("cloud type: {}", e))?;
    let cloud_height = heights.sample().map_err(|e| format!("cloud height: {}", e))?;
    doc.set_cloud_type(cloud_type);
    doc.set_cloud_height(cloud_height);
    println!("Cloud Type: {}", cloud_type);
    println!("Cloud Height: {}", cloud_height);

    let written = match out {
        Some(path) => doc.save_to(&path).map(|_| path),
        None => doc.save(),
    }
    .map_err(|e| e.to_string())?;
    println!("Wrote {}", written.display());
    Ok(())
}

fn run_inspect(mission: PathBuf, json: Option<PathBuf>) -> Result<(), String> {
    let doc = MissionDocument::load(&mission).map_err(|e| e.to_string())?;
    let f = doc.fields();
    println!("Mission: {}", mission.display());
    println!("Map: {}", f.map.as_deref().unwrap_or("—"));
    println!("Time: {}", display_opt(f.time));
    println!(
        "Clouds: type={} height={}",
        display_opt(f.cloud_type),
        display_opt(f.cloud_height)
    );
    println!(
        "Season: {}-{}-{}",
        display_opt(f.year),
        display_opt(f.month),
        display_opt(f.day)
    );
    println!(
        "Wind: dir={} speed={} gust={} turbulence={}",
        display_opt(f.wind_direction),
        display_opt(f.wind_speed),
        display_opt(f.gust),
        display_opt(f.turbulence)
    );
    println!("\nWings:");
    for w in doc.wings() {
        println!(
            "  {}  class={}  planes={}  fuel={}  skills={:?}  waypoints={}",
            w.name,
            w.class.as_deref().unwrap_or("—"),
            w.planes,
            w.fuel,
            w.skills,
            w.waypoints.len()
        );
        for wp in &w.waypoints {
            println!(
                "    {}  x={} y={} alt={} speed={}{}",
                wp.kind,
                wp.x,
                wp.y,
                wp.altitude,
                wp.speed,
                wp.target
                    .as_deref()
                    .map(|t| format!("  target={}", t))
                    .unwrap_or_default()
            );
        }
    }
    if doc.wings().is_empty() {
        println!("  None");
    }

    if let Some(path) = json {
        write_json_report(&MissionSummary::from_document(&doc), &path)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_plot(
    mission: Option<PathBuf>,
    routes: Option<PathBuf>,
    out: PathBuf,
    cfg: PlotConfig,
) -> Result<(), String> {
    let routes = match (mission, routes) {
        (Some(m), _) => {
            let doc = MissionDocument::load(&m).map_err(|e| e.to_string())?;
            routes_from_document(&doc)
        }
        (None, Some(r)) => load_routes(&r).map_err(|e| e.to_string())?,
        (None, None) => return Err("provide --mission or --routes".to_string()),
    };
    let drawn = render_routes(&routes, &cfg, &out).map_err(|e| e.to_string())?;
    println!("Flight path image generated: {} ({} route(s))", out.display(), drawn);
    Ok(())
}

fn display_opt<T: std::fmt::Display>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "—".to_string())
}
