use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::{NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};

use drovaan::config::DashboardConfig;
use drovaan::dashboard::{
    Dashboard, DashboardContent, DashboardRequest, DashboardView, DroneMode, PanelOutcome, ViewMode,
};
use drovaan::imagery::ImageryUrlBuilder;
use drovaan::logging::init_tracing;
use drovaan::models::{Location, SampleTelemetryPoint, ZoomLevel};
use drovaan::telemetry;
use drovaan::time_format::format_utc_timestamp;

#[derive(Debug, Parser)]
#[command(name = "drovaan", version, about = "Hyperlocal weather and atmospheric monitoring")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the dashboard for a city
    Dashboard {
        #[arg(long, default_value = drovaan::dashboard::DEFAULT_CITY)]
        city: String,

        /// navigator, atmospheric or about
        #[arg(long, default_value = "navigator")]
        view: ViewMode,

        /// Prediction date (YYYY-MM-DD); defaults to tomorrow
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Prediction time of day in UTC (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,

        /// off, conditions or history
        #[arg(long, default_value = "off")]
        drone: DroneMode,

        /// Imagery zoom level, 0-6
        #[arg(long, value_parser = parse_zoom)]
        zoom: Option<ZoomLevel>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the satellite imagery URL for a coordinate
    Imagery {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        #[arg(long, value_parser = parse_zoom)]
        zoom: Option<ZoomLevel>,
    },

    /// Convert a UTC timestamp (YYYY-MM-DDTHH:MM:SSZ) to the display timezone
    FormatTime {
        timestamp: String,

        /// IANA timezone, overrides the configured one
        #[arg(long)]
        tz: Option<String>,
    },

    /// Print sample drone telemetry
    Telemetry {
        #[arg(long)]
        samples: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn parse_zoom(raw: &str) -> Result<ZoomLevel, String> {
    let level: u8 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a zoom level"))?;
    ZoomLevel::try_from(level).map_err(|e| e.to_string())
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    drovaan::api::parse_time_of_day(raw).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = DashboardConfig::load_from_path(self.config.clone())?;
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        init_tracing(&config.logging);

        match self.command {
            Command::Dashboard {
                city,
                view,
                date,
                time,
                drone,
                zoom,
                json,
            } => {
                let now = Utc::now();
                let mut request = DashboardRequest::new(now.date_naive());
                request.view = view;
                request.city = city;
                request.drone = drone;
                request.zoom = zoom;
                if let Some(date) = date {
                    request.prediction_date = date;
                }
                if let Some(time) = time {
                    request.prediction_time = time;
                }

                let dashboard = Dashboard::from_config(&config)?;
                let view = match dashboard.render(&request, now).await {
                    Ok(view) => view,
                    Err(err) => {
                        tracing::debug!("Render failed: {:?}", err);
                        bail!("{}", err.user_message());
                    }
                };

                if json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    print!("{}", render_text(&view));
                }
            }
            Command::Imagery { lat, lon, zoom } => {
                let location = Location::try_new(lat, lon, String::new())?;
                let builder = ImageryUrlBuilder::new(&config.imagery);
                println!("{}", builder.url_for(&location, zoom.unwrap_or_default(), Utc::now()));
            }
            Command::FormatTime { timestamp, tz } => {
                let tz: Tz = match tz {
                    Some(name) => name
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Unknown timezone '{name}'"))?,
                    None => config.display.tz(),
                };
                println!("{}", format_utc_timestamp(Some(&timestamp), tz));
            }
            Command::Telemetry { samples, json } => {
                let samples = telemetry::generate(
                    samples.unwrap_or(config.telemetry.samples),
                    Utc::now(),
                )?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&samples)?);
                } else {
                    print!("{}", render_samples(&samples));
                }
            }
            Command::Serve { host, port } => {
                drovaan::web::run(&config, &host, port)
                    .await
                    .context("Server exited")?;
            }
        }

        Ok(())
    }
}

fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    if let Some(location) = &view.location {
        let _ = writeln!(out, "{} ({})\n", location.name, location.format_coordinates());
    }

    match &view.content {
        DashboardContent::About { text } => {
            let _ = writeln!(out, "{text}");
        }
        DashboardContent::DroneConditions { latest } => {
            let _ = writeln!(out, "Current Drone Conditions");
            match latest {
                Some(point) => {
                    let _ = writeln!(out, "  Temperature  {}", point.format_temperature());
                    let _ = writeln!(out, "  Humidity     {}", point.format_humidity());
                }
                None => {
                    let _ = writeln!(out, "  No samples");
                }
            }
        }
        DashboardContent::DroneHistory { samples } => {
            let _ = writeln!(out, "Drone Data History");
            out.push_str(&render_samples(samples));
        }
        DashboardContent::Navigator {
            live,
            forecast,
            prediction_time,
        } => {
            render_panel(&mut out, "Live Weather Data", live);
            let title = format!(
                "Weather Forecast for {}",
                prediction_time.format("%Y-%m-%d %H:%M UTC")
            );
            render_panel(&mut out, &title, forecast);
        }
        DashboardContent::Atmospheric {
            zoom, imagery_url, ..
        } => {
            let _ = writeln!(out, "Satellite imagery (zoom {zoom})");
            let _ = writeln!(out, "{imagery_url}");
        }
    }
    out
}

fn render_panel(out: &mut String, title: &str, outcome: &PanelOutcome) {
    let _ = writeln!(out, "{title}");
    match outcome {
        PanelOutcome::Ready(panel) => {
            for row in &panel.rows {
                let _ = writeln!(out, "  {:<14}{}", row.label, row.value);
            }
        }
        PanelOutcome::Omitted { message, .. } => {
            let _ = writeln!(out, "  unavailable: {message}");
        }
    }
    out.push('\n');
}

fn render_samples(samples: &[SampleTelemetryPoint]) -> String {
    let mut out = String::new();
    for point in samples {
        let _ = writeln!(
            out,
            "{}  {:>9}  {:>8}",
            point.timestamp.format("%Y-%m-%d %H:%M:%S"),
            point.format_temperature(),
            point.format_humidity()
        );
    }
    out
}
