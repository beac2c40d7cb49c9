use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "opsmap-app")]
#[command(about = "Operations map console for field workers, clients and competitors")]
#[command(version)]
pub struct Args {
    // Data
    /// JSON file with entity sources, or a plain array of markers
    #[arg(long)]
    pub entities: Option<PathBuf>,

    /// JSON file with GPS analysis and route optimization summaries
    #[arg(long)]
    pub analytics: Option<PathBuf>,

    /// JSON file with the map configuration (default center, zoom, regions)
    #[arg(long)]
    pub config: Option<PathBuf>,

    // Display
    /// Show the GPS analysis overlay on start
    #[arg(long)]
    pub gps_overlay: bool,

    /// Show the route optimization overlay on start
    #[arg(long)]
    pub route_overlay: bool,

    /// Hide the zoom controls
    #[arg(long)]
    pub no_controls: bool,
}
