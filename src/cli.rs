use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "pitstop", version, about = "Book a car repair slot from the terminal")]
pub struct Args {
    /// Stations endpoint URL (overrides the config file)
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Use the built-in stations even if an endpoint is configured
    #[arg(long)]
    pub mock: bool,

    /// Preselect a car type (e.g., "Toyota Camry")
    #[arg(short, long)]
    pub car_type: Option<String>,

    /// Preselect a repair service (e.g., "Oil Change")
    #[arg(short, long)]
    pub service: Option<String>,
}
