use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "incident-map", version, about = "Terminal map of official layers and community incident reports")]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the dataset directory
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Load the datasets, print a summary and exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless summary as JSON
    #[arg(long, requires = "headless")]
    pub json: bool,

    /// Log file used while the map UI owns the terminal
    #[arg(long = "log-file", value_name = "PATH", default_value = "incident-map.log")]
    pub log_file: PathBuf,

    /// Do not draw the severity chart panel
    #[arg(long = "no-chart")]
    pub no_chart: bool,
}

impl CliArgs {
    /// Flags take precedence over the config file
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.no_chart {
            config.show_chart = false;
        }
    }
}
