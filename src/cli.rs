use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Monitor the selected programs until interrupted (default)
    Run {
        /// Extra program to monitor for this session; repeatable
        #[arg(short = 'p', long = "program", value_name = "NAME")]
        programs: Vec<String>,
    },
    /// List common applications and whether they are running
    Apps,
    /// Print the resolved settings as JSON
    Config,
}
