use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::slideshow::StartMode;

#[derive(Parser)]
#[command(name = "nbdeck")]
#[command(author, version, about)]
#[command(long_about = "Present Jupyter notebooks as animated slideshows.\n\n\
    Cells are grouped into slides, subslides and fragments from their\n\
    `slideshow.slide_type` metadata.\n\n\
    Examples:\n  \
    nbdeck talk.ipynb                  Open the notebook\n  \
    nbdeck talk.ipynb --start first    Present from the first cell\n  \
    nbdeck talk.ipynb --windowed       Present without going fullscreen\n  \
    nbdeck layout talk.ipynb           Print the slide structure")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Notebook (.ipynb) to open
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Do not request fullscreen when a slideshow starts
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start the slideshow immediately
    #[arg(long, value_enum, global = false)]
    pub start: Option<StartArg>,

    /// Select this cell when the notebook opens (0-indexed)
    #[arg(long, global = false)]
    pub cell: Option<usize>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print how a notebook's cells are grouped into slides
    Layout {
        /// Notebook (.ipynb) to inspect
        file: PathBuf,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.start_mode, defaults.transition)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StartArg {
    First,
    Current,
}

impl From<StartArg> for StartMode {
    fn from(arg: StartArg) -> Self {
        match arg {
            StartArg::First => StartMode::First,
            StartArg::Current => StartMode::Current,
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Layout { file }) => crate::commands::layout::run(&file),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("nbdeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    if !file.exists() {
                        anyhow::bail!("File not found: {}", file.display());
                    }
                    crate::app::run(crate::app::Options {
                        file,
                        windowed: self.windowed,
                        start: self.start.map(StartMode::from),
                        cell: self.cell,
                    })
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}
