//! Pseudo-yolk assembler and bytecode decompiler CLI.
//!
//! # Usage
//! ```text
//! yolk [OPTIONS] compile <input> [-o <output>]
//! yolk [OPTIONS] decompile <input> [-o <output>]
//! ```
//!
//! # Examples
//! ```text
//! yolk compile program.psuedoyolk
//! yolk compile program.psuedoyolk -o program.yolk
//! yolk -v decompile program.yolk -o program.psuedoyolk
//! ```

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use yolk::bytecode::assembler::compile_file;
use yolk::bytecode::errors::ToolError;
use yolk::bytecode::program::decompile_file;
use yolk::error;
use yolk::utils::log::{self, ColorMode, Level, LogConfig};

const DEFAULT_BYTECODE_OUTPUT: &str = "output.yolk";
const DEFAULT_TEXT_OUTPUT: &str = "output.psuedoyolk";

#[derive(Parser, Debug)]
#[command(
    name = "yolk",
    version,
    about = "Compile pseudo-yolk text into yolk bytecode and back"
)]
struct Cli {
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        long_help = "Only log errors."
    )]
    quiet: bool,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::SetTrue,
        long_help = "Log debug details about each pass."
    )]
    verbose: bool,
    #[arg(
        long = "no-timestamps",
        action = ArgAction::SetTrue,
        long_help = "Omit timestamps from log lines."
    )]
    no_timestamps: bool,
    #[arg(
        long = "color",
        value_enum,
        default_value_t = ColorArg::Auto,
        long_help = "Colour log output: auto detects a terminal."
    )]
    color: ColorArg,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a pseudo-yolk file into bytecode.
    Compile {
        /// Pseudo-yolk source file.
        input: PathBuf,
        #[arg(short = 'o', long = "output", default_value = DEFAULT_BYTECODE_OUTPUT)]
        output: PathBuf,
    },
    /// Render a bytecode file as pseudo-yolk.
    Decompile {
        /// Yolk bytecode file.
        input: PathBuf,
        #[arg(short = 'o', long = "output", default_value = DEFAULT_TEXT_OUTPUT)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum ColorArg {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorMode::Auto,
            ColorArg::Always => ColorMode::Always,
            ColorArg::Never => ColorMode::Never,
        }
    }
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let min_level = if self.quiet {
            Level::Error
        } else if self.verbose {
            Level::Debug
        } else {
            Level::Info
        };
        LogConfig {
            min_level,
            show_timestamp: !self.no_timestamps,
            color: self.color.into(),
        }
    }
}

fn run(command: Command) -> Result<(), ToolError> {
    match command {
        Command::Compile { input, output } => compile_file(&input, &output).map(drop),
        Command::Decompile { input, output } => decompile_file(&input, &output).map(drop),
    }
}

fn main() {
    let cli = Cli::parse();
    log::configure(cli.log_config());

    match run(cli.command) {
        Ok(()) => {}
        // Diagnostics were already logged by the assembler.
        Err(ToolError::CompilationFailed { .. }) => process::exit(1),
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    }
}
