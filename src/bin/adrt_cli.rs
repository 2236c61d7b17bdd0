use std::fs::File;
use std::ops::Bound;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ndarray::{ArrayD, ArrayViewD};

use adrt_core::{
    load_npy, quadrant_mean, save_npy, stitch_adrt, truncate, unstitch_adrt, AdrtConfig, AdrtScalar, FmgSummary,
    NpyArray, StepEngine,
};

/// ADRT command-line front-end.
///
/// Every subcommand reads one `.npy` array (float32 or float64) and writes
/// one `.npy` array of the same element type.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run every plane on the calling thread
    #[arg(long, global = true)]
    no_threads: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Forward transform of an image (B?, N, N)
    Forward(Io),
    /// Backprojection of an ADRT array over a range of levels
    Backproject {
        #[command(flatten)]
        io: Io,
        #[command(flatten)]
        levels: Levels,
    },
    /// Exact inverse of a forward output
    Inverse {
        #[command(flatten)]
        io: Io,
        #[command(flatten)]
        levels: Levels,
        /// Average the quadrants back into an image
        #[arg(long)]
        collapse: bool,
    },
    /// Multigrid approximate inverse of a single ADRT array
    Fmg {
        #[command(flatten)]
        io: Io,
        /// Maximum number of multigrid steps (overrides the config file)
        #[arg(long)]
        max_iters: Option<usize>,
        /// Write a JSON summary of the iteration here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Align the four quadrants into one image
    Stitch {
        #[command(flatten)]
        io: Io,
        /// Drop the column each quadrant shares with its neighbor
        #[arg(long)]
        remove_repeated: bool,
    },
    /// Split a stitched image back into quadrants
    Unstitch(Io),
    /// Undo the quadrant embedding, giving (B?, 4, N, N)
    Truncate(Io),
}

#[derive(clap::Args, Debug)]
struct Io {
    /// Input .npy file
    #[arg(long)]
    input: PathBuf,

    /// Output .npy file
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args, Debug)]
struct Levels {
    /// First level to apply
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Level to stop before (default: all remaining levels)
    #[arg(long)]
    end: Option<usize>,
}

impl Levels {
    fn bounds(&self) -> (Bound<usize>, Bound<usize>) {
        (
            Bound::Included(self.start),
            self.end.map_or(Bound::Unbounded, Bound::Excluded),
        )
    }
}

impl Command {
    fn io(&self) -> &Io {
        match self {
            Command::Forward(io) | Command::Unstitch(io) | Command::Truncate(io) => io,
            Command::Backproject { io, .. }
            | Command::Inverse { io, .. }
            | Command::Fmg { io, .. }
            | Command::Stitch { io, .. } => io,
        }
    }
}

fn apply<T: AdrtScalar>(
    engine: &StepEngine,
    config: &AdrtConfig,
    command: &Command,
    a: ArrayViewD<'_, T>,
) -> adrt_core::Result<(ArrayD<T>, Option<FmgSummary>)> {
    let out = match command {
        Command::Forward(_) => engine.adrt(a)?,
        Command::Backproject { levels, .. } => engine.bdrt(a, levels.bounds())?,
        Command::Inverse {
            levels, collapse, ..
        } => {
            let inv = engine.iadrt(a, levels.bounds())?;
            if *collapse {
                quadrant_mean(&inv)?
            } else {
                inv
            }
        }
        Command::Fmg { max_iters, .. } => {
            let report = engine.iadrt_fmg(a, max_iters.or(config.fmg.max_iters))?;
            let summary = report.summary();
            return Ok((report.estimate, Some(summary)));
        }
        Command::Stitch {
            remove_repeated, ..
        } => stitch_adrt(a, *remove_repeated)?,
        Command::Unstitch(_) => unstitch_adrt(a)?,
        Command::Truncate(_) => truncate(a)?,
    };
    Ok((out, None))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // --- Configuration ---
    let mut config = match &args.config {
        Some(path) => AdrtConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => AdrtConfig::default(),
    };
    if args.no_threads {
        config.threading = false;
    }
    let engine = StepEngine::from_config(&config);

    // --- Load input ---
    let io = args.command.io();
    let input = load_npy(&io.input).with_context(|| format!("Failed to read input NPY {:?}", io.input))?;

    println!(
        "Running {:?} on {} array of shape {:?} (threading = {})",
        args.command,
        input.dtype(),
        input.shape(),
        engine.threading_enabled()
    );

    // --- Run ---
    let (output, summary) = match &input {
        NpyArray::F32(a) => {
            let (out, summary) = apply(&engine, &config, &args.command, a.view())?;
            (NpyArray::F32(out), summary)
        }
        NpyArray::F64(a) => {
            let (out, summary) = apply(&engine, &config, &args.command, a.view())?;
            (NpyArray::F64(out), summary)
        }
    };

    // --- Save ---
    save_npy(&io.output, &output).with_context(|| format!("Failed to write output NPY {:?}", io.output))?;
    println!("Result of shape {:?} written to {:?}", output.shape(), io.output);

    if let Some(summary) = summary {
        println!(
            "FMG took {} steps, residual = {:.6e}",
            summary.steps, summary.residual
        );
        if let Command::Fmg {
            report: Some(path), ..
        } = &args.command
        {
            let file = File::create(path).with_context(|| format!("Failed to create report {:?}", path))?;
            serde_json::to_writer_pretty(file, &summary)
                .with_context(|| format!("Failed to write report {:?}", path))?;
            println!("FMG report written to {:?}", path);
        }
    }

    Ok(())
}
