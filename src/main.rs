use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, LevelFilter};

use particle_sizer::cli::{run_script, CliArgs};
use particle_sizer::controller::Controller;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    let params = args.parameters()?;
    let mut controller = Controller::new(params);
    controller
        .load_path(&args.image)
        .with_context(|| format!("loading {}", args.image.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = match &args.events {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening event script {}", path.display()))?;
            run_script(&mut controller, BufReader::new(file), &mut out)?
        }
        None => run_script(&mut controller, io::stdin().lock(), &mut out)?,
    };
    drop(out);
    log::debug!("{summary:?}");

    if let Some(path) = &args.output {
        controller
            .export_csv(path)
            .with_context(|| format!("exporting {}", path.display()))?;
    }
    if let Some(path) = &args.preview {
        controller
            .preview()?
            .save(path)
            .with_context(|| format!("saving preview {}", path.display()))?;
    }

    println!("{}", controller.status_line());
    Ok(())
}
