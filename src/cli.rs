// ============================================================================
// particle-sizer CLI: headless driver for the selection core
// ============================================================================
//
// Usage examples:
//   particle-sizer --image grains.tif --events picks.txt --output sizes.csv
//   particle-sizer -i grains.png -t 90 -b 3 --preview overlay.png < picks.txt
//
// Event scripts hold one command per line; `#` starts a comment:
//   threshold 90
//   blur 3
//   start
//   click 120 44
//   click-canvas 800 600 412 230
//   commit
//   report
//   export sizes.csv

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use thiserror::Error;

use crate::controller::{Controller, Event, ParameterChange};
use crate::error::{AnalysisError, Outcome};
use crate::filters::BorderMode;
use crate::preprocess::{Parameters, DEFAULT_BLUR_RADIUS, DEFAULT_THRESHOLD};
use crate::selection::Connectivity;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Interactive particle sizing for grayscale micrographs.
///
/// Binarize an image, pick particles by flood fill and export their
/// equivalent circular diameters.
#[derive(Parser, Debug)]
#[command(name = "particle-sizer", version)]
pub struct CliArgs {
    /// Input image (JPEG, PNG or TIFF), converted to grayscale.
    #[arg(short, long, value_name = "FILE")]
    pub image: PathBuf,

    /// Binarization threshold; pixels >= threshold are foreground.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: u8,

    /// Gaussian blur radius (kernel size 2r+1).
    #[arg(short, long, default_value_t = DEFAULT_BLUR_RADIUS,
          value_parser = clap::value_parser!(u8).range(1..=21))]
    pub blur: u8,

    /// Border handling for the blur.
    #[arg(long, value_enum, default_value_t = BorderArg::Zero)]
    pub border: BorderArg,

    /// Flood fill neighborhood.
    #[arg(long, value_enum, default_value_t = ConnectivityArg::Four)]
    pub connectivity: ConnectivityArg,

    /// Event script to replay. Reads events from stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Write the CSV results here once all events are processed.
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Write an overlay preview PNG once all events are processed.
    #[arg(short, long, value_name = "PNG")]
    pub preview: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BorderArg {
    Zero,
    Reflect101,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConnectivityArg {
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

impl CliArgs {
    /// Parameters described by the command line.
    pub fn parameters(&self) -> Result<Parameters, AnalysisError> {
        let mut params = Parameters::new(self.threshold as i64, self.blur as i64)?;
        params.border = match self.border {
            BorderArg::Zero => BorderMode::Zero,
            BorderArg::Reflect101 => BorderMode::Reflect101,
        };
        params.connectivity = match self.connectivity {
            ConnectivityArg::Four => Connectivity::Four,
            ConnectivityArg::Eight => Connectivity::Eight,
        };
        Ok(params)
    }
}

// ============================================================================
// Event scripts
// ============================================================================

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(Event),
    /// Click at (x, y) on a canvas of the given size showing the fitted image.
    CanvasClick {
        canvas_width: usize,
        canvas_height: usize,
        x: usize,
        y: usize,
    },
    Report,
    Export(PathBuf),
    Preview(PathBuf),
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("reading events: {0}")]
    Read(#[from] std::io::Error),
}

/// Parse one script line. Blank lines and comments yield `None`.
pub fn parse_command(text: &str, line: usize) -> Result<Option<Command>, ScriptError> {
    let text = text.split('#').next().unwrap_or("").trim();
    if text.is_empty() {
        return Ok(None);
    }

    let err = |message: String| ScriptError::Parse { line, message };
    let mut parts = text.split_whitespace();
    let keyword = parts.next().unwrap_or("").to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let int = |s: &str| -> Result<i64, ScriptError> {
        s.parse::<i64>()
            .map_err(|_| err(format!("expected an integer, got '{s}'")))
    };
    let expect_args = |n: usize| -> Result<(), ScriptError> {
        if args.len() != n {
            return Err(err(format!(
                "'{keyword}' takes {n} argument(s), got {}",
                args.len()
            )));
        }
        Ok(())
    };

    let command = match keyword.as_str() {
        "threshold" => {
            expect_args(1)?;
            Command::Event(Event::ParameterChanged(ParameterChange::Threshold(int(args[0])?)))
        }
        "blur" => {
            expect_args(1)?;
            Command::Event(Event::ParameterChanged(ParameterChange::BlurRadius(int(args[0])?)))
        }
        "start" => {
            expect_args(0)?;
            Command::Event(Event::StartRound)
        }
        "click" => {
            expect_args(2)?;
            let (x, y) = (int(args[0])?, int(args[1])?);
            if x < 0 || y < 0 {
                return Err(err(format!("click coordinates must be non-negative, got ({x}, {y})")));
            }
            Command::Event(Event::Clicked {
                x: x as usize,
                y: y as usize,
            })
        }
        "click-canvas" => {
            expect_args(4)?;
            let mut values = [0usize; 4];
            for (v, arg) in values.iter_mut().zip(&args) {
                let n = int(*arg)?;
                if n < 0 {
                    return Err(err(format!("click-canvas values must be non-negative, got {n}")));
                }
                *v = n as usize;
            }
            let [canvas_width, canvas_height, x, y] = values;
            Command::CanvasClick {
                canvas_width,
                canvas_height,
                x,
                y,
            }
        }
        "commit" => {
            expect_args(0)?;
            Command::Event(Event::CommitRequested)
        }
        "discard" => {
            expect_args(0)?;
            Command::Event(Event::DiscardRequested)
        }
        "report" => {
            expect_args(0)?;
            Command::Report
        }
        "export" => {
            expect_args(1)?;
            Command::Export(PathBuf::from(args[0]))
        }
        "preview" => {
            expect_args(1)?;
            Command::Preview(PathBuf::from(args[0]))
        }
        other => return Err(err(format!("unknown command '{other}'"))),
    };
    Ok(Some(command))
}

/// Run every command from `reader` against `controller`, echoing outcomes to
/// `out`. Rejections and failed commands are reported and the script goes on;
/// malformed lines and read errors stop it.
pub fn run_script<R: BufRead, W: Write>(
    controller: &mut Controller,
    reader: R,
    out: &mut W,
) -> Result<ScriptSummary, ScriptError> {
    let mut summary = ScriptSummary::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(command) = parse_command(&line, i + 1)? else {
            continue;
        };
        summary.commands += 1;

        match command {
            Command::Event(event) => {
                let outcome = controller.dispatch(event);
                summary.record(&outcome);
                writeln!(out, "{}: {} | {}", i + 1, outcome, controller.status_line())?;
            }
            Command::CanvasClick {
                canvas_width,
                canvas_height,
                x,
                y,
            } => {
                let outcome = controller.click_canvas(canvas_width, canvas_height, x as f64, y as f64);
                summary.record(&outcome);
                writeln!(out, "{}: {} | {}", i + 1, outcome, controller.status_line())?;
            }
            Command::Report => match controller.report() {
                Ok(report) => write!(out, "{report}")?,
                Err(e) => {
                    summary.failed += 1;
                    writeln!(out, "{}: {e}", i + 1)?;
                }
            },
            Command::Export(path) => match controller.export_csv(&path) {
                Ok(()) => writeln!(out, "{}: results saved to {}", i + 1, path.display())?,
                Err(e) => {
                    summary.failed += 1;
                    warn!("export failed: {e}");
                    writeln!(out, "{}: {e}", i + 1)?;
                }
            },
            Command::Preview(path) => {
                let saved = controller
                    .preview()
                    .and_then(|img| img.save(&path).map_err(AnalysisError::from));
                match saved {
                    Ok(()) => writeln!(out, "{}: preview saved to {}", i + 1, path.display())?,
                    Err(e) => {
                        summary.failed += 1;
                        writeln!(out, "{}: {e}", i + 1)?;
                    }
                }
            }
        }
    }

    info!(
        "script done: {} command(s), {} rejected, {} failed",
        summary.commands, summary.rejected, summary.failed
    );
    Ok(summary)
}

/// Counters gathered while running a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub commands: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl ScriptSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Selected { .. } | Outcome::Applied { .. } => {}
            Outcome::Rejected(_) => self.rejected += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejection;
    use ndarray::Array2;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("", 1).unwrap(), None);
        assert_eq!(parse_command("   # only a comment", 1).unwrap(), None);
        assert_eq!(
            parse_command("click 3 4  # particle A", 1).unwrap(),
            Some(Command::Event(Event::Clicked { x: 3, y: 4 }))
        );
        assert_eq!(
            parse_command("THRESHOLD 90", 1).unwrap(),
            Some(Command::Event(Event::ParameterChanged(ParameterChange::Threshold(90))))
        );
        assert_eq!(
            parse_command("export out.csv", 1).unwrap(),
            Some(Command::Export(PathBuf::from("out.csv")))
        );
        assert_eq!(parse_command("commit", 1).unwrap(), Some(Command::Event(Event::CommitRequested)));
        assert_eq!(
            parse_command("click-canvas 800 600 412 230", 1).unwrap(),
            Some(Command::CanvasClick {
                canvas_width: 800,
                canvas_height: 600,
                x: 412,
                y: 230,
            })
        );
        assert!(parse_command("click-canvas 800 600 -1 230", 1).is_err());
        assert!(parse_command("click-canvas 800 600", 1).is_err());
    }

    #[test]
    fn test_run_script_canvas_clicks() {
        let image = Array2::from_shape_fn((8, 8), |(y, x)| if x < 3 && y < 3 { 255u8 } else { 0 });
        let mut controller = Controller::new(Parameters::new(128, 1).unwrap());
        controller.load_image(image);

        // 8x8 image drawn 80x80 at x = 10..90 on a 100x80 canvas
        let script = "\
start
click-canvas 100 80 25 15
click-canvas 100 80 5 15    # left of the image
commit
";
        let mut out = Vec::new();
        let summary = run_script(&mut controller, script.as_bytes(), &mut out).unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(controller.total_count(), 1);
        assert!(controller.session().unwrap().claimed_mask().is_set(1, 1));
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse_command("click 3", 7).unwrap_err();
        assert_eq!(err.to_string(), "line 7: 'click' takes 2 argument(s), got 1");

        let err = parse_command("blur wide", 2).unwrap_err();
        assert_eq!(err.to_string(), "line 2: expected an integer, got 'wide'");

        let err = parse_command("undo", 3).unwrap_err();
        assert_eq!(err.to_string(), "line 3: unknown command 'undo'");

        assert!(parse_command("click -1 4", 4).is_err());
    }

    #[test]
    fn test_run_script_counts_outcomes() {
        let image = Array2::from_shape_fn((8, 8), |(y, x)| if x < 3 && y < 3 { 255u8 } else { 0 });
        let mut controller = Controller::new(Parameters::new(128, 1).unwrap());
        controller.load_image(image);

        let script = "\
start
click 1 1
click 0 0   # same blob, overlaps
commit
click 5 5   # no round
report
";
        let mut out = Vec::new();
        let summary = run_script(&mut controller, script.as_bytes(), &mut out).unwrap();
        assert_eq!(summary.commands, 6);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(controller.total_count(), 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&Rejection::Overlap.to_string()));
        assert!(text.contains("Total count: 1"));
    }

    #[test]
    fn test_run_script_stops_on_parse_error() {
        let mut controller = Controller::default();
        let mut out = Vec::new();
        let err = run_script(&mut controller, "start\nfrobnicate\n".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, ScriptError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_cli_args_parse() {
        let args = CliArgs::try_parse_from([
            "particle-sizer",
            "--image",
            "a.png",
            "-t",
            "90",
            "--blur",
            "3",
            "--connectivity",
            "8",
            "--border",
            "reflect101",
        ])
        .unwrap();
        let params = args.parameters().unwrap();
        assert_eq!(params.threshold(), 90);
        assert_eq!(params.blur_radius(), 3);
        assert_eq!(params.connectivity, Connectivity::Eight);
        assert_eq!(params.border, BorderMode::Reflect101);

        assert!(CliArgs::try_parse_from(["particle-sizer", "-i", "a.png", "--blur", "22"]).is_err());
    }
}
