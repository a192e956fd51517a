use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cruise_core::utils::controllers::{parse_command, CycleOutput, RegulatorGains};
use cruise_core::utils::{SystemController, KI, KP};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// JSON-lines command trace (defaults to stdin)
    #[clap(long)]
    input: Option<PathBuf>,
    /// proportional gain
    #[clap(long, default_value_t = KP)]
    kp: f32,
    /// integral gain
    #[clap(long, default_value_t = KI)]
    ki: f32,
    /// abort on the first malformed line instead of skipping it
    #[clap(long)]
    strict: bool,
}

#[derive(Serialize)]
struct Record
{
    cycle: u64,
    #[serde(flatten)]
    output: CycleOutput,
}

fn open_trace(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("opening trace {}", p.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn replay(
    reader: impl BufRead,
    strict: bool,
    ctrl: &mut SystemController,
    out: &mut impl Write,
) -> Result<()> {
    for (n, line) in reader.lines().enumerate() {
        let line = line.context("reading trace")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let cmd = match parse_command(trimmed.as_bytes()) {
            Ok(cmd) => cmd,
            Err(e) if strict => {
                return Err(anyhow!("malformed cruise command at column {}", e.column()))
                    .with_context(|| format!("line {}", n + 1));
            }
            Err(e) => {
                error!(line = n + 1, column = e.column(), "skipping malformed cruise command");
                continue;
            }
        };

        let cycle = ctrl.cycles();
        if let Some(output) = ctrl.execute_command(cmd) {
            if output.throttle_command.is_nan() {
                warn!(cycle, "regulator produced NaN throttle");
            }
            serde_json::to_writer(&mut *out, &Record { cycle, output })
                .context("encoding cycle output")?;
            writeln!(out).context("writing cycle output")?;
        }
    }
    out.flush().context("flushing output")?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts: Opts = Opts::parse();
    let mut ctrl = SystemController::new(Some(RegulatorGains {
        kp: opts.kp,
        ki: opts.ki,
    }));

    info!("Replaying cruise trace");
    let reader = open_trace(opts.input.as_ref())?;
    let stdout = io::stdout();
    replay(reader, opts.strict, &mut ctrl, &mut stdout.lock())?;
    info!(cycles = ctrl.cycles(), "Trace complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE: &str = r#"{"cc":"cycle","enable":false,"cruise_speed":1,"vehicle_speed":0}"#;

    fn records(out: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_replay_skips_comments_and_bad_lines() {
        let trace = format!("\n# comment\n{{\"cc\":\"bad\"}}\n{CYCLE}\n{{\"cc\":\"reset\"}}\n{CYCLE}\n");
        let mut ctrl = SystemController::new(None);
        let mut out = Vec::new();
        replay(trace.as_bytes(), false, &mut ctrl, &mut out).unwrap();

        let recs = records(&out);
        assert_eq!(recs.len(), 2);
        // Numbering keeps running across the reset.
        assert_eq!(recs[0]["cycle"], 0);
        assert_eq!(recs[1]["cycle"], 1);
        for rec in &recs {
            let t = rec["throttle_command"].as_f64().unwrap();
            assert!((t - 8.113).abs() < 1e-4, "throttle {}", t);
            assert_eq!(rec["saturated"], false);
            assert_eq!(rec["integral_term"], 0.0);
        }
        assert_eq!(ctrl.cycles(), 2);
    }

    #[test]
    fn test_strict_replay_stops_at_bad_line() {
        let trace = format!("\n# comment\n{{\"cc\":\"bad\"}}\n{CYCLE}\n");
        let mut ctrl = SystemController::new(None);
        let mut out = Vec::new();
        let err = replay(trace.as_bytes(), true, &mut ctrl, &mut out).unwrap_err();

        assert_eq!(err.to_string(), "line 3");
        let msg = format!("{:#}", err);
        assert!(msg.starts_with("line 3: malformed cruise command at column"), "{}", msg);
        assert!(out.is_empty());
        assert_eq!(ctrl.cycles(), 0);
    }

    #[test]
    fn test_strict_replay_accepts_clean_trace() {
        let trace = format!("{CYCLE}\n{CYCLE}\n");
        let mut ctrl = SystemController::new(None);
        let mut out = Vec::new();
        replay(trace.as_bytes(), true, &mut ctrl, &mut out).unwrap();

        let recs = records(&out);
        assert_eq!(recs.len(), 2);
        let t = recs[1]["throttle_command"].as_f64().unwrap();
        assert!((t - 8.613).abs() < 1e-4, "throttle {}", t);
    }
}
