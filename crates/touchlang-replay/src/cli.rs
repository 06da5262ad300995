#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use touchlang_core::Context;
use web_time::Duration;

use crate::error::{ReplayError, Result};
use crate::replay::{ReplayOptions, replay};
use crate::trace::parse_trace;

#[derive(Debug, Parser)]
#[command(
    name = "touchlang-replay",
    about = "Replay a JSON-lines touch trace through a TouchLang session",
    version
)]
pub struct Cli {
    /// Trace file, one JSON object per line.
    pub trace: PathBuf,

    /// Context the session starts in.
    #[arg(long, default_value_t = Context::General)]
    pub context: Context,

    /// Gesture policy (TOML, or JSON by extension).
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Preferences file; created if missing and updated as gestures land.
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// Print the transcript as JSON.
    #[arg(long)]
    pub json: bool,

    /// Simulated response latency in milliseconds.
    #[arg(long = "latency-ms", default_value_t = 800)]
    pub latency_ms: u64,

    /// Also wait out the latency in wall-clock time.
    #[arg(long)]
    pub realtime: bool,
}

impl Cli {
    #[must_use]
    pub fn options(&self) -> ReplayOptions {
        ReplayOptions {
            context: self.context,
            policy: self.policy.clone(),
            prefs: self.prefs.clone(),
            latency: Duration::from_millis(self.latency_ms),
            realtime: self.realtime,
        }
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let file = File::open(&cli.trace).map_err(|e| ReplayError::io(&cli.trace, e))?;
    let lines = parse_trace(BufReader::new(file))?;
    if lines.is_empty() {
        return Err(ReplayError::invalid(format!(
            "{} contains no trace lines",
            cli.trace.display()
        )));
    }
    let transcript = replay(&lines, &cli.options())?;
    let rendered = if cli.json {
        let mut json = serde_json::to_string_pretty(&transcript)?;
        json.push('\n');
        json
    } else {
        transcript.render_text()
    };
    out.write_all(rendered.as_bytes())
        .map_err(|e| ReplayError::io("<stdout>", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use touchlang_core::Context;

    #[test]
    fn defaults_parse() {
        let cli = Cli::try_parse_from(["touchlang-replay", "trace.jsonl"]).unwrap();
        assert_eq!(cli.context, Context::General);
        assert_eq!(cli.latency_ms, 800);
        assert!(!cli.json);
        assert!(cli.policy.is_none());
    }

    #[test]
    fn context_is_case_insensitive() {
        let cli = Cli::try_parse_from([
            "touchlang-replay",
            "t.jsonl",
            "--context",
            "Decision",
            "--latency-ms",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.context, Context::Decision);
        assert!(cli.options().latency.is_zero());
    }

    #[test]
    fn unknown_context_is_rejected() {
        let parsed = Cli::try_parse_from(["touchlang-replay", "t.jsonl", "--context", "party"]);
        assert!(parsed.is_err());
    }
}
