mod player;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use replay_lens_core::scenario::Scenario;
use replay_lens_protocol::Segment;

const USAGE: &str = "Usage: replay-lens record <scenario.json> | replay-lens play <segments.json>";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }

    let path = PathBuf::from(&args[2]);
    let data = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;

    match args[1].as_str() {
        "record" => {
            let scenario = Scenario::from_json(&data)?;
            let segments = scenario.run()?;
            tracing::info!(segments = segments.len(), "scenario finished");
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &segments)?;
            writeln!(stdout)?;
        }
        "play" => {
            let segments = load_segments(&data)?;
            player::play(&segments)?;
        }
        other => bail!("unknown command `{other}`\n{USAGE}"),
    }
    Ok(())
}

/// Accept either a single segment or the array `record` prints.
fn load_segments(data: &[u8]) -> Result<Vec<Segment>> {
    if let Ok(segments) = serde_json::from_slice::<Vec<Segment>>(data) {
        return Ok(segments);
    }
    let segment: Segment = serde_json::from_slice(data).context("not a segment or segment list")?;
    Ok(vec![segment])
}
