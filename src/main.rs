use std::path::Path;

use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "extract-file")]
#[command(about = "Split commits by extracting changes to specified files/directories")]
#[command(after_help = "Examples:
  extract-file main~5 src/component.tsx
  extract-file main~5 src/component1.tsx src/component2.tsx
  extract-file main~5 src/components/ lib/utils.ts")]
struct Cli {
    /// Preview what would be done without making changes
    #[arg(long)]
    dry_run: bool,

    /// Enable detailed debug output
    #[arg(long)]
    debug: bool,

    /// Exclusive lower bound of the range to rewrite (HEAD is the upper bound)
    previous_rev: String,

    /// Files to extract; a trailing `/` selects a whole directory
    #[arg(required = true)]
    paths: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let git = extract_file::Git::discover(Path::new("."))?;
    let targets = extract_file::TargetSpec::new(&cli.paths)?;
    let config = extract_file::ExtractConfig {
        run_id: std::process::id().to_string(),
        debug: cli.debug,
    };
    let extractor = extract_file::Extractor::new(git, targets, config);

    if cli.dry_run {
        print!("{}", extractor.dry_run(&cli.previous_rev, "HEAD")?);
        return Ok(());
    }

    extractor.extract(&cli.previous_rev)?;
    Ok(())
}
