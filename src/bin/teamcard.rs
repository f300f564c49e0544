use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "teamcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a PNG card for every eligible, visible record.
    Generate(GenerateArgs),
    /// Generate one record by batch index (debugging aid).
    Single(SingleArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Records JSON: an array of column-name → value maps.
    #[arg(long)]
    records: PathBuf,

    /// Base SVG template.
    #[arg(long)]
    template: PathBuf,

    /// Output directory for `{identity}.png` files.
    #[arg(long)]
    out: PathBuf,

    /// Output raster width.
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Output raster height.
    #[arg(long, default_value_t = 1000)]
    height: u32,

    /// Static-map API key; falls back to GOOGLE_MAPS_API_KEY.
    #[arg(long)]
    api_key: Option<String>,

    /// Skip the map fetch entirely (coordinate placeholders only).
    #[arg(long)]
    offline: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    report_json: bool,
}

#[derive(Parser, Debug)]
struct SingleArgs {
    /// Records JSON: an array of column-name → value maps.
    #[arg(long)]
    records: PathBuf,

    /// Base SVG template.
    #[arg(long)]
    template: PathBuf,

    /// Index into the filtered batch (0-based).
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output path; `.svg` writes the resolved document, anything else PNG.
    #[arg(long)]
    out: PathBuf,

    /// Skip the map fetch entirely.
    #[arg(long)]
    offline: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Single(args) => cmd_single(args),
    }
}

fn make_fetcher(offline: bool, api_key: Option<String>) -> anyhow::Result<Box<dyn teamcard::MapFetcher>> {
    if offline {
        return Ok(Box::new(teamcard::OfflineFetcher));
    }
    let key = api_key.or_else(|| std::env::var("GOOGLE_MAPS_API_KEY").ok());
    Ok(Box::new(teamcard::StaticMapFetcher::new(key)?))
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let records = teamcard::load_records(&args.records)?;
    let template = teamcard::Template::load(&args.template)?;
    let fetcher = make_fetcher(args.offline, args.api_key)?;
    let instantiator =
        teamcard::Instantiator::new(&template, teamcard::TeamColorPalette::default(), fetcher)?;
    let rasterizer = teamcard::SvgRasterizer::new();
    let mut sink = teamcard::DirectorySink::new(&args.out);

    // Cancellation is part of the library API (checked between records); the
    // CLI runs batches to completion.
    let cancel = AtomicBool::new(false);

    let report = teamcard::run_batch(
        &records,
        &instantiator,
        &rasterizer,
        &mut sink,
        &cancel,
        teamcard::BatchOptions {
            width: args.width,
            height: args.height,
        },
    );

    if args.report_json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &report)
            .context("write batch report")?;
        println!();
    }
    eprintln!(
        "generated {}/{} cards into {}",
        report.success_count,
        report.outcomes.len(),
        args.out.display()
    );
    Ok(())
}

fn cmd_single(args: SingleArgs) -> anyhow::Result<()> {
    let records = teamcard::load_records(&args.records)?;
    let record = records
        .get(args.index)
        .with_context(|| format!("batch has {} records, index {}", records.len(), args.index))?;

    let template = teamcard::Template::load(&args.template)?;
    let fetcher = make_fetcher(args.offline, None)?;
    let instantiator =
        teamcard::Instantiator::new(&template, teamcard::TeamColorPalette::default(), fetcher)?;

    let document = instantiator.instantiate(record)?;

    if args.out.extension().is_some_and(|ext| ext == "svg") {
        std::fs::write(&args.out, document)
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    } else {
        use teamcard::Rasterizer as _;
        let png = teamcard::SvgRasterizer::new().render_png(&document, 1000, 1000)?;
        std::fs::write(&args.out, png)
            .with_context(|| format!("write png '{}'", args.out.display()))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
