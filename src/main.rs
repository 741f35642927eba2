use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tasador_api::RestApi;
use tasador_core::TableRole;
use tasador_io::{read_table, write_report, SheetLayout};
use tasador_matching::{
    EmbedderHandle, EmbedderKind, MatchConfig, PricingEngine, PricingReport, Strategy, DEFAULT_EMBED_BATCH_SIZE,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Price construction budget items against a priced reference database
#[derive(Parser, Debug)]
#[command(name = "tasador")]
#[command(version, about = "Assigns reference prices to budget items", long_about = None)]
struct Args {
    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Price a query workbook against a reference workbook
    Price(PriceArgs),
    /// Serve the REST API
    Serve {
        /// HTTP port
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Embedding backend used by semantic requests
        #[arg(long, default_value_t = EmbedderKind::default())]
        embedder: EmbedderKind,
    },
}

#[derive(ClapArgs, Debug)]
struct PriceArgs {
    /// Priced reference workbook
    #[arg(long)]
    reference: PathBuf,

    /// Workbook with the items to price
    #[arg(long)]
    query: PathBuf,

    /// Where to write the result workbook
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// lexical or semantic
    #[arg(long, default_value = "lexical")]
    strategy: Strategy,

    /// Acceptance threshold in the strategy's scale (80 lexical, 0.7 semantic by default)
    #[arg(long)]
    threshold: Option<f64>,

    /// 0-based row holding the column headers
    #[arg(long, default_value_t = 2)]
    header_row: usize,

    /// Sheet to read; the first one by default
    #[arg(long)]
    sheet: Option<String>,

    #[arg(long, default_value = "Código")]
    code_column: String,

    #[arg(long, default_value = "Resumen")]
    text_column: String,

    #[arg(long, default_value = "Pres")]
    price_column: String,

    /// Take the price of a reference item with the same code first
    #[arg(long)]
    exact_code_match: bool,

    /// Embedding backend for the semantic strategy
    #[arg(long, default_value_t = EmbedderKind::default())]
    embedder: EmbedderKind,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

impl PriceArgs {
    fn layout(&self) -> SheetLayout {
        SheetLayout {
            sheet: self.sheet.clone(),
            header_row: self.header_row,
            code_column: self.code_column.clone(),
            text_column: self.text_column.clone(),
            price_column: self.price_column.clone(),
        }
    }

    fn config(&self) -> MatchConfig {
        let config = MatchConfig::new(self.strategy).with_exact_code_match(self.exact_code_match);
        match self.threshold {
            Some(threshold) => config.with_threshold(threshold),
            None => config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        Command::Price(price_args) => price(price_args),
        Command::Serve { port, embedder } => serve(port, embedder),
    }
}

fn price(args: PriceArgs) -> anyhow::Result<()> {
    let layout = args.layout();
    let config = args.config();

    let reference = read_table(&args.reference, TableRole::Reference, &layout)
        .with_context(|| format!("reading reference workbook {}", args.reference.display()))?;
    let query = read_table(&args.query, TableRole::Query, &layout)
        .with_context(|| format!("reading query workbook {}", args.query.display()))?;

    let engine = PricingEngine::new(Arc::new(EmbedderHandle::for_kind(args.embedder, DEFAULT_EMBED_BATCH_SIZE)));
    let report = engine.run(&reference, &query, &config)?;

    if let Some(output) = &args.output {
        write_report(output, &report).with_context(|| format!("writing {}", output.display()))?;
    }

    if args.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &PricingReport) {
    let stats = &report.stats;
    println!("Strategy:         {} (threshold {})", report.strategy, report.threshold);
    println!("Reference items:  {}", stats.reference_items);
    println!("Query items:      {}", stats.query_items);
    println!(
        "Priced:           {} ({:.1}%)",
        stats.matched,
        stats.match_rate() * 100.0
    );
    println!("Not found:        {}", stats.not_found);
    if stats.code_matches > 0 {
        println!("By code:          {}", stats.code_matches);
    }
    if stats.matched > 0 {
        println!("Average score:    {:.3}", stats.avg_score);
    }
}

fn serve(port: u16, embedder: EmbedderKind) -> anyhow::Result<()> {
    info!("Starting tasador v{}", env!("CARGO_PKG_VERSION"));
    let engine = Arc::new(PricingEngine::new(Arc::new(EmbedderHandle::for_kind(
        embedder,
        DEFAULT_EMBED_BATCH_SIZE,
    ))));

    info!("HTTP API: http://localhost:{}/", port);
    actix_web::rt::System::new().block_on(RestApi::start(engine, port))?;
    info!("Shutting down...");
    Ok(())
}
