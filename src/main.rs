use anyhow::{Context, Result};
use arxiv_paper::config::{load_config, Config};
use arxiv_paper::download::{DownloadManager, DownloadSettings, HttpTransport, NonPdfPolicy};
use arxiv_paper::models::{SearchQuery, SortBy, SortOrder};
use arxiv_paper::results::{index_entries, YearFilter};
use arxiv_paper::sources::{ArxivSource, FeedSource};
use arxiv_paper::ui::{self, OutputFormat, StdinOperator};
use arxiv_paper::utils::{FilenameTemplate, HttpClient, RangeSpec};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE_EXAMPLES: &str = "\
Examples:
  List the 10 most recently updated articles by an author:
    paper -m 10 'au:ficial_a_i'

  Combine fields with AND, OR and ANDNOT; quote phrases:
    paper 'ti:\"quantum error correction\" AND cat:quant-ph'

  Fetch specific articles by id:
    paper -i 2309.06314,2301.00001

  Only list articles published 2019-2021 or in 2023:
    paper -y 2019-2021,2023 'abs:transformer'

  Download entries 1-3 and 5 into ./papers, deleting non-pdf files:
    paper -d -s 1-3,5 -D papers -r 'au:ficial_a_i'

  Name files by id and title only:
    paper -d -o '{id}-{title}' 'ti:graphene'

Filename placeholders: {pub} publish year, {updt} update year,
{auth} author slugs joined by '-', {title} title slug, {id} arXiv id.
Use {{ and }} for literal braces.";

/// paper - list arXiv articles and download their PDFs
#[derive(Parser, Debug)]
#[command(name = "paper")]
#[command(version = arxiv_paper::VERSION)]
#[command(about = "List arXiv articles matching a query and download their PDFs", long_about = None)]
#[command(after_long_help = USAGE_EXAMPLES)]
struct Cli {
    /// arXiv search expression, e.g. 'au:ficial_a_i AND ti:quantum'
    #[arg(default_value = "")]
    search_query: String,

    /// Comma-separated arXiv ids to fetch
    #[arg(short = 'i', long, default_value = "")]
    id_list: String,

    /// Index of the first result
    #[arg(short = 'S', long, default_value_t = 0)]
    start: usize,

    /// Number of results to request
    #[arg(short = 'm', long)]
    max_results: Option<usize>,

    /// Sort field
    #[arg(short = 'b', long, value_enum)]
    sort_by: Option<SortField>,

    /// Sort order
    #[arg(short = 'O', long, value_enum)]
    sort_order: Option<Order>,

    /// Only list entries published in these years, e.g. 2019-2021,2023
    #[arg(short = 'y', long)]
    publish_years: Option<String>,

    /// Only list entries updated in these years
    #[arg(short = 'Y', long)]
    update_years: Option<String>,

    /// Download the PDFs of listed entries
    #[arg(short = 'd', long)]
    download: bool,

    /// Template for downloaded file names (without .pdf)
    #[arg(short = 'o', long)]
    output_filename_template: Option<String>,

    /// Directory to download into
    #[arg(short = 'D', long)]
    output_dir: Option<PathBuf>,

    /// Only download the listed entries with these numbers, e.g. 1-3,5
    #[arg(short = 's', long)]
    download_selection: Option<String>,

    /// Delete downloaded files that are not PDFs without asking
    #[arg(short = 'r', long, conflicts_with = "keep_non_pdf")]
    remove_non_pdf: bool,

    /// Keep downloaded files that are not PDFs without asking
    #[arg(short = 'k', long)]
    keep_non_pdf: bool,

    /// Entry output format
    #[arg(long, value_enum, default_value_t = Format::Plain)]
    format: Format,

    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

/// Sort field for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SortField {
    Relevance,
    #[value(name = "lastUpdatedDate")]
    LastUpdatedDate,
    #[value(name = "submittedDate")]
    SubmittedDate,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Relevance => SortBy::Relevance,
            SortField::LastUpdatedDate => SortBy::LastUpdatedDate,
            SortField::SubmittedDate => SortBy::SubmittedDate,
        }
    }
}

/// Sort order
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    Ascending,
    Descending,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Ascending => SortOrder::Ascending,
            Order::Descending => SortOrder::Descending,
        }
    }
}

/// Output format for entries
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Human-readable blocks
    Plain,
    /// One JSON object per line
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Plain => OutputFormat::Plain,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Everything a run needs, resolved from flags over configuration
#[derive(Debug)]
struct Plan {
    query: SearchQuery,
    filter: YearFilter,
    downloads: DownloadSettings,
    format: OutputFormat,
    api_url: String,
    user_agent: String,
    timeout: Option<Duration>,
}

impl Cli {
    fn log_filter(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        format!("arxiv_paper={}", level)
    }

    fn policy(&self, configured: NonPdfPolicy) -> NonPdfPolicy {
        if self.remove_non_pdf {
            NonPdfPolicy::AutoRemove
        } else if self.keep_non_pdf {
            NonPdfPolicy::AutoKeep
        } else {
            configured
        }
    }

    /// Validate every user-supplied expression before touching the network.
    fn plan(&self, config: Config) -> Result<Plan> {
        let publish_years = RangeSpec::parse_optional(self.publish_years.as_deref())
            .context("invalid --publish-years")?;
        let update_years = RangeSpec::parse_optional(self.update_years.as_deref())
            .context("invalid --update-years")?;
        let selection = RangeSpec::parse_optional(self.download_selection.as_deref())
            .context("invalid --download-selection")?;

        let template_text = self
            .output_filename_template
            .as_deref()
            .unwrap_or(&config.downloads.filename_template);
        let template = FilenameTemplate::parse(template_text)
            .with_context(|| format!("invalid filename template {:?}", template_text))?;

        let query = SearchQuery::new(self.search_query.as_str())
            .id_list(self.id_list.as_str())
            .start(self.start)
            .max_results(self.max_results.unwrap_or(config.search.max_results))
            .sort_by(self.sort_by.map(SortBy::from).unwrap_or(config.search.sort_by))
            .sort_order(
                self.sort_order
                    .map(SortOrder::from)
                    .unwrap_or(config.search.sort_order),
            );

        let downloads = DownloadSettings {
            enabled: self.download,
            selection,
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or(config.downloads.output_dir),
            template,
            policy: self.policy(config.downloads.non_pdf),
        };

        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .or_else(|| config.api.timeout());

        Ok(Plan {
            query,
            filter: YearFilter::new(publish_years, update_years),
            downloads,
            format: self.format.into(),
            api_url: config.api.url,
            user_agent: config.api.user_agent,
            timeout,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_filter()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let plan = cli.plan(config)?;

    run(plan).await
}

async fn run(plan: Plan) -> Result<()> {
    if plan.downloads.enabled {
        std::fs::create_dir_all(&plan.downloads.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                plan.downloads.output_dir.display()
            )
        })?;
    }

    let client = HttpClient::with_options(&plan.user_agent, plan.timeout)
        .context("failed to build HTTP client")?;
    let source = ArxivSource::with_api_url(client.clone(), plan.api_url.as_str());

    let entries = source
        .search(&plan.query)
        .await
        .with_context(|| format!("{} query failed", source.name()))?;

    let downloading = plan.downloads.enabled;
    let mut manager = DownloadManager::new(
        plan.downloads,
        Arc::new(HttpTransport::new(client)),
        Box::new(StdinOperator::new()),
    );

    for item in index_entries(entries, plan.filter) {
        let basename = manager.basename(&item);
        ui::print_entry(&item, &basename, plan.format).context("failed to write output")?;
        manager.process(&item).await?;
    }

    if downloading {
        let summary = manager.summary();
        tracing::info!("download finished: {}", summary);
        ui::print_summary(&summary);
    }

    Ok(())
}
