use clap::Parser;

pub const DEFAULT_MAX_PAGES: usize = 400;
pub const DEFAULT_WORKERS: usize = 16;
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

#[derive(Parser, Debug, Clone)]
#[command(name = "auditor")]
#[command(about = "Site health crawler and content-quality auditor", long_about = None)]
pub struct Cli {
    /// Start URL including scheme, e.g. https://example.com
    #[arg(long, value_name = "URL")]
    pub start: String,

    /// Maximum number of pages to crawl
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Only enqueue links on the start URL's host
    #[arg(long)]
    pub same_domain: bool,

    /// Number of concurrent link/image status checks
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Directory the report files are written to
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Override the User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Also save the full audit as a JSON file
    #[arg(short, long)]
    pub save: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to configuration file (JSON, TOML, or YAML)
    #[arg(long)]
    pub config: Option<String>,
}
