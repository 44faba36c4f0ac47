use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "iml",
    about = "Tamper-evident inventory movement ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of a running ledger server
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    pub server: String,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the ledger HTTP server
    Serve(ServeArgs),
    /// Record an import or export movement
    Record(RecordArgs),
    /// Show blocks from the hash chain
    Chain(ChainArgs),
    /// Verify hash chain integrity
    Verify(VerifyArgs),
    /// Show transaction log entries
    Logs(LogsArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<String>,
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// Override the journal directory
    #[arg(long)]
    pub data_dir: Option<String>,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Movement direction
    pub kind: MovementArg,
    /// Product identifier
    pub product: u64,
    /// Units to move
    pub amount: u64,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum MovementArg {
    Import,
    Export,
}

impl MovementArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementArg::Import => "import",
            MovementArg::Export => "export",
        }
    }
}

#[derive(Args)]
pub struct ChainArgs {
    /// Show at most the last N blocks
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Verify a journal file on disk instead of querying the server
    #[arg(long)]
    pub journal: Option<String>,
}

#[derive(Args)]
pub struct LogsArgs {
    /// Show only entries for this product
    #[arg(short, long)]
    pub product: Option<u64>,
}
