use clap::Parser;

/// Gas fee estimator CLI arguments
///
/// Every flag is optional and overrides the matching environment variable.
#[derive(Debug, Parser)]
#[command(
    name = "gas-fee-estimator",
    version,
    about = "Tiered EIP-1559 fee recommendations from recent block history"
)]
pub struct Cli {
    /// JSON-RPC endpoint of the node (overrides RPC_URL)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Number of recent blocks to sample (overrides BLOCK_COUNT)
    #[arg(long)]
    pub block_count: Option<u64>,

    /// Comma-separated reward percentiles (overrides REWARD_PERCENTILES)
    #[arg(long)]
    pub percentiles: Option<String>,

    /// Tier to recommend (overrides FEE_TIER)
    #[arg(long)]
    pub tier: Option<String>,
}
