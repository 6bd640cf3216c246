#![forbid(unsafe_code)]
use bytechain::config::load_config;
use bytechain::node::Node;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Mine blocks on a local ByteChain ledger", long_about = None)]
struct Cli {
    /// Consensus config file; defaults are used if it does not exist
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of blocks to mine
    #[arg(long, default_value_t = 5)]
    blocks: usize,

    /// Address credited with block rewards
    #[arg(long, default_value = "miner")]
    miner: String,

    /// Print the tip block as JSON when done
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let node = Node::new(config)?;
    info!(
        "Starting ByteChain node: genesis {}, difficulty {}",
        node.last_block().hash(),
        node.difficulty()
    );

    for _ in 0..cli.blocks {
        let start = Instant::now();
        let block = node.mine_block(&cli.miner).await?;
        info!(
            "Block {} mined in {:?}: {} (difficulty {}, nonce {})",
            block.header.block_height,
            start.elapsed(),
            block.hash(),
            block.header.difficulty,
            block.header.nonce
        );
    }

    info!(
        "Height {}, {} balance {}, next difficulty {}",
        node.height(),
        cli.miner,
        node.get_balance(&cli.miner),
        node.difficulty()
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&node.last_block())?);
    }
    Ok(())
}
