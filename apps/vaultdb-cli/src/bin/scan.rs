use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use vaultdb_core::scanner::scan_directory;

#[derive(Parser, Debug)]
#[command(name = "vaultdb-scan", about = "List the files of a vault and count those with a given extension")]
struct ScanCli {
    /// Directory to scan
    path: PathBuf,

    /// Extension counted as a match (without the dot)
    #[arg(long, default_value = "md")]
    ext: String,

    /// List only matching files
    #[arg(long)]
    matching_only: bool,
}

fn main() -> Result<()> {
    vaultdb_cli::init_tracing();
    let cli = ScanCli::parse();
    let root = vaultdb_core::config::expand_path(cli.path.to_string_lossy());
    if !root.exists() {
        println!("Error: path does not exist: {}", root.display());
        return Ok(());
    }
    let report = scan_directory(&root, cli.ext.trim_start_matches('.'), cli.matching_only);
    report.write_summary(&mut std::io::stdout().lock())?;
    Ok(())
}
