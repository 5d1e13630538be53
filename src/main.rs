use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use the library modules
use fetchbin::commands;
use fetchbin::commands::install::InstallArgs;

#[derive(Parser)]
#[clap(name = "fetchbin")]
#[clap(about = "Install single-binary tools from release archive URLs")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a package, optionally unpack it and install its binary
    Install {
        /// Package name; also the default binary name
        name: String,
        /// URL of the artifact to download
        url: String,
        /// Download and extraction directory (default: /tmp)
        #[clap(long)]
        destination: Option<PathBuf>,
        /// Network timeout in seconds (default: 5)
        #[clap(long)]
        timeout: Option<u64>,
        /// Unpack the downloaded archive
        #[clap(long)]
        unpack: bool,
        /// Move the unpacked binary into the binary destination (only
        /// meaningful together with --unpack)
        #[clap(long)]
        copy_binary: bool,
        /// Directory the binary is installed into (default: /usr/local/bin)
        #[clap(long)]
        binary_dest: Option<PathBuf>,
        /// Name of the binary inside the archive (default: package name)
        #[clap(long)]
        binary_name: Option<String>,
        /// Report what would happen without touching anything
        #[clap(long)]
        check: bool,
        /// Print the resolved configuration before running
        #[clap(short, long)]
        verbose: bool,
        /// Print the outcome record as JSON
        #[clap(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install {
            name,
            url,
            destination,
            timeout,
            unpack,
            copy_binary,
            binary_dest,
            binary_name,
            check,
            verbose,
            json,
        } => commands::install::run(InstallArgs {
            name,
            url,
            destination,
            timeout,
            unpack,
            copy_binary,
            binary_dest,
            binary_name,
            check,
            verbose,
            json,
        })
        .map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
