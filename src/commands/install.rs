use crate::core::config::Config;
use crate::core::package::{Outcome, PackageSpec};
use crate::core::pipeline::Pipeline;
use crate::error::{FetchbinError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub struct InstallArgs {
    pub name: String,
    pub url: String,
    pub destination: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub unpack: bool,
    pub copy_binary: bool,
    pub binary_dest: Option<PathBuf>,
    pub binary_name: Option<String>,
    pub check: bool,
    pub verbose: bool,
    pub json: bool,
}

pub fn run(args: InstallArgs) -> Result<()> {
    // Check mode short-circuits before anything touches the filesystem,
    // including the config file.
    if args.check {
        let outcome = Outcome::unchanged("");
        if args.json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            println!("Check mode: {} was not installed", args.name);
        }
        return Ok(());
    }

    let config = Config::load()?;
    let spec = build_spec(&args, &config);

    if args.verbose {
        display_spec(&spec);
    }

    let outcome = Pipeline::new(spec).run();

    if args.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else if outcome.changed {
        println!("{}", outcome.message);
    }

    if !outcome.changed {
        return Err(FetchbinError::InstallationFailed {
            message: outcome.message,
        });
    }

    Ok(())
}

/// Defaults layer flag → config file → built-in, resolved once here so the
/// spec handed to the pipeline is final.
fn build_spec(args: &InstallArgs, config: &Config) -> PackageSpec {
    let destination = args
        .destination
        .clone()
        .unwrap_or_else(|| config.destination.clone());
    let binary_dest = args
        .binary_dest
        .clone()
        .unwrap_or_else(|| config.binary_dest.clone());
    let timeout = Duration::from_secs(args.timeout.unwrap_or(config.timeout_secs));

    let mut spec = PackageSpec::new(&args.name, &args.url)
        .with_destination(destination)
        .with_timeout(timeout)
        .with_unpack(args.unpack)
        .with_copy_binary(args.copy_binary)
        .with_binary_dest(binary_dest);

    if let Some(binary_name) = &args.binary_name {
        spec = spec.with_binary_name(binary_name);
    }

    spec
}

fn display_spec(spec: &PackageSpec) {
    println!("Package name: {}", spec.name);
    println!("Source URL: {}", spec.url);
    println!("Destination: {}", spec.destination.display());
    println!("Timeout: {}s", spec.timeout.as_secs());
    println!("Unpack: {}", spec.unpack);
    println!("Copy binary: {}", spec.copy_binary);
    println!("Binary destination: {}", spec.binary_dest.display());
    println!("Binary name: {}", spec.binary_name);
}
