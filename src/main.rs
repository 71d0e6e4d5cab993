use anyhow::Result;
use clap::Parser;
use obs_repack::config::{DEFAULT_PACKAGE, DEFAULT_REPOSITORY};
use obs_repack::materialize::ServiceMode;
use obs_repack::rpm::Version;
use obs_repack::{Config, generate};
use std::path::PathBuf;
use std::sync::Arc;

/// obs-repack - build service packages from a binary RPM repository
///
/// Reads the metadata of a YUM repository, resolves the dependency closure
/// of one package and writes a build service package (recipe, changelog,
/// _service and rpmlintrc) for every package in it.
///
/// Examples:
///   obs-repack                                  # newest dotnet-sdk-9.0
///   obs-repack --runtime 9.0.1 -o packages      # the SDK shipped with runtime 9.0.1
#[derive(Parser, Debug)]
#[command(author, version = env!("OBS_REPACK_VERSION"), about)]
struct Cli {
    /// Repository base URL
    #[arg(
        long,
        short = 'r',
        env = "OBS_REPACK_REPOSITORY",
        value_name = "URL",
        default_value = DEFAULT_REPOSITORY
    )]
    repository: String,

    /// Root package name
    #[arg(long, short = 'p', value_name = "NAME", default_value = DEFAULT_PACKAGE)]
    package: String,

    /// Exact version of the root package (newest when omitted)
    #[arg(long, value_name = "VERSION")]
    package_version: Option<Version>,

    /// Preferred version for the root package's direct dependencies
    #[arg(long, value_name = "VERSION")]
    pin: Option<Version>,

    /// .NET runtime version; selects the matching SDK and pins its dependencies
    #[arg(long, value_name = "VERSION")]
    runtime: Option<String>,

    /// Output directory
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// JSON file with override rules replacing the built-in ones
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,

    /// rpmrebuild executable
    #[arg(long, value_name = "PATH", default_value = "rpmrebuild")]
    rpmrebuild: PathBuf,

    /// Let the download_files service fetch the RPM instead of download_url
    #[arg(long)]
    download_files: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn into_config(self) -> Config {
        Config {
            repository: self.repository,
            package: self.package,
            version: self.package_version,
            pin: self.pin,
            runtime_version: self.runtime,
            output: self.output,
            overrides: self.overrides,
            rpmrebuild: self.rpmrebuild,
            service_mode: if self.download_files {
                ServiceMode::DownloadFiles
            } else {
                ServiceMode::DownloadUrl
            },
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();
    let runtime = Arc::new(obs_repack::runtime::RealRuntime);

    let report = generate(runtime, &cli.into_config()).await?;
    print!("{}", report);
    Ok(())
}
