use album_ark::config::{self, AlbumConfig};
use album_ark::describe::describe;
use album_ark::layout::PackageLayout;
use album_ark::metadata::MetadataRecord;
use album_ark::mint::{HttpTransport, MintClient, MintEndpoint};
use album_ark::output;
use album_ark::scaffold::scaffold;
use album_ark::subjects::{FastLookup, SubjectLookup};
use album_ark::update::{DocumentJob, UpdateOptions, Workflow};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Flags for commands that copy media into the package.
#[derive(clap::Args, Clone)]
struct MediaArgs {
    /// Folder holding the album's TIFF scans and PDF renditions
    #[arg(long, default_value = "images")]
    images: PathBuf,
}

/// Flags for commands that resolve subject labels.
#[derive(clap::Args, Clone)]
struct LookupArgs {
    /// Skip the FAST label lookup and use subject ids as labels
    #[arg(long)]
    offline: bool,
}

#[derive(Parser)]
#[command(name = "album-ark")]
#[command(about = "Package digitized photo albums and mint ARKs for their descriptors")]
#[command(long_about = "\
Package digitized photo albums and mint ARKs for their descriptors

The package root holds one collection, described by the first row of
metadata.csv (collection_id, title, description, creator, date_range,
fast_id_1..fast_id_12):

  root/
  ├── metadata.csv
  ├── album-ark.toml                       # Optional config
  ├── collection/
  │   ├── MC-001.jsonld.json               # Collection descriptor
  │   └── MC-001/labels.jsonld.json        # Subject labels
  └── items/
      ├── MC-001.jsonld.json               # Item descriptor
      └── MC-001/media/images/
          ├── MC-001_0001.tif
          └── MC-001_0001.tif.jsonld.json  # Page descriptor

Minting consumes identifiers permanently. Every mint is confirmed first
unless --yes is given; --dry-run prints the requests without sending them.

Credentials come from EZID_USERNAME, EZID_PASSWORD and EZID_SHOULDER.
Run 'album-ark gen-config' to generate a documented album-ark.toml.")]
#[command(version)]
struct Cli {
    /// Package root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Metadata CSV, relative to the package root
    #[arg(long, default_value = "metadata.csv", global = true)]
    metadata: PathBuf,

    /// Config file, relative to the package root
    #[arg(long, default_value = "album-ark.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the package tree and copy media into it
    Scaffold(MediaArgs),
    /// Write descriptor documents with placeholder identifiers
    Describe(LookupArgs),
    /// Run scaffold then describe
    Build {
        #[command(flatten)]
        media: MediaArgs,
        #[command(flatten)]
        lookup: LookupArgs,
    },
    /// Mint ARKs and write them into descriptor documents
    Mint {
        /// Which descriptors to mint for
        #[arg(value_enum)]
        target: MintTarget,
        /// Print the requests without contacting the service or writing files
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
        #[command(flatten)]
        lookup: LookupArgs,
    },
    /// Print a stock album-ark.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy)]
struct MintFlags {
    dry_run: bool,
    yes: bool,
    offline: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum MintTarget {
    Collection,
    Item,
    Pages,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("album_ark=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Scaffold(media) => {
            let (_, _, layout) = load_package(&cli)?;
            run_scaffold(&cli.root, &layout, media)?;
        }
        Command::Describe(lookup) => {
            let (config, record, layout) = load_package(&cli)?;
            run_describe(&cli.root, &layout, &record, &config, lookup)?;
        }
        Command::Build { media, lookup } => {
            let (config, record, layout) = load_package(&cli)?;
            println!("==> Stage 1: Scaffolding {}", layout.collection_id());
            run_scaffold(&cli.root, &layout, media)?;
            println!("==> Stage 2: Describing {}", layout.collection_id());
            run_describe(&cli.root, &layout, &record, &config, lookup)?;
            println!("==> Build complete: {}", cli.root.display());
        }
        Command::Mint {
            target,
            dry_run,
            yes,
            lookup,
        } => {
            let (config, _, layout) = load_package(&cli)?;
            let flags = MintFlags {
                dry_run: *dry_run,
                yes: *yes,
                offline: lookup.offline,
            };
            run_mint(&cli.root, &layout, &config, *target, flags)?;
        }
        Command::GenConfig => {
            print!("{}", config::config_template());
        }
    }

    Ok(())
}

/// Config, metadata row and layout for the package under `--root`.
fn load_package(
    cli: &Cli,
) -> Result<(AlbumConfig, MetadataRecord, PackageLayout), Box<dyn std::error::Error>> {
    let config = config::load_config(&cli.root.join(&cli.config))?;
    let record = MetadataRecord::from_csv_path(&cli.root.join(&cli.metadata))?;
    let layout = PackageLayout::new(&cli.root, record.collection_id()?);
    Ok((config, record, layout))
}

fn run_scaffold(
    root: &Path,
    layout: &PackageLayout,
    media: &MediaArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = scaffold(layout, &root.join(&media.images))?;
    output::print_scaffold_output(&report, root);
    Ok(())
}

fn run_describe(
    root: &Path,
    layout: &PackageLayout,
    record: &MetadataRecord,
    config: &AlbumConfig,
    args: &LookupArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let lookup = subject_lookup(config, args.offline)?;
    let report = describe(
        layout,
        record,
        &config.archive,
        lookup.as_ref().map(|l| l as &dyn SubjectLookup),
    )?;
    output::print_describe_output(&report, root);
    Ok(())
}

fn run_mint(
    root: &Path,
    layout: &PackageLayout,
    config: &AlbumConfig,
    target: MintTarget,
    flags: MintFlags,
) -> Result<(), Box<dyn std::error::Error>> {
    let MintFlags {
        dry_run,
        yes,
        offline,
    } = flags;
    let jobs = match target {
        MintTarget::Collection => vec![DocumentJob::collection(layout)],
        MintTarget::Item => vec![DocumentJob::item(layout)],
        MintTarget::Pages => DocumentJob::pages(layout),
    };
    if jobs.is_empty() {
        println!("No documents to mint");
        return Ok(());
    }

    // Dry runs send nothing: unset secrets are allowed.
    let endpoint = if dry_run {
        config.ezid.preview_endpoint()
    } else {
        config.ezid.endpoint()?
    };
    if !dry_run && !yes && !confirm(&endpoint, jobs.len())? {
        println!("Aborted, nothing minted");
        return Ok(());
    }

    let client = MintClient::new(endpoint, HttpTransport::new(config.ezid.timeout())?);
    // No label lookups during dry runs either.
    let lookup = subject_lookup(config, offline || dry_run)?;
    let options = UpdateOptions {
        target_pattern: config.ezid.target_pattern.clone(),
        dry_run,
        pause: config.ezid.pause(),
    };
    let mut workflow = Workflow::new(&client, options);
    if let Some(lookup) = &lookup {
        workflow = workflow.with_lookup(lookup);
    }

    let report = match workflow.update_many(&jobs) {
        Ok(report) => report,
        Err(aborted) => {
            output::print_batch_output(&aborted.report, root);
            return Err(aborted.into());
        }
    };
    output::print_batch_output(&report, root);
    if !report.failed.is_empty() {
        return Err(format!("{} document(s) failed", report.failed.len()).into());
    }
    Ok(())
}

fn subject_lookup(
    config: &AlbumConfig,
    offline: bool,
) -> Result<Option<FastLookup>, Box<dyn std::error::Error>> {
    if offline {
        return Ok(None);
    }
    let lookup = FastLookup::new(
        &config.subjects.fast_base_url,
        std::time::Duration::from_secs(config.subjects.timeout_secs),
    )?;
    Ok(Some(lookup))
}

/// Ask on stdin before consuming identifiers. Anything but y/yes declines.
fn confirm(endpoint: &MintEndpoint, count: usize) -> std::io::Result<bool> {
    print!(
        "Mint {} identifier(s) on {} as {}? [y/N] ",
        count,
        endpoint.shoulder,
        endpoint.credentials.username()
    );
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
