use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use zarr_checksum::{
    depth_first_checksum, errors::ChecksumError, fastasync_checksum, fastio_checksum, ArrayStore,
    ListingFilter,
};

/// Compute a content-derived checksum manifest for a Zarr directory tree
#[derive(Clone, Debug, Eq, Parser, PartialEq)]
#[command(version)]
struct Arguments {
    /// Emit debug logging on stderr
    #[arg(short, long)]
    debug: bool,

    /// Print the manifest in its persisted JSON form instead of the
    /// aggregate display string
    #[arg(long)]
    json: bool,

    /// Skip directory entries with this exact name (may be given multiple
    /// times)
    #[arg(long, value_name = "NAME")]
    exclude: Vec<String>,

    /// Skip directory entries whose names start with a period
    #[arg(long)]
    ignore_hidden: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Eq, PartialEq, Subcommand)]
enum Command {
    /// Traverse the store depth-first on a single thread
    Walk { dirpath: PathBuf },
    /// Traverse the store with a pool of worker threads
    Fastio {
        #[arg(short, long, default_value = "5")]
        threads: NonZeroUsize,
        dirpath: PathBuf,
    },
    /// Traverse the store with a pool of async tasks
    Fastasync {
        #[arg(short, long, default_value_t = 5)]
        workers: usize,
        dirpath: PathBuf,
    },
}

impl Command {
    fn dirpath(&self) -> &PathBuf {
        match self {
            Command::Walk { dirpath }
            | Command::Fastio { dirpath, .. }
            | Command::Fastasync { dirpath, .. } => dirpath,
        }
    }
}

fn main() -> Result<(), ChecksumError> {
    let args = Arguments::parse();
    init_logging(args.debug);
    let mut filter = ListingFilter::new().ignore_hidden(args.ignore_hidden);
    for name in args.exclude {
        filter = filter.exclude(name);
    }
    let store = ArrayStore::with_filter(args.command.dirpath(), filter)?;
    let manifest = match args.command {
        Command::Walk { .. } => depth_first_checksum(&store)?,
        Command::Fastio { threads, .. } => fastio_checksum(&store, threads)?,
        Command::Fastasync { workers, .. } => {
            // Worker tasks block on the job stack, so give each one its own
            // runtime thread
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(workers + 1)
                .enable_all()
                .build()
                .expect("Tokio runtime construction should not fail");
            rt.block_on(fastasync_checksum(&store, workers))?
        }
    };
    if args.json {
        println!(
            "{}",
            manifest
                .to_json()
                .expect("Manifest serialization should not fail")
        );
    } else {
        println!("{manifest}");
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{:<5}] {message}", record.level()));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .expect("A global logger should not already be set");
}
