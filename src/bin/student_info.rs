//! student_info: runs the student-information walkthrough against an
//! embedded cluster.
use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use student_info_db::{
    Cluster, ClusterConfig, Result, ServerOptions, Session, Status, walkthrough,
};

#[derive(Parser)]
#[command(
    name = "student_info",
    about = "Create, fill, query and drop the studentInfoDB table"
)]
struct Args {
    /// JSON file with cluster settings; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma separated quorum hosts.
    #[arg(long)]
    quorum: Option<String>,

    /// Client port of the quorum.
    #[arg(long)]
    client_port: Option<u16>,

    /// Rows fetched per scanner round trip.
    #[arg(long)]
    scanner_caching: Option<usize>,

    /// Keep the cluster's operation log in this directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// fsync the operation log after every append.
    #[arg(long, default_value_t = false)]
    sync_log: bool,

    /// Print cluster statistics when done.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn load_config(args: &Args) -> Result<ClusterConfig> {
    let mut config = match &args.config {
        Some(path) => ClusterConfig::from_file(path)?,
        None => ClusterConfig::default(),
    };
    if let Some(quorum) = &args.quorum {
        config.set_quorum(quorum);
    }
    if let Some(port) = args.client_port {
        config.client_port = port;
    }
    if let Some(caching) = args.scanner_caching {
        config.scanner_caching = caching;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    let options = ServerOptions {
        data_dir: args.data_dir.clone(),
        sync_log: args.sync_log,
        ..ServerOptions::for_client(&config)
    };
    let cluster = Cluster::start(options)?;

    let result = Session::open(&config).and_then(|mut session| {
        let result = walkthrough::run(&mut session);
        session.close();
        result
    });

    cluster.shutdown();
    if args.stats {
        println!("\n{}", cluster.statistics().report());
    }
    result
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_info_db=info,student_info=info".into()),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(status: &Status) {
    tracing::error!(kind = ?status.kind(), error = %status, "walkthrough aborted");
}
