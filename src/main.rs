use clap::Parser;
use log::{error, info};
use simple_logger::init_with_level;

use mothulity::{
    cli::{Args, SubArgs},
    core::{run_manifest, run_script, Generated},
    error::MothulityError,
};

fn main() {
    let start = std::time::Instant::now();
    let args: Args = Args::parse();

    init_with_level(args.log_level()).expect("ERROR: Could not initialize logger");

    match args.command {
        SubArgs::Script { args } => match run_script(&args).unwrap_or_else(|e| exit(e)) {
            Generated::Script(path) => info!("SUCCESS: script written to {}", path.display()),
            Generated::Summary(path) => info!("SUCCESS: summary written to {}", path.display()),
        },
        SubArgs::Manifest { args } => {
            let path = run_manifest(&args).unwrap_or_else(|e| exit(e));
            info!("SUCCESS: manifest written to {}", path.display());
        }
    }

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.3?}", elapsed);
}

fn exit(e: MothulityError) -> ! {
    error!("{}", e);
    std::process::exit(e.exit_code());
}
