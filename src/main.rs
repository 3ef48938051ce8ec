use clap::error::ErrorKind;
use clap::Parser;
use css_module_classes::{extract, ExtractArgs};
use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments; usage errors exit with status 1
    let args = match ExtractArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    init_logging(args.verbose);

    match extract(args).await {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
