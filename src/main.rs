use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use semtag::cli::{self, Args};
use semtag::ui;

/// Diagnostics go to stderr and are off unless `-v` is given or RUST_LOG is set
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => return,
            1 => "warn,semtag=info".to_string(),
            2 => "info,semtag=debug".to_string(),
            _ => "debug,semtag=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn try_main(args: Args) -> Result<()> {
    cli::run(args)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = try_main(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
