use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// `RUST_LOG` wins when set; otherwise workspace crates log at info (debug with `-v`).
pub fn init_cli_logger(verbose: bool) {
    let fallback = if verbose {
        "exam=debug,exam_core=debug,services=debug,storage=debug,warn"
    } else {
        "exam=info,exam_core=info,services=info,storage=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
