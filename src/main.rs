use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hackathon_tracker_lib=info,hackathon_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting hackathon tracker v{}", env!("CARGO_PKG_VERSION"));
    hackathon_tracker_lib::run()
}
