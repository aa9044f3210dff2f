use anyhow::Result;
use imagenet_top1::{report, settings::Settings};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::default();
    let prediction = imagenet_top1::run(&settings)?;
    report::print(&prediction)?;
    Ok(())
}
