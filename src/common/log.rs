//! Tracing setup shared by the binary and anything embedding the engine.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;

const DEFAULT_FILTER: &str = "info";

pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let tree = HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_bracketed_fields(true)
        .with_indent_lines(true);

    // A subscriber may already be installed when the engine is embedded.
    if tracing_subscriber::registry().with(filter).with(tree).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
