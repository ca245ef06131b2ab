use anyhow::Result;
use huaweicloud::HuaweicloudProvider;
use tf_provider::serve;

#[tokio::main]
async fn main() -> Result<()> {
    // When PLUGIN_LOG_FILE is set the plugin framework installs its own
    // subscriber; stdout is reserved for the plugin handshake either way.
    if std::env::var("PLUGIN_LOG_FILE").is_err() {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    serve("huaweicloud", HuaweicloudProvider::new()).await
}
