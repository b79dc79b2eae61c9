//! media-updater: update self-hosted media servers.

use media_updater::cli::Cli;
use media_updater::core::user_friendly_error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_or_exit();
    cli.init_logging();

    if let Err(e) = cli.execute().await {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
