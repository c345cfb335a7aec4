use std::process::ExitCode;

use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    okyanus_installer::init_logging();

    match okyanus_installer::run().await {
        Ok(report) => {
            info!("The Fabric server has successfully been installed!");
            info!("Run {} to start your server", report.output_jar.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Installation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
