//! # Clarity Boot Runtime
//!
//! Binary entry point: loads configuration from the environment, composes
//! the runtime context, runs the boot pipeline, writes the report, and
//! exits with the documented code — `0` success, `1..=8` first failing
//! stage, `99` for errors outside the stage contract.
//!
//! After a successful full boot the process keeps the brought-up services
//! running until Ctrl+C, then deactivates them in reverse order. Safe mode
//! exits immediately after validation.

use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use boot_runtime::{
    BootConfig, BootOrchestrator, BootScope, EnvSecretsSource, LoggingReportSink,
    LoggingSnapshotStore, ReportSink, RuntimeContext, CRITICAL_EXIT_CODE,
};

#[tokio::main]
async fn main() {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {err}");
        std::process::exit(CRITICAL_EXIT_CODE);
    }

    let config = BootConfig::from_env();
    let scope = if config.safe_mode {
        BootScope::SafeMode
    } else {
        BootScope::Full
    };

    let ctx = RuntimeContext::new(config.bus_config());
    let orchestrator = Arc::new(
        BootOrchestrator::new(
            ctx,
            config,
            Arc::new(EnvSecretsSource),
            Arc::new(LoggingSnapshotStore),
        )
        .with_default_services(),
    );

    // Run the pipeline on its own task so a defect in the orchestrator
    // itself maps to the critical exit code instead of a crash.
    let boot_task = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.boot(scope).await })
    };
    let report = match boot_task.await {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "boot task died unexpectedly");
            std::process::exit(CRITICAL_EXIT_CODE);
        }
    };

    if let Err(err) = LoggingReportSink.write(&report) {
        error!(error = %err, "failed to write boot report");
    }

    let exit_code = report.exit_code();
    if exit_code == 0 && scope == BootScope::Full {
        info!("runtime is up. Press Ctrl+C to stop.");
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to wait for shutdown signal");
        }
        orchestrator.shutdown().await;
    }

    std::process::exit(exit_code);
}
