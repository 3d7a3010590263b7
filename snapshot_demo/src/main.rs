use snapshot_demo::config::parse_cli_args;
use snapshot_demo::scenario;

fn main() {
    observability::init_logging();

    let config = parse_cli_args();
    tracing::info!(
        format = %config.persistence.format,
        save_dir = %config.persistence.save_dir,
        "Snapshot demo starting..."
    );

    match scenario::run(&config) {
        Ok(outcome) => {
            tracing::info!(
                path = %outcome.path.display(),
                entities = outcome.report.entities,
                components = outcome.report.components,
                contexts = outcome.report.contexts,
                "Restore complete"
            );
            tracing::info!(
                position_x = outcome.position_x,
                velocity_x = outcome.velocity_x,
                position_context_set = outcome.position_context_set,
                frozen_kept = outcome.frozen_kept,
                "Restored state"
            );
        }
        Err(e) => {
            tracing::error!("Snapshot demo failed: {}", e);
            std::process::exit(1);
        }
    }
}
