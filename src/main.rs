use anyhow::Context;
use stacks_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load stacks settings")?;

    stacks_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "stacks-app bootstrap starting"
    );

    stacks_app::run(settings).await
}
