use mentorship_api::configuration::get_configuration;
use mentorship_api::startup::Application;
use mentorship_api::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("mentorship-api".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration.");
    let application = Application::build(configuration.clone()).await?;
    tracing::info!(
        "Server running on port {}, API docs available at /api-docs",
        application.port()
    );
    application.run_until_stopped(configuration).await?;
    Ok(())
}
