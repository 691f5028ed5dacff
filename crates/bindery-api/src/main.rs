use bindery_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    bindery_api::init_telemetry();

    // Best-effort Landlock sandboxing on Linux. Needs the storage root from
    // the config, so it runs after the environment is read.
    bindery_api::landlock_linux::init(config.local_storage_path());

    // Initialize the application (database, services, routes)
    let (_state, router) = bindery_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    bindery_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
