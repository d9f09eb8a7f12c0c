#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Run the board application; persistence tasks spawn onto this runtime
    stackboard::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
