use publish_directory::presentation::cli::CliApp;

fn main() -> anyhow::Result<()> {
    // Logging is initialized by the CLI once verbosity is known
    let app = CliApp::new();
    app.run()
}
