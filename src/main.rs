// Entrypoint: set up logging, load config, run the pipeline once and map
// the result to the process exit code. Nothing in the library calls
// `std::process::exit`.

use hrx_submit::api::ApiClient;
use hrx_submit::config::{self, LogFormat};
use hrx_submit::pipeline::{run_to_exit_code, Pipeline};
use hrx_submit::recorder::FileRecorder;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_logging();

    ExitCode::from(run_to_exit_code(run))
}

fn run() -> anyhow::Result<u8> {
    let config = config::load_from_env()?;
    config.print_summary();

    let api = ApiClient::new(config.http_timeout)?;

    let mut pipeline = Pipeline::new(&api, &config);
    if let Some(path) = &config.output_path {
        pipeline = pipeline.with_recorder(FileRecorder::new(path));
    }

    let code = match pipeline.run() {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            tracing::error!("Submission flow failed: {e}");
            e.exit_code()
        }
    };
    Ok(code)
}

// Logging comes up before the config is loaded so config errors are logged.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
