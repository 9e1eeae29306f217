use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use facegraph_core::graph::infrastructure::graph_store::GraphStore;
use facegraph_core::inference::domain::face_detector::FaceDetector;
use facegraph_core::inference::domain::inference_session::InferenceSession;
use facegraph_core::inference::domain::tensor_codec::TensorCodec;
use facegraph_core::inference::infrastructure::inference_worker::InferenceWorker;
use facegraph_core::inference::infrastructure::ort_engine::OrtEngine;
use facegraph_core::pipeline::detect_faces_use_case::DetectFacesUseCase;
use facegraph_core::pipeline::image_source::FileImageSource;
use facegraph_core::pipeline::pipeline_logger::StatsPipelineLogger;
use facegraph_core::shared::detector_config::{DetectorConfig, ExecutionProviderKind};
use facegraph_core::shared::detector_error::DetectorError;

/// Repeatedly runs a frozen face-detection graph on an image file.
#[derive(Parser, Debug)]
#[command(name = "facegraph")]
struct Cli {
    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serialized graph artifact.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Encoded image re-read on every iteration.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Name of the graph's image input.
    #[arg(long)]
    input_name: Option<String>,

    /// Name of the graph's bounding-box output.
    #[arg(long)]
    bboxes_name: Option<String>,

    /// Name of the graph's score output.
    #[arg(long)]
    scores_name: Option<String>,

    /// Stop after this many iterations (default: run until killed).
    #[arg(long)]
    iterations: Option<usize>,

    /// Pause between iterations in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Per-inference deadline in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Intra-op threads for the execution engine.
    #[arg(long)]
    threads: Option<usize>,

    /// Execution provider: cpu or platform.
    #[arg(long)]
    provider: Option<ExecutionProviderKind>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("{}", error_message(e.as_ref()));
        process::exit(1);
    }
}

fn error_message(e: &(dyn std::error::Error + 'static)) -> String {
    match e.downcast_ref::<DetectorError>() {
        Some(detector_error) if detector_error.is_fatal() => {
            format!("Failed to start detector: {e}")
        }
        _ => format!("Error: {e}"),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    config.validate()?;
    log::debug!("Configuration: {config:?}");

    let store = GraphStore::load(&config.graph_path)?;
    let engine = OrtEngine::new(config.intra_threads, config.execution_provider);
    let session = InferenceSession::open(&engine, &store, &config.tensor_names)?
        .with_codec(TensorCodec::new(config.max_image_bytes));

    match config.timeout_ms {
        Some(ms) => {
            let worker =
                InferenceWorker::spawn(session)?.with_timeout(Some(Duration::from_millis(ms)));
            run_loop(&config, &worker);
            report_close(worker.shutdown());
        }
        None => {
            run_loop(&config, &session);
            report_close(session.close());
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<DetectorConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };

    if let Some(graph) = &cli.graph {
        config.graph_path = graph.clone();
    }
    if let Some(image) = &cli.image {
        config.image_path = image.clone();
    }
    if let Some(name) = &cli.input_name {
        config.tensor_names.input = name.clone();
    }
    if let Some(name) = &cli.bboxes_name {
        config.tensor_names.bboxes = name.clone();
    }
    if let Some(name) = &cli.scores_name {
        config.tensor_names.scores = name.clone();
    }
    if cli.iterations.is_some() {
        config.max_iterations = cli.iterations;
    }
    if let Some(ms) = cli.interval_ms {
        config.poll_interval_ms = ms;
    }
    if cli.timeout_ms.is_some() {
        config.timeout_ms = cli.timeout_ms;
    }
    if let Some(threads) = cli.threads {
        config.intra_threads = threads;
    }
    if let Some(provider) = cli.provider {
        config.execution_provider = provider;
    }

    Ok(config)
}

fn run_loop(config: &DetectorConfig, detector: &dyn FaceDetector) {
    let mut use_case = DetectFacesUseCase::new(
        Box::new(FileImageSource::new(&config.image_path)),
        detector,
        Box::new(StatsPipelineLogger::default()),
    )
    .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
    .with_max_iterations(config.max_iterations);

    let summary = use_case.execute();
    log::info!(
        "Finished after {} iterations: {} detections, {} read failures, {} inference failures",
        summary.iterations,
        summary.detections_ok,
        summary.read_failures,
        summary.detect_failures
    );
}

// Close failures are reported but never block shutdown.
fn report_close(result: Result<(), DetectorError>) {
    if let Err(e) = result {
        log::error!("Failed to close inference session: {e}");
    }
}
