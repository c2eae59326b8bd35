use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use audio_logger::analysis::{DutyCyclePipeline, ModelParameters};
use audio_logger::audio::{self, AnalogSource, Sampler, SyntheticSource, WavSource, Waveform};
use audio_logger::config::{DeviceConfig, PipelineMode};
use audio_logger::platform::{LogLed, ManualTimer, SystemTimer};
use audio_logger::storage::{read_binary_log, DirectoryStorage};
use audio_logger::{init_logging, Device, DeviceState};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "audio_logger",
    about = "Duty-cycled acoustic classification logger"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Boot the logger and run the duty-cycle loop
    Run {
        /// Device configuration (defaults to the classification logger preset)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Model weights overriding the built-in parameters
        #[arg(long)]
        model: Option<PathBuf>,
        /// Analog input: mic, synthetic or wav:PATH
        #[arg(long, default_value = "mic")]
        source: String,
        /// Stop after this many steps instead of running until killed
        #[arg(long)]
        cycles: Option<u64>,
        /// Exit with status 3 once the device enters the fail state
        #[arg(long)]
        exit_on_failure: bool,
    },
    /// Run one window of a WAV file through the pipeline and print the record
    ClassifyWav {
        #[arg(long)]
        wav: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Load and validate a configuration and the model parameters
    ValidateConfig {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Decode a binary capture log into one WAV file per window
    ExportWav {
        #[arg(long)]
        log: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            model,
            source,
            cycles,
            exit_on_failure,
        } => run_device(config, model, &source, cycles, exit_on_failure),
        Commands::ClassifyWav { wav, config, model } => run_classify_wav(&wav, config, model),
        Commands::ValidateConfig { config, model } => run_validate(&config, model),
        Commands::ExportWav { log, out } => run_export(&log, &out),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<DeviceConfig> {
    match path {
        Some(path) => DeviceConfig::load_from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DeviceConfig::default()),
    }
}

/// Model parameters for `config`, or `None` when the mode needs none
fn load_model(config: &DeviceConfig, path: Option<PathBuf>) -> Result<Option<ModelParameters>> {
    if config.pipeline.mode != PipelineMode::Classify {
        return Ok(None);
    }
    let params = match path {
        Some(path) => ModelParameters::load_from_file(&path)
            .with_context(|| format!("loading model {}", path.display()))?,
        None => ModelParameters::builtin().context("parsing built-in model parameters")?,
    };
    Ok(Some(params))
}

fn open_source(spec: &str, config: &DeviceConfig) -> Result<Box<dyn AnalogSource>> {
    let rate = config.sampling.sample_rate_hz;
    match spec {
        "mic" => audio::default_source(&config.sampling).context("opening microphone"),
        "synthetic" => Ok(Box::new(SyntheticSource::new(
            rate,
            Waveform::WhiteNoise {
                amplitude: 4_000,
                seed: 0x5eed,
            },
        ))),
        other => match other.strip_prefix("wav:") {
            Some(path) => {
                let source = WavSource::open(path)
                    .with_context(|| format!("opening WAV source {}", path))?;
                warn_on_rate_mismatch(&source, rate);
                Ok(Box::new(source.looping(true)))
            }
            None => bail!("unknown source '{}', expected mic, synthetic or wav:PATH", other),
        },
    }
}

/// Samples are consumed as if taken at the configured rate
fn warn_on_rate_mismatch(source: &WavSource, config_rate: u32) {
    if source.sample_rate() != config_rate {
        tracing::warn!(
            wav_rate = source.sample_rate(),
            config_rate,
            "WAV sample rate differs from configured rate"
        );
    }
}

fn run_device(
    config_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    source: &str,
    cycles: Option<u64>,
    exit_on_failure: bool,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    init_logging(config.debug);

    let model = load_model(&config, model_path)?;
    let source = open_source(source, &config)?;

    let mut device = Device::boot(
        &config,
        model,
        |storage| DirectoryStorage::mount(&storage.root, storage.chip_select),
        source,
        LogLed::new(),
        SystemTimer::new(),
    )
    .context("booting device")?;

    match (cycles, exit_on_failure) {
        (None, false) => device.run_forever(),
        (Some(steps), false) => {
            device.run_cycles(steps);
        }
        (limit, true) => {
            let mut steps = 0u64;
            while device.state() == DeviceState::Running && limit.map_or(true, |n| steps < n) {
                device.step();
                steps += 1;
            }
        }
    }

    let records = device.sink().map_or(0, |sink| sink.records_written());
    println!(
        "{} duty cycles, {} records written, state {:?}",
        device.cycles_completed(),
        records,
        device.state()
    );

    match device.state() {
        DeviceState::Running => Ok(ExitCode::from(0)),
        DeviceState::Failed => Ok(ExitCode::from(3)),
    }
}

fn run_classify_wav(
    wav: &Path,
    config_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    init_logging(config.debug);
    config.validate().context("validating config")?;

    let model = load_model(&config, model_path)?;
    let mut pipeline =
        DutyCyclePipeline::new(&config.pipeline, model).context("building pipeline")?;
    let sampler = Sampler::new(config.sampling.sample_rate_hz, config.sampling.duration_ms);
    let mut buffers = pipeline.allocate_buffers(sampler.window_len());

    let source = WavSource::open(wav).with_context(|| format!("opening {}", wav.display()))?;
    warn_on_rate_mismatch(&source, config.sampling.sample_rate_hz);
    let mut source = source.looping(true);
    let mut timer = ManualTimer::new();
    let collected = sampler
        .acquire(&mut source, &mut timer, &mut buffers.window)
        .with_context(|| format!("sampling {}", wav.display()))?;

    let record = pipeline
        .process(&mut buffers, collected, 0)
        .context("processing window")?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(ExitCode::from(0))
}

fn run_validate(config_path: &Path, model_path: Option<PathBuf>) -> Result<ExitCode> {
    let config = DeviceConfig::load_from_file(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    config.validate().context("validating config")?;

    let model = load_model(&config, model_path)?;
    if let Some(model) = &model {
        model.validate().context("validating model parameters")?;
    }

    println!(
        "{}: {:?} mode, {} samples per window, every {} ms -> {}{}",
        config_path.display(),
        config.pipeline.mode,
        config.samples_per_window(),
        config.schedule.cycle_period_ms,
        config.storage.file_name,
        model
            .map(|m| format!(", {} model features", m.n_features))
            .unwrap_or_default()
    );
    Ok(ExitCode::from(0))
}

fn run_export(log_path: &Path, out_dir: &Path) -> Result<ExitCode> {
    let file = File::open(log_path).with_context(|| format!("opening {}", log_path.display()))?;
    let (header, records) = read_binary_log(BufReader::new(file))
        .with_context(|| format!("decoding {}", log_path.display()))?;

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let spec = hound::WavSpec {
        channels: header.channels,
        sample_rate: header.sample_rate_hz,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    for (index, record) in records.iter().enumerate() {
        let path = out_dir.join(format!("capture_{:04}_{}ms.wav", index, record.timestamp_ms));
        let mut writer = hound::WavWriter::create(&path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for &sample in &record.samples {
            writer.write_sample(sample)?;
        }
        writer
            .finalize()
            .with_context(|| format!("finalizing {}", path.display()))?;
    }

    println!(
        "Exported {} windows ({} Hz, gain {}) to {}",
        records.len(),
        header.sample_rate_hz,
        header.gain,
        out_dir.display()
    );
    Ok(ExitCode::from(0))
}
