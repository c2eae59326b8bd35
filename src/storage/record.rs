// Log records and their on-card encodings

use serde::Serialize;
use std::io::{self, Write};

use super::binary::BinaryHeader;
use crate::analysis::stats::SummaryStats;
use crate::config::{DeviceConfig, PipelineMode};

/// Header row of the prediction log
pub const PREDICTION_CSV_HEADER: &str = "timestamp,win_std_dev,prediction";

/// Header row of the summary statistics log
pub const SUMMARY_CSV_HEADER: &str = "timestamp,n_samples,mean,std_dev,min,max";

/// One duty cycle's worth of output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord<'a> {
    /// Window standard deviation plus classifier decision
    Prediction {
        timestamp_ms: u64,
        win_std_dev: f32,
        prediction: bool,
    },
    /// Summary statistics only
    Summary {
        timestamp_ms: u64,
        stats: SummaryStats,
    },
    /// Raw window samples
    Capture {
        timestamp_ms: u64,
        samples: &'a [i16],
    },
}

impl LogRecord<'_> {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            LogRecord::Prediction { timestamp_ms, .. }
            | LogRecord::Summary { timestamp_ms, .. }
            | LogRecord::Capture { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

/// File layout of the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `timestamp,win_std_dev,prediction`
    PredictionCsv,
    /// `timestamp,n_samples,mean,std_dev,min,max`
    SummaryCsv,
    /// Binary header followed by raw capture records
    Binary(BinaryHeader),
}

impl LogFormat {
    /// Layout matching the configured pipeline mode
    pub fn for_config(config: &DeviceConfig) -> Self {
        match config.pipeline.mode {
            PipelineMode::Classify => LogFormat::PredictionCsv,
            PipelineMode::Summary => LogFormat::SummaryCsv,
            PipelineMode::Capture => LogFormat::Binary(BinaryHeader::from_sampling(
                &config.sampling,
            )),
        }
    }

    /// Whether records of this kind belong in this log
    pub fn accepts(&self, record: &LogRecord<'_>) -> bool {
        matches!(
            (self, record),
            (LogFormat::PredictionCsv, LogRecord::Prediction { .. })
                | (LogFormat::SummaryCsv, LogRecord::Summary { .. })
                | (LogFormat::Binary(_), LogRecord::Capture { .. })
        )
    }

    /// Written once, when the file is created
    pub fn write_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            LogFormat::PredictionCsv => writeln!(out, "{}", PREDICTION_CSV_HEADER),
            LogFormat::SummaryCsv => writeln!(out, "{}", SUMMARY_CSV_HEADER),
            LogFormat::Binary(header) => header.write_to(out),
        }
    }

    /// Encode one record
    pub fn write_record<W: Write>(&self, out: &mut W, record: &LogRecord<'_>) -> io::Result<()> {
        match record {
            LogRecord::Prediction {
                timestamp_ms,
                win_std_dev,
                prediction,
            } => writeln!(
                out,
                "{},{:.2},{}",
                timestamp_ms,
                win_std_dev,
                u8::from(*prediction)
            ),
            LogRecord::Summary {
                timestamp_ms,
                stats,
            } => writeln!(
                out,
                "{},{},{:.2},{:.2},{},{}",
                timestamp_ms, stats.n_samples, stats.mean, stats.std_dev, stats.min, stats.max
            ),
            LogRecord::Capture {
                timestamp_ms,
                samples,
            } => super::binary::write_capture(out, *timestamp_ms, samples),
        }
    }
}
