// Binary capture log
//
// Layout (all little-endian):
//   file header:  "ADAT" | u16 version | u32 sample_rate_hz | u16 channels | u16 gain
//   each record:  u64 timestamp_ms | u32 sample_count | sample_count × i16

use std::io::{self, Read, Write};

use crate::config::{SamplingConfig, MAX_SAMPLES_PER_WINDOW};

pub const MAGIC: [u8; 4] = *b"ADAT";
pub const VERSION: u16 = 1;

/// Acquisition parameters stored once at the start of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryHeader {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub gain: u16,
}

impl BinaryHeader {
    pub fn from_sampling(sampling: &SamplingConfig) -> Self {
        Self {
            sample_rate_hz: sampling.sample_rate_hz,
            channels: sampling.channels,
            gain: sampling.gain,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&MAGIC)?;
        out.write_all(&VERSION.to_le_bytes())?;
        out.write_all(&self.sample_rate_hz.to_le_bytes())?;
        out.write_all(&self.channels.to_le_bytes())?;
        out.write_all(&self.gain.to_le_bytes())
    }

    pub fn read_from<R: Read>(input: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        input.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(invalid_data("not a capture log (bad magic)"));
        }
        let version = read_u16(input)?;
        if version != VERSION {
            return Err(invalid_data(&format!("unsupported log version {}", version)));
        }
        Ok(Self {
            sample_rate_hz: read_u32(input)?,
            channels: read_u16(input)?,
            gain: read_u16(input)?,
        })
    }
}

/// One decoded capture window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRecord {
    pub timestamp_ms: u64,
    pub samples: Vec<i16>,
}

/// Append one capture record
pub fn write_capture<W: Write>(out: &mut W, timestamp_ms: u64, samples: &[i16]) -> io::Result<()> {
    let count = u32::try_from(samples.len())
        .map_err(|_| invalid_data("capture window too large for one record"))?;
    out.write_all(&timestamp_ms.to_le_bytes())?;
    out.write_all(&count.to_le_bytes())?;

    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    out.write_all(&bytes)
}

/// Decode a whole capture log
///
/// A truncated trailing record (power lost mid-write) is an error, as is a
/// sample count larger than any window the device can acquire.
pub fn read_binary_log<R: Read>(mut input: R) -> io::Result<(BinaryHeader, Vec<CaptureRecord>)> {
    let header = BinaryHeader::read_from(&mut input)?;
    let mut records = Vec::new();

    while let Some(first) = read_first_byte(&mut input)? {
        let mut ts = [0u8; 8];
        ts[0] = first;
        input.read_exact(&mut ts[1..]).map_err(truncated)?;

        let count = read_u32(&mut input).map_err(truncated)? as usize;
        if count > MAX_SAMPLES_PER_WINDOW {
            return Err(invalid_data(&format!(
                "record claims {} samples, more than one window can hold",
                count
            )));
        }
        let mut bytes = vec![0u8; count * 2];
        input.read_exact(&mut bytes).map_err(truncated)?;

        records.push(CaptureRecord {
            timestamp_ms: u64::from_le_bytes(ts),
            samples: bytes
                .chunks_exact(2)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        });
    }

    Ok((header, records))
}

/// `None` at a clean end of file
fn read_first_byte<R: Read>(input: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match input.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

fn truncated(err: io::Error) -> io::Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        invalid_data("truncated capture record")
    } else {
        err
    }
}

fn read_u16<R: Read>(input: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    input.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(input: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn invalid_data(reason: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, reason.to_string())
}
