use ljmc::core::geometry::{GeometryError, SimulationBox};
use ljmc::core::models::system::ParticleSystem;
use ljmc::engine::state::TrajectorySample;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const ELEMENT: &str = "LJ";

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Frame starting on line {line} has no box length and none was supplied")]
    MissingBox { line: usize },
    #[error("Invalid box in frame starting on line {line}: {source}")]
    InvalidBox {
        line: usize,
        #[source]
        source: GeometryError,
    },
    #[error("File contains no frames")]
    Empty,
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid particle count '{0}'")]
    InvalidCount(String),
    #[error("Invalid float value '{0}'")]
    InvalidFloat(String),
    #[error("Invalid value '{value}' for comment key '{key}'")]
    InvalidComment { key: String, value: String },
    #[error("Particle record needs an element and three coordinates")]
    ShortRecord,
    #[error("Unexpected end of file inside a frame")]
    Truncated,
}

/// A single frame of a multi-frame XYZ trajectory.
///
/// The comment line carries `step=<n> energy=<E> box=<L>`; every key is optional on read.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzFrame {
    pub step: Option<u64>,
    pub energy: Option<f64>,
    pub system: ParticleSystem,
}

impl From<&TrajectorySample> for XyzFrame {
    fn from(sample: &TrajectorySample) -> Self {
        Self {
            step: Some(sample.step),
            energy: Some(sample.energy),
            system: sample.system.clone(),
        }
    }
}

pub struct XyzFile;

impl XyzFile {
    /// Reads every frame from `reader`.
    ///
    /// `fallback_box` is used for frames whose comment line lacks a `box=` entry.
    pub fn read_from(
        reader: &mut impl BufRead,
        fallback_box: Option<f64>,
    ) -> Result<Vec<XyzFrame>, XyzError> {
        let mut frames = Vec::new();
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));

        while let Some((count_line, count_res)) = lines.next() {
            let count_str = count_res?;
            let count_str = count_str.trim();
            if count_str.is_empty() {
                continue;
            }
            let count: usize = count_str.parse().map_err(|_| XyzError::Parse {
                line: count_line,
                kind: XyzParseErrorKind::InvalidCount(count_str.to_string()),
            })?;

            let (comment_line, comment) = match lines.next() {
                Some((n, res)) => (n, res?),
                None => {
                    return Err(XyzError::Parse {
                        line: count_line,
                        kind: XyzParseErrorKind::Truncated,
                    });
                }
            };
            let header = parse_comment(&comment).map_err(|kind| XyzError::Parse {
                line: comment_line,
                kind,
            })?;

            let box_length = header
                .box_length
                .or(fallback_box)
                .ok_or(XyzError::MissingBox { line: count_line })?;
            let simulation_box = SimulationBox::new(box_length).map_err(|source| {
                XyzError::InvalidBox {
                    line: count_line,
                    source,
                }
            })?;

            // The header count is untrusted; grow with the records actually present.
            let coordinates = (0..count)
                .map(|_| {
                    let (n, res) = lines.next().ok_or(XyzError::Parse {
                        line: count_line,
                        kind: XyzParseErrorKind::Truncated,
                    })?;
                    let record = res?;
                    parse_record(&record).map_err(|kind| XyzError::Parse { line: n, kind })
                })
                .collect::<Result<Vec<_>, XyzError>>()?;

            frames.push(XyzFrame {
                step: header.step,
                energy: header.energy,
                system: ParticleSystem::from_arrays(simulation_box, &coordinates),
            });
        }

        Ok(frames)
    }

    pub fn write_frame(frame: &XyzFrame, writer: &mut impl Write) -> Result<(), XyzError> {
        let system = &frame.system;
        writeln!(writer, "{}", system.len())?;

        let mut comment = Vec::with_capacity(3);
        if let Some(step) = frame.step {
            comment.push(format!("step={}", step));
        }
        if let Some(energy) = frame.energy {
            comment.push(format!("energy={:.10}", energy));
        }
        comment.push(format!("box={}", system.simulation_box().length()));
        writeln!(writer, "{}", comment.join(" "))?;

        for p in system.positions() {
            writeln!(
                writer,
                "{:<4}{:>16.8}{:>16.8}{:>16.8}",
                ELEMENT, p.x, p.y, p.z
            )?;
        }
        Ok(())
    }

    pub fn write_to<'a>(
        frames: impl IntoIterator<Item = &'a XyzFrame>,
        writer: &mut impl Write,
    ) -> Result<(), XyzError> {
        for frame in frames {
            Self::write_frame(frame, writer)?;
        }
        Ok(())
    }

    pub fn read_from_path<P: AsRef<Path>>(
        path: P,
        fallback_box: Option<f64>,
    ) -> Result<Vec<XyzFrame>, XyzError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, fallback_box)
    }

    /// Last frame of the file, used to continue a previous run.
    pub fn read_last_frame_from_path<P: AsRef<Path>>(
        path: P,
        fallback_box: Option<f64>,
    ) -> Result<XyzFrame, XyzError> {
        Self::read_from_path(path, fallback_box)?
            .pop()
            .ok_or(XyzError::Empty)
    }

    /// Writes every sample to `path` as one frame each.
    pub fn write_samples_to_path<P: AsRef<Path>>(
        samples: &[TrajectorySample],
        path: P,
    ) -> Result<(), XyzError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let frames: Vec<XyzFrame> = samples.iter().map(XyzFrame::from).collect();
        Self::write_to(&frames, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Default)]
struct CommentHeader {
    step: Option<u64>,
    energy: Option<f64>,
    box_length: Option<f64>,
}

fn parse_comment(comment: &str) -> Result<CommentHeader, XyzParseErrorKind> {
    let mut header = CommentHeader::default();
    for token in comment.split_whitespace() {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let invalid = || XyzParseErrorKind::InvalidComment {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "step" => header.step = Some(value.parse().map_err(|_| invalid())?),
            "energy" => header.energy = Some(value.parse().map_err(|_| invalid())?),
            "box" => header.box_length = Some(value.parse().map_err(|_| invalid())?),
            _ => {}
        }
    }
    Ok(header)
}

fn parse_record(record: &str) -> Result<[f64; 3], XyzParseErrorKind> {
    let fields: Vec<&str> = record.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzParseErrorKind::ShortRecord);
    }
    let mut xyz = [0.0; 3];
    for (slot, field) in xyz.iter_mut().zip(&fields[1..4]) {
        *slot = field
            .parse()
            .map_err(|_| XyzParseErrorKind::InvalidFloat(field.to_string()))?;
    }
    Ok(xyz)
}
