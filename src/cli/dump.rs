use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::blob::Blob;
use crate::cli::{debug, error, exit_code_for, util, Cli};
use crate::conf::DumpConfig;
use crate::firmware::Firmware;
use crate::resource::Resource;
use crate::section::Section;

#[derive(Serialize)]
struct ResourceSummary {
    id: u16,
    kind: String,
    len: usize,
    preview: String,
}

#[derive(Serialize)]
struct SectionSummary {
    name: String,
    version: u32,
    len: usize,
    resources: Vec<ResourceSummary>,
}

#[derive(Serialize)]
struct FirmwareSummary {
    kind: String,
    sections: Vec<SectionSummary>,
}

#[derive(Serialize)]
struct DumpSummaryJson {
    image_version: Option<u32>,
    block_size: Option<u32>,
    sequence_per_session: Option<u32>,
    firmware: FirmwareSummary,
}

fn resource_kind_name(r: &Resource) -> String {
    match r {
        Resource::Bitmap { .. } => "BITMAP".to_string(),
        Resource::Sound { .. } => "SOUND".to_string(),
        Resource::Opaque { kind, .. } => format!("OPAQUE(0x{kind:02X})"),
    }
}

fn preview_hex(data: &[u8], cfg: &DumpConfig) -> String {
    let n = data.len().min(cfg.preview_len);
    hex::encode(&data[..n])
}

fn summarize(firmware: &Firmware, cfg: &DumpConfig) -> FirmwareSummary {
    let sections = firmware
        .sections
        .iter()
        .map(|s| {
            let resources = match s {
                Section::Resource(rs) => rs
                    .resources
                    .iter()
                    .map(|r| ResourceSummary {
                        id: r.id(),
                        kind: resource_kind_name(r),
                        len: r.data().len(),
                        preview: preview_hex(r.data(), cfg),
                    })
                    .collect(),
                Section::Generic(_) => vec![],
            };
            SectionSummary {
                name: String::from_utf8_lossy(&s.name()).into_owned(),
                version: s.version(),
                len: s.payload_bytes().len(),
                resources,
            }
        })
        .collect();
    FirmwareSummary {
        kind: format!("{:?}", firmware.kind),
        sections,
    }
}

fn print_human(cfg: &DumpConfig, firmware: &Firmware) {
    println!("{} {} {}", "=".repeat(20), "Firmware".bold(), "=".repeat(20));
    println!("kind: {}", format!("{:?}", firmware.kind).cyan());

    for (i, section) in firmware.sections.iter().enumerate() {
        let name = String::from_utf8_lossy(&section.name()).into_owned();
        let label = if cfg.show_offsets {
            format!("#{i} {name}")
        } else {
            name
        };
        println!(
            "\n[{}] v{} ({} bytes)",
            label.bold(),
            section.version(),
            section.payload_bytes().len()
        );

        let Section::Resource(rs) = section else {
            continue;
        };
        for r in &rs.resources {
            println!(
                "  - id=0x{:04X} kind={} len={} data={}",
                r.id(),
                resource_kind_name(r),
                r.data().len(),
                preview_hex(r.data(), cfg)
            );
            if cfg.show_palette {
                if let Some(palette) = r.palette() {
                    println!("    palette:\n{}", pretty_hex::pretty_hex(&palette));
                }
            }
        }
    }
}

/// Decodes `file` and prints a section/resource summary, either as colored
/// text or (with `json`) as a machine-readable `DumpSummaryJson`. Returns
/// the process exit code (§10.3).
pub fn main(
    cli: &Cli,
    file: &Option<PathBuf>,
    as_firmware: bool,
    json: bool,
    config: &Option<PathBuf>,
) -> i32 {
    let Some(file) = file else {
        return 2;
    };

    let cfg = match config {
        Some(path) => match DumpConfig::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                error!("Could not load config {:#?}: {}", path.display(), err);
                return 2;
            }
        },
        None => DumpConfig::default(),
    };

    let bytes = match util::read_file(cli, file) {
        Ok(bytes) => bytes,
        Err(()) => return 2,
    };

    let (image_version, block_size, sequence_per_session, firmware) = if as_firmware {
        match Firmware::decode(&bytes) {
            Ok(fw) => (None, None, None, fw),
            Err(err) => {
                error!("Decode failed: {}", err);
                return exit_code_for(&err);
            }
        }
    } else {
        match Blob::decode(&bytes) {
            Ok(blob) => (
                Some(blob.image_version),
                Some(blob.block_size),
                Some(blob.sequence_per_session),
                blob.firmware,
            ),
            Err(err) => {
                error!("Decode failed: {}", err);
                return exit_code_for(&err);
            }
        }
    };

    debug!(cli, "Decoded {} section(s)", firmware.sections.len());

    if json {
        let out = DumpSummaryJson {
            image_version,
            block_size,
            sequence_per_session,
            firmware: summarize(&firmware, &cfg),
        };
        match serde_json::to_string_pretty(&out) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                error!("Could not serialize summary: {}", err);
                return 2;
            }
        }
    } else {
        print_human(&cfg, &firmware);
    }

    0
}
