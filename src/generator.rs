//! Synthetic dataset generation
//!
//! Writes observation files with the ingestion schema for demos and load
//! testing. Distribution shapes follow a plausible classroom: the center zone
//! holds more students, neutral is the dominant emotion, and each zone's yaw
//! leans toward a common focal point. Output is seeded and reproducible.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use rand::prelude::*;

use crate::error::EngineError;

const REGIONS: [(&str, [&str; 5]); 4] = [
    (
        "North",
        [
            "IIT Delhi",
            "DTU Delhi",
            "NIT Kurukshetra",
            "IIIT Delhi",
            "Punjab Engineering College",
        ],
    ),
    (
        "South",
        [
            "IIT Madras",
            "NIT Trichy",
            "VIT Vellore",
            "PSG Tech Coimbatore",
            "SRM University",
        ],
    ),
    (
        "East",
        [
            "IIT Kharagpur",
            "NIT Durgapur",
            "KIIT Bhubaneswar",
            "Jadavpur University",
            "BIT Mesra",
        ],
    ),
    (
        "West",
        [
            "IIT Bombay",
            "VJTI Mumbai",
            "BITS Pilani",
            "COEP Pune",
            "IIT Gandhinagar",
        ],
    ),
];

const ZONES: [&str; 3] = ["left", "center", "right"];
const ZONE_WEIGHTS: [f64; 3] = [0.30, 0.40, 0.30];

const EMOTIONS: [&str; 7] = [
    "neutral", "happy", "sad", "angry", "surprise", "fear", "disgust",
];
const EMOTION_WEIGHTS: [f64; 7] = [0.50, 0.15, 0.10, 0.05, 0.10, 0.05, 0.05];

/// Generate `records` synthetic observations into a CSV file at `path`.
///
/// The same seed always produces the same file.
pub fn generate_dataset(path: &Path, records: u64, seed: u64) -> Result<(), EngineError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(
        out,
        "face_id,region,college_name,zone,emotion,confidence,pose.pitch,pose.yaw,pose.roll"
    )?;

    let per_region = records / REGIONS.len() as u64;
    let remainder = records % REGIONS.len() as u64;
    let mut face_id: u64 = 0;

    for (index, (region, colleges)) in REGIONS.iter().enumerate() {
        let mut count = per_region;
        if index == REGIONS.len() - 1 {
            count += remainder;
        }

        for _ in 0..count {
            face_id += 1;

            let college = colleges[rng.gen_range(0..colleges.len())];
            let zone = pick_weighted(&mut rng, &ZONES, &ZONE_WEIGHTS);
            let emotion = pick_weighted(&mut rng, &EMOTIONS, &EMOTION_WEIGHTS);
            let confidence: f64 = rng.gen_range(0.85..=1.0);

            // Each zone looks toward a shared focal point at the front.
            let yaw_mean = match zone {
                "left" => 15.0,
                "center" => 0.0,
                _ => -15.0,
            };
            let yaw = sample_normal(&mut rng, yaw_mean, 5.0);
            let pitch = sample_normal(&mut rng, 5.0, 10.0);
            let roll = sample_normal(&mut rng, 0.0, 5.0);

            writeln!(
                out,
                "face_{},{},{},{},{},{:.2},{:.2},{:.2},{:.2}",
                face_id, region, college, zone, emotion, confidence, pitch, yaw, roll
            )?;
        }
    }

    out.flush()?;
    info!("generated {} records into {}", face_id, path.display());
    Ok(())
}

fn pick_weighted<'a>(rng: &mut StdRng, items: &[&'a str], weights: &[f64]) -> &'a str {
    let total: f64 = weights.iter().sum();
    let mut roll = rng.gen::<f64>() * total;

    for (item, weight) in items.iter().zip(weights) {
        if roll < *weight {
            return item;
        }
        roll -= weight;
    }
    items[items.len() - 1]
}

/// Box-Muller normal sample
fn sample_normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std_dev * z
}
