// Builds the detector, then generates 113Sn primaries and prints the line
// spectrum. An optional argument names a settings JSON file.
use std::time::Instant;
use ucnsim::*;

fn main() {
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("cannot read {}: {}", path, e);
                std::process::exit(1);
            });
            Settings::from_json_str(&text).unwrap_or_else(|e| {
                eprintln!("bad settings: {}", e);
                std::process::exit(1);
            })
        }
        None => Settings {
            events: 100_000,
            ..Settings::default()
        },
    };

    let start = Instant::now();
    let detector = match DetectorConstruction::from_global() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("detector construction failed: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "Detector: {} logical volumes, {} physical volumes ({:.1?})",
        detector.geometry.logical_count(),
        detector.geometry.physical_count(),
        start.elapsed()
    );

    let table = settings.source.table.clone();
    let mut counts = vec![0u64; table.branches().len()];
    let mut failures = 0u64;
    let mut generator = settings.generator();
    let start = Instant::now();
    for _ in 0..settings.events {
        match generator.generate_primaries() {
            Ok(event) => {
                if let Some(i) = table
                    .branches()
                    .iter()
                    .position(|b| b.species == event.species && b.energy == event.energy)
                {
                    counts[i] += 1;
                }
            }
            Err(_) => failures += 1,
        }
    }
    let elapsed = start.elapsed();

    println!("{:>10} {:>12} {:>10} {:>10}", "species", "energy/keV", "observed", "expected");
    for (i, branch) in table.branches().iter().enumerate() {
        let observed = counts[i] as f64 / settings.events as f64;
        let expected = table.probability(i).unwrap_or(0.0);
        println!(
            "{:>10} {:>12.3} {:>10.5} {:>10.5}",
            branch.species,
            branch.energy / units::KEV,
            observed,
            expected
        );
    }
    println!(
        "{} events in {:.2?} ({} failed, {} out-of-range draws)",
        settings.events,
        elapsed,
        failures,
        generator.anomalies()
    );
}
