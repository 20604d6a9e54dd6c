// Uniformity of emission directions and foil positions.

use std::f64::consts::PI;
use ucnsim::stats::sample_disk;
use ucnsim::{AngularDistribution, DecaySource, FastRng, SourceGeometry};

const SAMPLES: usize = 200_000;
const BINS: usize = 20;

fn chi_square(counts: &[usize], total: usize) -> f64 {
    let expected = total as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum()
}

fn bin(value: f64, lo: f64, hi: f64) -> usize {
    (((value - lo) / (hi - lo)) * BINS as f64).floor().clamp(0.0, (BINS - 1) as f64) as usize
}

#[test]
fn test_isotropic_cosine_and_azimuth_are_uniform() {
    let iso = AngularDistribution::Isotropic;
    let mut rng = FastRng::new(2024);
    let mut cos_counts = [0usize; BINS];
    let mut phi_counts = [0usize; BINS];
    for _ in 0..SAMPLES {
        let d = iso.sample(&mut rng);
        let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        cos_counts[bin(d[2], -1.0, 1.0)] += 1;
        phi_counts[bin(d[1].atan2(d[0]), -PI, PI)] += 1;
    }
    // 19 degrees of freedom; 50 is past the 1e-4 quantile
    assert!(chi_square(&cos_counts, SAMPLES) < 50.0, "cos bins {:?}", cos_counts);
    assert!(chi_square(&phi_counts, SAMPLES) < 50.0, "phi bins {:?}", phi_counts);
}

#[test]
fn test_isotropic_cosine_ks_statistic() {
    let iso = AngularDistribution::Isotropic;
    let mut rng = FastRng::new(7);
    let n = 100_000;
    let mut cosines: Vec<f64> = (0..n).map(|_| iso.sample(&mut rng)[2]).collect();
    cosines.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let d = cosines
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let cdf = 0.5 * (c + 1.0);
            (cdf - i as f64 / n as f64).abs().max(((i + 1) as f64 / n as f64 - cdf).abs())
        })
        .fold(0.0, f64::max);
    // critical value at alpha = 1e-3 is about 1.95 / sqrt(n)
    assert!(d < 1.95 / (n as f64).sqrt(), "KS distance {}", d);
}

#[test]
fn test_disk_radius_squared_is_uniform() {
    let radius = 3.0;
    let mut rng = FastRng::new(31);
    let mut counts = [0usize; BINS];
    let mut angle_counts = [0usize; BINS];
    for _ in 0..SAMPLES {
        let [x, y] = sample_disk(radius, &mut rng).unwrap();
        let r2 = x * x + y * y;
        assert!(r2 <= radius * radius);
        counts[bin(r2, 0.0, radius * radius)] += 1;
        angle_counts[bin(y.atan2(x), -PI, PI)] += 1;
    }
    assert!(chi_square(&counts, SAMPLES) < 50.0, "r2 bins {:?}", counts);
    assert!(chi_square(&angle_counts, SAMPLES) < 50.0, "angle bins {:?}", angle_counts);
}

#[test]
fn test_default_foil_positions_stay_inside() {
    let source = DecaySource::new();
    let mut rng = FastRng::new(5);
    for _ in 0..1000 {
        let p = source.sample(&mut rng).unwrap().position;
        assert!(p[0].hypot(p[1]) <= 3.0);
        assert_eq!(p[2], 0.0);
    }
}

#[test]
fn test_point_source_consumes_no_position_draws() {
    let mut rng = FastRng::new(77);
    let before = rng.state();
    assert_eq!(sample_disk(0.0, &mut rng).unwrap(), [0.0, 0.0]);
    assert_eq!(rng.state(), before);

    let point = DecaySource::new().with_geometry(SourceGeometry::point([1.0, 2.0, 3.0]));
    let event = point.sample(&mut rng).unwrap();
    assert_eq!(event.position, [1.0, 2.0, 3.0]);
}
