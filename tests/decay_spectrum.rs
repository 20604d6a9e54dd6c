// Statistical checks of 113Sn line selection against the tabulated intensities.

use rand::RngCore;
use std::collections::VecDeque;
use ucnsim::decay::{DecayTable, DRAWS_PER_PERCENT};
use ucnsim::particle::ParticleSpecies;
use ucnsim::units::KEV;
use ucnsim::{DecaySource, FastRng, PrimaryGenerator, SourceError};

const DRAWS: usize = 200_000;

#[test]
fn test_line_frequencies_match_intensities() {
    let table = DecayTable::sn113();
    let mut rng = FastRng::new(12345);
    let mut counts = vec![0usize; table.branches().len()];
    for _ in 0..DRAWS {
        let branch = table.sample(&mut rng).unwrap();
        let index = table
            .branches()
            .iter()
            .position(|b| b == branch)
            .unwrap();
        counts[index] += 1;
    }

    let mut chi2 = 0.0;
    for (i, &observed) in counts.iter().enumerate() {
        let expected = table.probability(i).unwrap() * DRAWS as f64;
        assert!(expected > 5.0, "branch {} too rare for the test", i);
        chi2 += (observed as f64 - expected).powi(2) / expected;
    }
    // five degrees of freedom; 30 is far beyond the 1e-4 quantile
    assert!(chi2 < 30.0, "chi2 = {} for counts {:?}", chi2, counts);
}

#[test]
fn test_gamma_fraction() {
    let source = DecaySource::new();
    let mut rng = FastRng::new(99);
    let gammas = (0..DRAWS)
        .filter(|_| source.sample(&mut rng).unwrap().species == ParticleSpecies::Gamma)
        .count();
    let fraction = gammas as f64 / DRAWS as f64;
    let expected = 64.97 / 100.7246;
    let sigma = (expected * (1.0 - expected) / DRAWS as f64).sqrt();
    assert!((fraction - expected).abs() < 5.0 * sigma, "gamma fraction {}", fraction);
}

/// Hands out queued 32-bit words, then falls back to a seeded generator.
/// Integer draws use `next_u32`; real draws use `next_u64`.
struct ScriptedRng {
    words: VecDeque<u32>,
    rest: FastRng,
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.words.pop_front().unwrap_or_else(|| self.rest.next_u32())
    }

    fn next_u64(&mut self) -> u64 {
        self.rest.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rest.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rest.try_fill_bytes(dest)
    }
}

/// Word that `gen_range(1..=range)` maps to `draw` under widening multiply.
fn word_for_draw(draw: u32, range: u32) -> u32 {
    let target = (draw - 1) as u64;
    (((target << 32) + range as u64 - 1) / range as u64) as u32
}

#[test]
fn test_percentage_fifty_is_the_gamma_line() {
    let table = DecayTable::sn113();
    let branch = table.select(50.0).unwrap();
    assert_eq!(branch.species, ParticleSpecies::Gamma);
    assert_eq!(branch.energy, 391.698 * KEV);

    let draw = (50.0 * DRAWS_PER_PERCENT as f64) as u32;
    let rng = ScriptedRng {
        words: VecDeque::from(vec![word_for_draw(draw, table.max_draw())]),
        rest: FastRng::new(50),
    };
    let mut generator = PrimaryGenerator::new(DecaySource::new(), rng);
    let event = generator.generate_primaries().unwrap();

    assert_eq!(event.species, ParticleSpecies::Gamma);
    assert_eq!(event.energy, 391.698 * KEV);
    let [u, v, w] = event.direction;
    assert!(((u * u + v * v + w * w).sqrt() - 1.0).abs() < 1e-12);
    assert!(event.position[0].hypot(event.position[1]) <= 3.0);
    assert_eq!(event.position[2], 0.0);
    assert_eq!(event.time, 0.0);
    assert_eq!(generator.anomalies(), 0);
}

#[test]
fn test_scripted_draws_select_the_expected_lines() {
    let table = DecayTable::sn113();
    let draws = [1, 649_700, 649_701, 1_007_246];
    let rng = ScriptedRng {
        words: draws.iter().map(|&d| word_for_draw(d, table.max_draw())).collect(),
        rest: FastRng::new(9),
    };
    let mut generator = PrimaryGenerator::new(DecaySource::new(), rng);
    let energies: Vec<f64> = (0..draws.len())
        .map(|_| generator.generate_primaries().unwrap().energy)
        .collect();
    let expected: Vec<f64> = [391.698, 391.698, 363.758, 391.697]
        .iter()
        .map(|kev| kev * KEV)
        .collect();
    assert_eq!(energies, expected);
}

#[test]
fn test_every_allowed_draw_selects_a_line() {
    let table = DecayTable::sn113();
    for draw in (1..=table.max_draw()).step_by(997) {
        assert!(table.select_draw(draw).is_ok(), "draw {}", draw);
    }
    assert!(table.select_draw(table.max_draw()).is_ok());
    assert_eq!(table.max_draw(), (table.total() * DRAWS_PER_PERCENT as f64).round() as u32);
}

#[test]
fn test_draw_past_the_table_is_an_error() {
    let table = DecayTable::sn113();
    let err = table.select_draw(table.max_draw() + 1).unwrap_err();
    assert!(matches!(err, SourceError::SelectionOutOfRange { .. }));
    assert!(table.select(f64::NAN).is_err());
    assert!(table.select(-0.5).is_err());
}
