// Internal unit system: lengths in mm, energies in MeV, times in ns.
// Densities are kept in g/cm3, pressures in pascal and temperatures in kelvin
// so material tables read the same way as the datasheets they come from.

pub const MM: f64 = 1.0;
pub const CM: f64 = 10.0 * MM;
pub const M: f64 = 1000.0 * MM;
pub const UM: f64 = 1.0e-3 * MM;
pub const INCH: f64 = 25.4 * MM;

pub const MEV: f64 = 1.0;
pub const KEV: f64 = 1.0e-3 * MEV;

pub const NS: f64 = 1.0;

pub const RAD: f64 = 1.0;
pub const DEG: f64 = std::f64::consts::PI / 180.0 * RAD;

pub const G_PER_CM3: f64 = 1.0;
pub const MG_PER_CM3: f64 = 1.0e-3 * G_PER_CM3;
/// Mass in grams and volume in cm3, for densities written as a ratio.
pub const MG: f64 = 1.0e-3;
pub const CM3: f64 = 1.0;

pub const G_PER_MOLE: f64 = 1.0;

pub const ATMOSPHERE: f64 = 101_325.0;
pub const TORR: f64 = ATMOSPHERE / 760.0;

pub const KELVIN: f64 = 1.0;

/// Electric potential, megavolt based.
pub const VOLT: f64 = 1.0e-6;

/// Electron rest mass.
pub const ELECTRON_MASS: f64 = 0.510_998_95 * MEV;

/// Lowest density a material may carry; thinner materials are clamped to it.
pub const UNIVERSE_MEAN_DENSITY: f64 = 1.0e-25 * G_PER_CM3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_units() {
        assert_eq!(3.0 * MM, 0.3 * CM);
        assert!((INCH / CM - 2.54).abs() < 1e-12);
        assert_eq!(2.0 * M, 2000.0);
    }

    #[test]
    fn test_energy_units() {
        assert!((391.698 * KEV - 0.391698).abs() < 1e-12);
    }

    #[test]
    fn test_pressure_units() {
        assert!((760.0 * TORR - ATMOSPHERE).abs() < 1e-9);
    }
}
