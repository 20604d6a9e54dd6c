use crate::error::GeometryError;
use crate::units::{KELVIN, UNIVERSE_MEAN_DENSITY};
use serde::{Deserialize, Serialize};

/// A chemical element with its molar mass in g/mole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub symbol: String,
    pub z: u32,
    pub molar_mass: f64,
}

impl Element {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        z: u32,
        molar_mass: f64,
    ) -> Self {
        Element {
            name: name.into(),
            symbol: symbol.into(),
            z,
            molar_mass,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialState {
    Solid,
    Gas,
}

/// How a material's make-up is specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Composition {
    /// A pure material given directly by effective Z and molar mass.
    Single { z: f64, molar_mass: f64 },
    /// (element, mass fraction) pairs
    ByMassFraction(Vec<(Element, f64)>),
    /// (element, atoms per molecule) pairs
    ByAtomCount(Vec<(Element, f64)>),
}

/// A bulk material as seen by the transport engine.
///
/// Densities are in g/cm3, temperatures in kelvin and pressures in pascal.
/// Solids default to room temperature and no pressure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub density: f64,
    pub state: MaterialState,
    pub temperature: f64,
    pub pressure: f64,
    pub composition: Composition,
}

impl Material {
    /// A single-element material such as a metal foil.
    pub fn simple(name: impl Into<String>, z: f64, molar_mass: f64, density: f64) -> Self {
        Self::build(
            name.into(),
            density,
            MaterialState::Solid,
            Composition::Single { z, molar_mass },
        )
    }

    pub fn by_mass_fraction(
        name: impl Into<String>,
        density: f64,
        components: Vec<(Element, f64)>,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        check_components(&name, &components)?;
        let total: f64 = components.iter().map(|(_, f)| f).sum();
        if (total - 1.0).abs() > 1e-6 {
            tracing::warn!(
                material = %name,
                total,
                "mass fractions do not sum to one; renormalising"
            );
        }
        let components = components
            .into_iter()
            .map(|(e, f)| (e, f / total))
            .collect();
        Ok(Self::build(
            name,
            density,
            MaterialState::Solid,
            Composition::ByMassFraction(components),
        ))
    }

    pub fn by_atom_count(
        name: impl Into<String>,
        density: f64,
        components: Vec<(Element, f64)>,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        check_components(&name, &components)?;
        Ok(Self::build(
            name,
            density,
            MaterialState::Solid,
            Composition::ByAtomCount(components),
        ))
    }

    /// Mark the material as a gas held at `temperature` and `pressure`.
    pub fn as_gas(mut self, temperature: f64, pressure: f64) -> Self {
        self.state = MaterialState::Gas;
        self.temperature = temperature;
        self.pressure = pressure;
        self
    }

    fn build(name: String, density: f64, state: MaterialState, composition: Composition) -> Self {
        let density = if density < UNIVERSE_MEAN_DENSITY {
            tracing::warn!(
                material = %name,
                density,
                "density below universe mean density; clamping"
            );
            UNIVERSE_MEAN_DENSITY
        } else {
            density
        };
        Material {
            name,
            density,
            state,
            temperature: 293.15 * KELVIN,
            pressure: 0.0,
            composition,
        }
    }

    /// Mass fraction of every element symbol in the material. Pure materials
    /// report their own name with fraction one.
    pub fn mass_fractions(&self) -> Vec<(String, f64)> {
        match &self.composition {
            Composition::Single { .. } => vec![(self.name.clone(), 1.0)],
            Composition::ByMassFraction(parts) => parts
                .iter()
                .map(|(e, f)| (e.symbol.clone(), *f))
                .collect(),
            Composition::ByAtomCount(parts) => {
                let molecule: f64 = parts.iter().map(|(e, n)| e.molar_mass * n).sum();
                parts
                    .iter()
                    .map(|(e, n)| (e.symbol.clone(), e.molar_mass * n / molecule))
                    .collect()
            }
        }
    }

    /// Molar mass of one formula unit, where the composition defines one.
    pub fn molar_mass(&self) -> Option<f64> {
        match &self.composition {
            Composition::Single { molar_mass, .. } => Some(*molar_mass),
            Composition::ByAtomCount(parts) => {
                Some(parts.iter().map(|(e, n)| e.molar_mass * n).sum())
            }
            Composition::ByMassFraction(_) => None,
        }
    }
}

fn check_components(name: &str, components: &[(Element, f64)]) -> Result<(), GeometryError> {
    if components.is_empty() {
        return Err(GeometryError::InvalidMaterial {
            material: name.to_string(),
            reason: "material has no components".to_string(),
        });
    }
    if let Some((e, _)) = components.iter().find(|(_, f)| !(*f > 0.0)) {
        return Err(GeometryError::InvalidMaterial {
            material: name.to_string(),
            reason: format!("component {} must have a positive amount", e.symbol),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> Element {
        Element::new("C", "C", 6, 12.0107)
    }
    fn hydrogen() -> Element {
        Element::new("H", "H", 1, 1.0079)
    }
    fn oxygen() -> Element {
        Element::new("O", "O", 8, 15.9994)
    }

    #[test]
    fn test_simple_material() {
        let al = Material::simple("Aluminum", 13.0, 26.98, 2.7);
        assert_eq!(al.state, MaterialState::Solid);
        assert_eq!(al.molar_mass(), Some(26.98));
        assert_eq!(al.mass_fractions(), vec![("Aluminum".to_string(), 1.0)]);
    }

    #[test]
    fn test_atom_count_mass_fractions() {
        let mylar = Material::by_atom_count(
            "Mylar",
            1.4,
            vec![(carbon(), 5.0), (hydrogen(), 4.0), (oxygen(), 2.0)],
        )
        .unwrap();
        let fractions = mylar.mass_fractions();
        let sum: f64 = fractions.iter().map(|(_, f)| f).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        let c = fractions.iter().find(|(s, _)| s == "C").unwrap().1;
        assert!((c - 60.0535 / 96.0839).abs() < 1e-4);
        assert!((mylar.molar_mass().unwrap() - 96.0839).abs() < 1e-3);
    }

    #[test]
    fn test_mass_fraction_renormalised() {
        let m = Material::by_mass_fraction("x", 1.0, vec![(carbon(), 2.0), (hydrogen(), 2.0)])
            .unwrap();
        let fractions = m.mass_fractions();
        assert!((fractions[0].1 - 0.5).abs() < 1e-12);
        assert_eq!(m.molar_mass(), None);
    }

    #[test]
    fn test_bad_components_rejected() {
        assert!(Material::by_atom_count("empty", 1.0, vec![]).is_err());
        assert!(Material::by_mass_fraction("neg", 1.0, vec![(carbon(), -0.1)]).is_err());
    }

    #[test]
    fn test_zero_density_clamped() {
        let m = Material::by_mass_fraction("Vacuum", 0.0, vec![(carbon(), 1.0)])
            .unwrap()
            .as_gas(293.0, 0.0);
        assert_eq!(m.density, UNIVERSE_MEAN_DENSITY);
        assert_eq!(m.state, MaterialState::Gas);
    }
}
