use crate::error::GeometryError;
use crate::material::{Element, Material};
use crate::units::{ATMOSPHERE, CM3, G_PER_CM3, G_PER_MOLE, KELVIN, MG, MG_PER_CM3, TORR};
use std::collections::HashMap;
use std::sync::Arc;

/// Fill pressure of the wirechamber pentane.
pub const MWPC_PRESSURE: f64 = 100.0 * TORR;
/// Fill temperature of both wirechamber gases.
pub const MWPC_TEMPERATURE: f64 = 298.0 * KELVIN;

/// Named elements and materials used by the detector description.
///
/// Materials are shared as `Arc<Material>` so many logical volumes can point at
/// one definition. Lookups are by the material's own name; the vacuum is
/// rebuilt in place by [`Materials::set_vacuum_pressure`].
#[derive(Debug, Clone)]
pub struct Materials {
    elements: HashMap<String, Element>,
    materials: HashMap<String, Arc<Material>>,
}

impl Materials {
    /// Create a new empty catalogue
    pub fn new() -> Self {
        Materials {
            elements: HashMap::new(),
            materials: HashMap::new(),
        }
    }

    /// The detector's elements and materials, with the vacuum at `vacuum_pressure` (Pa).
    pub fn detector(vacuum_pressure: f64) -> Result<Self, GeometryError> {
        let mut m = Materials::new();
        for (name, z, a) in [
            ("H", 1, 1.0079),
            ("C", 6, 12.0107),
            ("N", 7, 14.0067),
            ("O", 8, 15.9994),
            ("Al", 13, 26.9815),
            ("Cr", 24, 51.9961),
            ("Fe", 26, 55.845),
            ("Ni", 28, 58.6934),
            ("Cu", 29, 63.55),
            ("Zn", 30, 65.39),
        ] {
            m.add_element(Element::new(name, name, z, a * G_PER_MOLE));
        }

        m.add(Material::simple("Beryllium", 4.0, 9.01 * G_PER_MOLE, 1.848 * G_PER_CM3));
        m.add(Material::simple("Aluminum", 13.0, 26.98 * G_PER_MOLE, 2.7 * G_PER_CM3));
        m.add(Material::simple("Silicon", 14.0, 28.09 * G_PER_MOLE, 2.33 * G_PER_CM3));
        m.add(Material::simple("Copper", 29.0, 63.55 * G_PER_MOLE, 8.96 * G_PER_CM3));
        m.add(Material::simple("Tungsten", 74.0, 183.84 * G_PER_MOLE, 19.3 * G_PER_CM3));
        m.add(Material::simple("Gold", 79.0, 196.97 * G_PER_MOLE, 19.3 * G_PER_CM3));

        let brass = Material::by_mass_fraction(
            "Brass",
            8.5 * G_PER_CM3,
            vec![(m.element("Cu")?, 0.70), (m.element("Zn")?, 0.30)],
        )?;
        m.add(brass);

        let ss304 = Material::by_mass_fraction(
            "Stainless304",
            8.03 * G_PER_CM3,
            vec![
                (m.element("Fe")?, 0.70),
                (m.element("Cr")?, 0.20),
                (m.element("Ni")?, 0.10),
            ],
        )?;
        m.add(ss304);

        let kevlar = Material::by_atom_count(
            "Kevlar",
            1.44 * G_PER_CM3,
            vec![
                (m.element("N")?, 2.0),
                (m.element("C")?, 14.0),
                (m.element("H")?, 10.0),
                (m.element("O")?, 2.0),
            ],
        )?;
        m.add(kevlar);

        let mylar = Material::by_atom_count(
            "Mylar",
            1.4 * G_PER_CM3,
            vec![
                (m.element("C")?, 5.0),
                (m.element("H")?, 4.0),
                (m.element("O")?, 2.0),
            ],
        )?;
        m.add(mylar);

        let polyethylene = Material::by_atom_count(
            "Polyethylene",
            0.95 * G_PER_CM3,
            vec![(m.element("C")?, 2.0), (m.element("H")?, 4.0)],
        )?;
        m.add(polyethylene);

        // Wirechamber fill: pentane at 100 torr
        let pentane = Material::by_atom_count(
            "Pentane",
            ideal_gas_density(72.17 * MG, MWPC_PRESSURE, MWPC_TEMPERATURE),
            vec![(m.element("C")?, 5.0), (m.element("H")?, 12.0)],
        )?
        .as_gas(MWPC_TEMPERATURE, MWPC_PRESSURE);
        m.add(pentane);

        // Wirechamber fill: N2 at 95 torr
        let n2_pressure = MWPC_PRESSURE - 5.0 * TORR;
        let nitrogen = Material::by_atom_count(
            "MWPC_N2",
            ideal_gas_density(28.0 * MG, n2_pressure, MWPC_TEMPERATURE),
            vec![(m.element("N")?, 2.0)],
        )?
        .as_gas(MWPC_TEMPERATURE, n2_pressure);
        m.add(nitrogen);

        // Eljen EJ-204 datasheet H:C ratio
        let scintillator = Material::by_atom_count(
            "Scintillator",
            1.032 * G_PER_CM3,
            vec![(m.element("C")?, 4.68), (m.element("H")?, 5.15)],
        )?;
        m.add(scintillator);

        m.set_vacuum_pressure(vacuum_pressure)?;
        Ok(m)
    }

    /// Rebuild the residual-gas "Vacuum": low-pressure air at 20 °C, scaled
    /// from 1.2048 mg/cm3 at one atmosphere.
    pub fn set_vacuum_pressure(&mut self, pressure: f64) -> Result<(), GeometryError> {
        tracing::info!(pressure_torr = pressure / TORR, "detector vacuum pressure set");
        let vacuum = Material::by_mass_fraction(
            "Vacuum",
            1.2048 * MG_PER_CM3 * pressure / ATMOSPHERE,
            vec![(self.element("N")?, 0.78), (self.element("O")?, 0.22)],
        )?
        .as_gas(293.0 * KELVIN, pressure);
        self.add(vacuum);
        Ok(())
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.insert(element.symbol.clone(), element);
    }

    /// Insert or replace a material under its own name.
    pub fn add(&mut self, material: Material) -> Arc<Material> {
        let material = Arc::new(material);
        self.materials
            .insert(material.name.clone(), Arc::clone(&material));
        material
    }

    pub fn element(&self, symbol: &str) -> Result<Element, GeometryError> {
        self.elements
            .get(symbol)
            .cloned()
            .ok_or_else(|| GeometryError::UnknownMaterial(format!("element {}", symbol)))
    }

    pub fn get(&self, name: &str) -> Result<Arc<Material>, GeometryError> {
        self.materials
            .get(name)
            .cloned()
            .ok_or_else(|| GeometryError::UnknownMaterial(name.to_string()))
    }

    /// Get the number of materials in the catalogue
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Material names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.materials.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}

/// Gas density from `molar_mass` per 22.4 cm3 at STP, scaled to `pressure`
/// and `temperature`.
pub fn ideal_gas_density(molar_mass: f64, pressure: f64, temperature: f64) -> f64 {
    molar_mass / (22.4 * CM3) * (pressure / (760.0 * TORR)) * (273.15 * KELVIN / temperature)
}
