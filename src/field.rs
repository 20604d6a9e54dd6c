use crate::detector::Side;
use crate::units::UM;
use crate::volume::Rotation;
use serde::{Deserialize, Serialize};

/// Integration scheme used to propagate charged tracks through a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepperKind {
    /// General purpose, for smooth electromagnetic fields.
    ClassicalRk4 { variables: u32 },
    /// Switches to a helix for low-order steps; avoids stepsize underflow.
    HelixMixed { order: u32 },
    SimpleHeum,
    HelixHeum,
    HelixImplicitEuler,
    HelixSimpleRunge,
    HelixExplicitEuler,
}

/// Accuracy parameters of a field manager. Lengths in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldManagerSettings {
    pub stepper: StepperKind,
    pub delta_chord: f64,
    pub min_epsilon_step: f64,
    pub max_epsilon_step: f64,
    pub delta_one_step: f64,
    /// Smallest step the integration driver will take, when it is set.
    pub driver_min_step: Option<f64>,
}

/// Settings for the detector-wide magnetic field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalFieldSetup {
    pub manager: FieldManagerSettings,
    pub max_loop_count: i32,
}

impl GlobalFieldSetup {
    pub fn new() -> Self {
        tracing::info!("setting up global magnetic field");
        GlobalFieldSetup {
            manager: FieldManagerSettings {
                stepper: StepperKind::HelixMixed { order: 6 },
                delta_chord: 100.0 * UM,
                min_epsilon_step: 1e-6,
                max_epsilon_step: 1e-5,
                delta_one_step: 0.1 * UM,
                driver_min_step: None,
            },
            max_loop_count: i32::MAX,
        }
    }
}

impl Default for GlobalFieldSetup {
    fn default() -> Self {
        Self::new()
    }
}

/// Electric field region of one wirechamber's active volume.
///
/// `rotation` and `translation` locate the field frame in the world: a world
/// point `p` maps to `rotation * (p - translation)` in the wire-plane frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MwpcFieldSetup {
    pub side: Side,
    /// mm between neighbouring anode wires
    pub wire_spacing: f64,
    /// mm between the anode plane and each cathode plane
    pub plane_spacing: f64,
    pub anode_radius: f64,
    /// anode potential in MeV per unit charge
    pub potential: f64,
    pub rotation: Option<Rotation>,
    pub translation: [f64; 3],
    pub manager: FieldManagerSettings,
}

impl MwpcFieldSetup {
    pub fn new(
        side: Side,
        wire_spacing: f64,
        plane_spacing: f64,
        anode_radius: f64,
        potential: f64,
        rotation: Option<Rotation>,
        translation: [f64; 3],
    ) -> Self {
        tracing::info!(%side, "setting up wirechamber electromagnetic field");
        MwpcFieldSetup {
            side,
            wire_spacing,
            plane_spacing,
            anode_radius,
            potential,
            rotation,
            translation,
            manager: FieldManagerSettings {
                stepper: StepperKind::ClassicalRk4 { variables: 8 },
                delta_chord: 10.0 * UM,
                min_epsilon_step: 1e-6,
                max_epsilon_step: 1e-5,
                delta_one_step: 0.1 * UM,
                driver_min_step: Some(0.01 * UM),
            },
        }
    }

    /// Express a world point in the wire-plane frame.
    pub fn to_local(&self, point: [f64; 3]) -> [f64; 3] {
        let shifted = [
            point[0] - self.translation[0],
            point[1] - self.translation[1],
            point[2] - self.translation[2],
        ];
        match &self.rotation {
            Some(rotation) => rotation.apply(shifted),
            None => shifted,
        }
    }
}
