use crate::config::Config;
use crate::error::GeometryResult;
use crate::field::{GlobalFieldSetup, MwpcFieldSetup};
use crate::geometry::Geometry;
use crate::materials::Materials;
use crate::solid::Solid;
use crate::units::{CM, INCH, M, MM, UM, VOLT};
use crate::volume::{
    Axis, LogicalVolume, PhysicalId, Placement, Replica, Rotation, UserLimits, VisAttributes,
    VolumeId,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::sync::Arc;

/// Scintillator face distance from the decay trap centre.
pub const DETECTOR_DISTANCE: f64 = 2.2 * M;

/// One of the two detector packages. East sits at negative z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    East,
    West,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::East, Side::West];

    /// 0 for East, 1 for West
    pub fn index(self) -> usize {
        match self {
            Side::East => 0,
            Side::West => 1,
        }
    }

    /// Sign of the side's z coordinates.
    pub fn sign(self) -> f64 {
        match self {
            Side::East => -1.0,
            Side::West => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::East => "EAST",
            Side::West => "WEST",
        }
    }

    /// `stem` followed by the side index, e.g. `scint_log_1`.
    pub fn suffixed(self, stem: &str) -> String {
        format!("{}{}", stem, self.index())
    }

    /// `stem` followed by the side label, e.g. `mwpc_container_log_EAST`.
    pub fn labelled(self, stem: &str) -> String {
        format!("{}_{}", stem, self.label())
    }

    /// The East package is turned half a revolution about y so both
    /// packages face the decay trap.
    pub fn rotation(self) -> Rotation {
        match self {
            Side::East => Rotation::identity().rotate_y(PI),
            Side::West => Rotation::identity(),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scintillator package dimensions, in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScintillatorDimensions {
    pub scint_radius: f64,
    pub backing_radius: f64,
    pub scint_thick: f64,
    pub dead_layer_thick: f64,
    pub backing_thick: f64,
    pub light_guide_thick: f64,
}

impl Default for ScintillatorDimensions {
    fn default() -> Self {
        ScintillatorDimensions {
            scint_radius: 7.5 * CM,
            backing_radius: 10.0 * CM,
            scint_thick: 3.5 * MM,
            dead_layer_thick: 3.0 * UM,
            backing_thick: 1.0 * INCH,
            light_guide_thick: 1.0 * CM,
        }
    }
}

impl ScintillatorDimensions {
    /// Backing must be at least as wide as the scintillator and the light
    /// guide at least as thick.
    pub fn is_consistent(&self) -> bool {
        self.backing_radius >= self.scint_radius && self.light_guide_thick >= self.scint_thick
    }

    /// Length of the N2 container holding the package.
    pub fn container_length(&self) -> f64 {
        self.light_guide_thick + self.backing_thick
    }

    /// z of the scintillator face in container coordinates.
    pub fn face_z(&self) -> f64 {
        -0.5 * self.container_length()
    }

    fn light_guide_radius(&self) -> f64 {
        self.scint_radius - (self.light_guide_thick - self.scint_thick)
    }
}

/// Handles on the volumes hosts most often need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorVolumes {
    pub world: VolumeId,
    pub source_container: VolumeId,
    pub source_window: VolumeId,
    pub decay_tube: VolumeId,
    pub trap_window: [VolumeId; 2],
    pub scint_container: [VolumeId; 2],
    pub dead_layer: [VolumeId; 2],
    pub scintillator: [VolumeId; 2],
    pub light_guide: [VolumeId; 2],
    pub backing: [VolumeId; 2],
    pub wire_gas: [VolumeId; 2],
    pub mwpc_container: [VolumeId; 2],
    pub frame_container: [VolumeId; 2],
}

/// The assembled spectrometer: geometry tree, the materials it uses and the
/// global field.
#[derive(Debug, Clone)]
pub struct Detector {
    pub geometry: Geometry,
    pub materials: Materials,
    pub global_field: GlobalFieldSetup,
    pub volumes: DetectorVolumes,
}

impl Detector {
    pub fn mwpc_field(&self, side: Side) -> Option<&MwpcFieldSetup> {
        self.geometry
            .effective_field(self.volumes.mwpc_container[side.index()])
    }

    /// Rebuild the vacuum at `pressure` (Pa) and swap it into every volume
    /// filled with it. Returns the number of volumes updated.
    pub fn set_vacuum_pressure(&mut self, pressure: f64) -> GeometryResult<usize> {
        self.materials.set_vacuum_pressure(pressure)?;
        let vacuum = self.materials.get("Vacuum")?;
        Ok(self.geometry.replace_material(&vacuum))
    }
}

/// Builds the detector tree.
///
/// All lengths are in mm and every side-dependent volume is built once per
/// [`Side`]: names take the side index as suffix and East copies are placed
/// at negative z, rotated by [`Side::rotation`].
pub struct DetectorConstruction {
    geometry: Geometry,
    materials: Materials,
    gas_limits: UserLimits,
    solid_limits: UserLimits,
    check_overlaps: bool,
}

// Shared dimensions between the packages.
const WIRE_SPACING: f64 = 2.54 * MM;
const WIRE_COUNT: u32 = 64;
const PLANE_SPACING: f64 = 1.0 * CM;
const ANODE_RADIUS: f64 = 5.0 * UM;
const CATHODE_RADIUS: f64 = 25.0 * UM;
const MWPC_POTENTIAL: f64 = 2700.0 * VOLT;
const BACK_WINDOW_FRAME_THICK: f64 = 0.5 * INCH;

fn vis(r: f64, g: f64, b: f64, a: f64) -> Option<VisAttributes> {
    Some(VisAttributes::colour(r, g, b, a))
}

fn invisible() -> Option<VisAttributes> {
    Some(VisAttributes::invisible())
}

fn window_vis() -> Option<VisAttributes> {
    vis(0.0, 1.0, 0.0, 1.0)
}

fn on_axis(z: f64) -> [f64; 3] {
    [0.0, 0.0, z]
}

impl DetectorConstruction {
    /// Build the full detector for `config`.
    pub fn construct(config: &Config) -> GeometryResult<Detector> {
        let materials = Materials::detector(config.vacuum_pressure())?;
        let builder = DetectorConstruction {
            geometry: Geometry::new(),
            materials,
            gas_limits: UserLimits::max_step(1.0 * CM),
            solid_limits: UserLimits::max_step(config.scint_step_limit()),
            check_overlaps: config.check_overlaps,
        };
        builder.build()
    }

    /// Build with a snapshot of the global configuration.
    pub fn from_global() -> GeometryResult<Detector> {
        let config = Config::global().clone();
        Self::construct(&config)
    }

    fn build(mut self) -> GeometryResult<Detector> {
        let world = self.world()?;
        let (source_container, source_window) = self.source_holder(world)?;
        let (decay_tube, trap_window) = self.decay_trap(world)?;

        let dims = ScintillatorDimensions::default();
        if !dims.is_consistent() {
            tracing::warn!(
                ?dims,
                "major geometry error: scintillator measurements don't make sense"
            );
        }
        let mut scint = [[VolumeId(0); 5]; 2];
        let mut wire_gas = [VolumeId(0); 2];
        let mut mwpc_container = [VolumeId(0); 2];
        let mut frame_container = [VolumeId(0); 2];
        let scint_tube = Arc::new(Solid::cylinder(
            "N2_vol_tube",
            0.0,
            dims.backing_radius,
            0.5 * dims.container_length(),
        )?);
        let mwpc_box =
            Arc::new(Solid::boxed("mwpc_container_box", 4.0 * INCH, 4.0 * INCH, mwpc_half_z())?);
        for side in Side::ALL {
            scint[side.index()] = self.scintillator(world, side, &dims, &scint_tube)?;
            wire_gas[side.index()] = self.wire_volume(side)?;
            let gas = wire_gas[side.index()];
            mwpc_container[side.index()] = self.mwpc(world, side, &dims, &mwpc_box, gas)?;
            frame_container[side.index()] = self.frame(world, side, &dims, &scint_tube, &mwpc_box)?;
        }

        let global_field = GlobalFieldSetup::new();
        for side in Side::ALL {
            let location = on_axis(side.sign() * (DETECTOR_DISTANCE + mwpc_z(&dims)));
            let rotation = match side {
                Side::East => Some(side.rotation()),
                Side::West => None,
            };
            let setup = MwpcFieldSetup::new(
                side,
                WIRE_SPACING,
                PLANE_SPACING,
                ANODE_RADIUS,
                MWPC_POTENTIAL,
                rotation,
                location,
            );
            self.geometry
                .attach_field(mwpc_container[side.index()], setup, true)?;
        }

        if self.check_overlaps {
            self.geometry.check_overlaps()?;
        }
        tracing::info!(
            logical = self.geometry.logical_count(),
            physical = self.geometry.physical_count(),
            "detector constructed"
        );

        let pick = |k: usize| [scint[0][k], scint[1][k]];
        let volumes = DetectorVolumes {
            world,
            source_container,
            source_window,
            decay_tube,
            trap_window,
            scint_container: pick(0),
            dead_layer: pick(1),
            scintillator: pick(2),
            light_guide: pick(3),
            backing: pick(4),
            wire_gas,
            mwpc_container,
            frame_container,
        };
        Ok(Detector {
            geometry: self.geometry,
            materials: self.materials,
            global_field,
            volumes,
        })
    }

    fn logical(
        &mut self,
        name: impl Into<String>,
        solid: &Arc<Solid>,
        material: &str,
        vis: Option<VisAttributes>,
    ) -> GeometryResult<VolumeId> {
        let mut volume = LogicalVolume::new(name, Arc::clone(solid), self.materials.get(material)?);
        volume.vis = vis;
        self.geometry.add_logical(volume)
    }

    fn place(
        &mut self,
        name: impl Into<String>,
        logical: VolumeId,
        mother: VolumeId,
        rotation: Rotation,
        translation: [f64; 3],
        check: bool,
    ) -> GeometryResult<PhysicalId> {
        self.geometry.place(Placement {
            name: name.into(),
            logical,
            mother,
            rotation,
            translation,
            copy_no: 0,
            check_overlaps: check,
        })
    }

    fn put(
        &mut self,
        name: impl Into<String>,
        logical: VolumeId,
        mother: VolumeId,
        z: f64,
    ) -> GeometryResult<PhysicalId> {
        self.place(name, logical, mother, Rotation::identity(), on_axis(z), false)
    }

    fn replicate(
        &mut self,
        name: String,
        logical: VolumeId,
        mother: VolumeId,
        count: u32,
        width: f64,
    ) -> GeometryResult<PhysicalId> {
        self.geometry.replicate(Replica {
            name,
            logical,
            mother,
            axis: Axis::X,
            count,
            width,
        })
    }

    fn world(&mut self) -> GeometryResult<VolumeId> {
        let hall = Arc::new(Solid::boxed("expHall_box", 1.0 * M, 1.0 * M, 4.0 * M)?);
        let world = self.logical("World_log", &hall, "Vacuum", invisible())?;
        self.geometry
            .set_user_limits(world, UserLimits::max_step(10.0 * M))?;
        self.geometry.set_world(world, "World_phys")?;
        Ok(world)
    }

    /// Calibration source holder: brass paddle, sealed Mylar foil with Al
    /// coatings and a retaining ring.
    fn source_holder(&mut self, world: VolumeId) -> GeometryResult<(VolumeId, VolumeId)> {
        let window_thick = 4.7 * UM;
        let coating_thick = 0.1 * UM;
        let holder_thick = 3.0 / 16.0 * INCH;
        let ring_radius = 0.5 * INCH;
        let window_radius = ring_radius - 3.0 * MM;
        let ring_thick = 3.2 * MM;
        let holder_height = 1.5 * INCH;
        let holder_width = 1.5 * INCH;

        let holder_box = Arc::new(Solid::boxed(
            "source_holder_box",
            0.5 * holder_width,
            0.5 * holder_height,
            0.5 * holder_thick,
        )?);
        let container = self.logical("source_container_log", &holder_box, "Vacuum", None)?;

        let hole = Arc::new(Solid::cylinder("source_holder_hole", 0.0, ring_radius, holder_thick)?);
        let paddle = Arc::new(Solid::subtraction(
            "source holder",
            Arc::clone(&holder_box),
            hole,
            Rotation::identity(),
            [0.0; 3],
        ));
        let holder = self.logical("source_holder_log", &paddle, "Brass", vis(0.7, 0.7, 0.0, 0.5))?;
        self.put("source_holder_phys", holder, container, 0.0)?;

        let window_tube =
            Arc::new(Solid::cylinder("window_tube", 0.0, window_radius, window_thick)?);
        let window = self.logical("source_window_log", &window_tube, "Mylar", window_vis())?;
        self.put("source_window_phys", window, container, 0.0)?;

        let coating_tube = Arc::new(Solid::cylinder(
            "source_coating_tube",
            0.0,
            window_radius,
            0.5 * coating_thick,
        )?);
        for side in Side::ALL {
            let coating = self.logical(
                side.suffixed("source_coating_log"),
                &coating_tube,
                "Aluminum",
                vis(0.0, 1.0, 0.0, 0.5),
            )?;
            let z = side.sign() * (window_thick + 0.5 * coating_thick);
            self.put(side.suffixed("source_coating_phys_"), coating, container, z)?;
        }

        let ring_tube = Arc::new(Solid::cylinder(
            "source_ring_tube",
            window_radius,
            ring_radius,
            0.5 * ring_thick,
        )?);
        let ring =
            self.logical("source_ring_log", &ring_tube, "Aluminum", vis(0.7, 0.7, 0.7, 0.5))?;
        self.put("source_ring_phys", ring, container, 0.0)?;

        self.place(
            "source_container_phys",
            container,
            world,
            Rotation::identity(),
            [0.0; 3],
            true,
        )?;
        Ok((container, window))
    }

    /// 3 m copper decay trap with Mylar/Be end windows, collimators and
    /// vacuum monitors.
    fn decay_trap(&mut self, world: VolumeId) -> GeometryResult<(VolumeId, [VolumeId; 2])> {
        let window_thick = 0.180 * UM;
        let coating_thick = 0.150 * UM;
        let inner_radius = 2.45 * INCH;
        let wall_thick = 2.0 * MM;
        let collimator_inner_radius = 2.3 * INCH;
        let outer_radius = inner_radius + wall_thick;
        let length = 3.0 * M;

        let tube =
            Arc::new(Solid::cylinder("decayTrap_tube", inner_radius, outer_radius, 0.5 * length)?);
        let tube_log =
            self.logical("decayTrap_tube_log", &tube, "Copper", vis(1.0, 1.0, 0.0, 0.5))?;
        self.place("decayTrap_tube", tube_log, world, Rotation::identity(), [0.0; 3], true)?;

        let total_window = window_thick + coating_thick;
        let collimator_thick = 0.8 * INCH;
        let be_z = -0.5 * total_window + 0.5 * coating_thick;
        let mylar_z = 0.5 * total_window - 0.5 * window_thick;
        let window_z = 0.5 * (length + total_window);
        let monitor_thick = 1.0 * MM;
        let monitor_z = 0.5 * M;

        let window_tube =
            Arc::new(Solid::cylinder("trap_win_tube", 0.0, outer_radius, 0.5 * total_window)?);
        let mylar_tube =
            Arc::new(Solid::cylinder("mylarTube", 0.0, outer_radius, 0.5 * window_thick)?);
        let be_tube = Arc::new(Solid::cylinder("beTube", 0.0, outer_radius, 0.5 * coating_thick)?);
        let collimator_tube = Arc::new(Solid::cylinder(
            "decayTrap_collimatorTube",
            collimator_inner_radius,
            collimator_inner_radius + collimator_thick,
            0.5 * collimator_thick,
        )?);
        let collimator_back_tube = Arc::new(Solid::cylinder(
            "decayTrap_collimatorBackTube",
            outer_radius + 1.0 * MM,
            collimator_inner_radius + collimator_thick,
            0.5 * collimator_thick,
        )?);
        let monitor_tube =
            Arc::new(Solid::cylinder("trap_monitor_tube", 0.0, inner_radius, 0.5 * monitor_thick)?);

        let collimator_z = 0.5 * (length + collimator_thick) + 0.5 * total_window;
        let collimator_back_z = 0.5 * length - collimator_thick;

        let mut windows = [VolumeId(0); 2];
        for side in Side::ALL {
            let s = side.sign();
            let window =
                self.logical(side.suffixed("trap_win_log_"), &window_tube, "Vacuum", window_vis())?;
            self.geometry.set_user_limits(window, self.solid_limits)?;
            let mylar = self.logical(side.suffixed("mylar_win_log_"), &mylar_tube, "Mylar", None)?;
            let be = self.logical(side.suffixed("be_win_log"), &be_tube, "Beryllium", None)?;
            self.put(side.suffixed("trap_win_"), window, world, s * window_z)?;
            self.put(side.suffixed("mylar_win_"), mylar, window, s * mylar_z)?;
            self.put(side.suffixed("be_win_"), be, window, s * be_z)?;

            let collimator = self.logical(
                side.suffixed("collimator_log_"),
                &collimator_tube,
                "Polyethylene",
                None,
            )?;
            let back = self.logical(
                side.suffixed("collimator_back_log_"),
                &collimator_back_tube,
                "Polyethylene",
                None,
            )?;
            let monitor =
                self.logical(side.suffixed("trap_monitor_log_"), &monitor_tube, "Vacuum", None)?;
            self.put(side.suffixed("collimator_"), collimator, world, s * collimator_z)?;
            self.put(side.suffixed("collimator_back_"), back, world, s * collimator_back_z)?;
            self.put(side.suffixed("trap_monitor_"), monitor, world, s * monitor_z)?;
            windows[side.index()] = window;
        }
        Ok((tube_log, windows))
    }

    /// Scintillator package in its N2 container. Returns container, dead
    /// layer, scintillator, light guide and backing veto.
    fn scintillator(
        &mut self,
        world: VolumeId,
        side: Side,
        dims: &ScintillatorDimensions,
        container_tube: &Arc<Solid>,
    ) -> GeometryResult<[VolumeId; 5]> {
        let length = dims.container_length();
        let dead_tube = Arc::new(Solid::cylinder(
            "Dead_scint_tube",
            0.0,
            dims.scint_radius,
            0.5 * dims.dead_layer_thick,
        )?);
        let scint_tube = Arc::new(Solid::cylinder(
            "scint_tube",
            0.0,
            dims.scint_radius,
            0.5 * (dims.scint_thick - dims.dead_layer_thick),
        )?);
        let lg_radius = dims.light_guide_radius();
        let light_guide_poly = Arc::new(Solid::polycone(
            "lightguide_polycone",
            0.0,
            2.0 * PI,
            vec![0.0, dims.scint_thick, dims.scint_thick, dims.light_guide_thick],
            vec![dims.scint_radius, dims.scint_radius, lg_radius, lg_radius],
            vec![dims.backing_radius; 4],
        )?);
        let backing_tube = Arc::new(Solid::cylinder(
            "backing_tube",
            0.0,
            dims.backing_radius,
            0.5 * dims.backing_thick,
        )?);

        let container =
            self.logical(side.suffixed("N2_Vol_log_"), container_tube, "MWPC_N2", invisible())?;
        let dead = self.logical(
            side.suffixed("Dead_scint_log_"),
            &dead_tube,
            "Scintillator",
            vis(1.0, 0.0, 1.0, 0.5),
        )?;
        let scint = self.logical(
            side.suffixed("scint_log_"),
            &scint_tube,
            "Scintillator",
            vis(0.0, 1.0, 1.0, 0.2),
        )?;
        let light_guide = self.logical(
            side.suffixed("light_guide_log_"),
            &light_guide_poly,
            "Scintillator",
            vis(0.0, 1.0, 0.5, 0.2),
        )?;
        let backing = self.logical(
            side.suffixed("backing_log_"),
            &backing_tube,
            "Scintillator",
            vis(0.0, 0.0, 1.0, 0.2),
        )?;

        // container is rotated as a whole, so these stay side independent
        self.put(
            side.suffixed("Dead_scint_phys_"),
            dead,
            container,
            -0.5 * (length - dims.dead_layer_thick),
        )?;
        let crystal_z = -0.5 * length
            + dims.dead_layer_thick
            + 0.5 * (dims.scint_thick - dims.dead_layer_thick);
        self.put(side.suffixed("scint_crystal_phys_"), scint, container, crystal_z)?;
        self.put(side.suffixed("light_guide_phys_"), light_guide, container, 0.5 * length)?;
        self.put(
            side.suffixed("backing_phys_"),
            backing,
            container,
            0.5 * (length - dims.backing_thick),
        )?;

        let z = side.sign() * (DETECTOR_DISTANCE - dims.face_z());
        self.place(
            side.labelled("scint_container_phys"),
            container,
            world,
            side.rotation(),
            on_axis(z),
            true,
        )?;
        Ok([container, dead, scint, light_guide, backing])
    }

    /// Active wirechamber gas with one anode and two cathode wire planes.
    fn wire_volume(&mut self, side: Side) -> GeometryResult<VolumeId> {
        let plating_thick = 0.2 * UM;
        let plane_width = WIRE_COUNT as f64 * WIRE_SPACING;
        let half_width = 0.5 * plane_width;
        let gas = "Pentane";

        let gas_box =
            Arc::new(Solid::boxed("mpwc_gas_box", half_width, half_width, PLANE_SPACING)?);
        // plane containers lie on their side so the wires replicate along x
        let cath_container_box =
            Arc::new(Solid::boxed("cathContainer_Box", half_width, CATHODE_RADIUS, half_width)?);
        let anode_container_box =
            Arc::new(Solid::boxed("anodeContainer_Box", half_width, ANODE_RADIUS, half_width)?);
        let cath_plate_tube = Arc::new(Solid::cylinder(
            "cathplate_tube",
            CATHODE_RADIUS - plating_thick,
            CATHODE_RADIUS,
            half_width,
        )?);
        let cathode_tube = Arc::new(Solid::cylinder(
            "cathode_tube",
            0.0,
            CATHODE_RADIUS - plating_thick,
            half_width,
        )?);
        let anode_tube = Arc::new(Solid::cylinder("anode_tube", 0.0, ANODE_RADIUS, half_width)?);
        let cath_seg_box = Arc::new(Solid::boxed(
            "cathodeSegmentBox",
            0.5 * WIRE_SPACING,
            CATHODE_RADIUS,
            half_width,
        )?);
        let anode_seg_box = Arc::new(Solid::boxed(
            "anodeSegmentBox",
            0.5 * WIRE_SPACING,
            ANODE_RADIUS,
            half_width,
        )?);

        let x_rot = Rotation::identity().rotate_x(FRAC_PI_2);
        let xz_rot = Rotation::identity().rotate_x(FRAC_PI_2).rotate_y(FRAC_PI_2);

        let gas_log = self.logical(side.suffixed("mwpc_gas_log_"), &gas_box, gas, invisible())?;
        let cath_seg =
            self.logical(side.suffixed("cathSeg_log_"), &cath_seg_box, gas, invisible())?;
        let anode_seg =
            self.logical(side.suffixed("anodeSeg_log_"), &anode_seg_box, gas, invisible())?;
        let cathode_wire = self.logical(
            side.suffixed("cathode_log_"),
            &cathode_tube,
            "Aluminum",
            vis(1.0, 0.7, 0.0, 0.8),
        )?;
        let cathode_plate = self.logical(
            side.suffixed("cathode_plate_log_"),
            &cath_plate_tube,
            "Gold",
            vis(1.0, 0.7, 0.0, 0.8),
        )?;
        let anode_wire = self.logical(
            side.suffixed("anode_log_"),
            &anode_tube,
            "Tungsten",
            vis(1.0, 0.3, 0.0, 0.8),
        )?;
        let cath_container_1 =
            self.logical(side.suffixed("cathContainer1_log_"), &cath_container_box, gas, None)?;
        let cath_container_2 =
            self.logical(side.suffixed("cathContainer2_log_"), &cath_container_box, gas, None)?;
        let anode_container =
            self.logical(side.suffixed("anodeContainer_log_"), &anode_container_box, gas, None)?;

        self.put(side.suffixed("cathode_wire_phys_"), cathode_wire, cath_seg, 0.0)?;
        self.put(side.suffixed("cathode_plate_phys_"), cathode_plate, cath_seg, 0.0)?;
        self.put(side.suffixed("anode_wire_phys_"), anode_wire, anode_seg, 0.0)?;

        let cathode_z = CATHODE_RADIUS - PLANE_SPACING;
        self.place(
            side.suffixed("cathContainer1_phys_"),
            cath_container_1,
            gas_log,
            x_rot,
            on_axis(cathode_z),
            false,
        )?;
        self.place(
            side.suffixed("cathContainer2_phys_"),
            cath_container_2,
            gas_log,
            xz_rot,
            on_axis(-cathode_z),
            false,
        )?;
        self.place(
            side.suffixed("anodeContainer_phys_"),
            anode_container,
            gas_log,
            x_rot,
            [0.0; 3],
            false,
        )?;

        self.replicate(
            side.suffixed("CathodeArray1_"),
            cath_seg,
            cath_container_1,
            WIRE_COUNT,
            WIRE_SPACING,
        )?;
        self.replicate(
            side.suffixed("CathodeArray2_"),
            cath_seg,
            cath_container_2,
            WIRE_COUNT,
            WIRE_SPACING,
        )?;
        self.replicate(
            side.suffixed("AnodeArray_"),
            anode_seg,
            anode_container,
            WIRE_COUNT,
            WIRE_SPACING,
        )?;
        Ok(gas_log)
    }

    /// Wirechamber box with Kevlar support strings and Mylar windows.
    fn mwpc(
        &mut self,
        world: VolumeId,
        side: Side,
        dims: &ScintillatorDimensions,
        container_box: &Arc<Solid>,
        wire_gas: VolumeId,
    ) -> GeometryResult<VolumeId> {
        let window_thick = 6.0 * UM;
        let entrance_radius = 7.0 * CM;
        let exit_radius = 7.5 * CM;
        let entrance_to_cathodes = 5.0 * MM;
        let exit_to_cathodes = 5.0 * MM;
        let half_z = mwpc_half_z();

        let container = self.logical(
            side.labelled("mwpc_container_log"),
            container_box,
            "Pentane",
            invisible(),
        )?;
        self.geometry.set_user_limits(container, self.gas_limits)?;
        let active_z = 0.5 * (entrance_to_cathodes - exit_to_cathodes);
        self.put(side.labelled("mwpc_activeReg_phys"), wire_gas, container, active_z)?;

        // rectangular strings with the cross section of a 140 um cylinder
        let kev_radius = 0.07 * MM;
        let kev_spacing = 5.0 * MM;
        let kev_count = 32;
        let kev_length = 15.0 * CM;
        let kev_aspect_ratio = 16.0;
        let kev_area = PI * kev_radius * kev_radius;
        let kev_width = (kev_area * kev_aspect_ratio).sqrt();
        let kev_thick = (kev_area / kev_aspect_ratio).sqrt();

        let kev_container_box = Arc::new(Solid::boxed(
            "kevContainer_box",
            0.5 * kev_count as f64 * kev_spacing,
            0.5 * kev_length,
            0.5 * kev_thick,
        )?);
        let kev_seg_box = Arc::new(Solid::boxed(
            "kevSeg_box",
            0.5 * kev_spacing,
            0.5 * kev_length,
            0.5 * kev_thick,
        )?);
        let kev_strip_box = Arc::new(Solid::boxed(
            "kevStrip_box",
            0.5 * kev_width,
            0.5 * kev_length,
            0.5 * kev_thick,
        )?);
        let win_in_tube =
            Arc::new(Solid::cylinder("winInnerTube", 0.0, entrance_radius, 0.5 * window_thick)?);
        let win_out_tube =
            Arc::new(Solid::cylinder("winOuterTube", 0.0, exit_radius, 0.5 * window_thick)?);

        let kev_container =
            self.logical(side.suffixed("kevContainer_log_"), &kev_container_box, "Vacuum", None)?;
        let kev_seg = self.logical(side.suffixed("kevSeg_log_"), &kev_seg_box, "Vacuum", None)?;
        let kev_strip =
            self.logical(side.suffixed("kevStrip_log_"), &kev_strip_box, "Kevlar", None)?;
        let win_in =
            self.logical(side.suffixed("winIn_log_"), &win_in_tube, "Mylar", window_vis())?;
        let win_out =
            self.logical(side.suffixed("winOut_log_"), &win_out_tube, "Mylar", window_vis())?;
        for solid in [kev_strip, win_in, win_out] {
            self.geometry.set_user_limits(solid, self.solid_limits)?;
        }

        self.put(
            side.suffixed("kevContainer_phys_"),
            kev_container,
            container,
            -half_z + 0.5 * kev_thick,
        )?;
        self.put(side.suffixed("kevStrip_phys_"), kev_strip, kev_seg, 0.0)?;
        self.replicate(
            side.suffixed("kevlar_plane_"),
            kev_seg,
            kev_container,
            kev_count,
            kev_spacing,
        )?;
        self.put(
            side.suffixed("winIn_phys_"),
            win_in,
            container,
            -half_z + kev_thick + 0.5 * window_thick,
        )?;
        self.put(side.suffixed("winOut_phys_"), win_out, container, half_z - 0.5 * window_thick)?;

        let z = side.sign() * (DETECTOR_DISTANCE + mwpc_z(dims));
        self.place(
            side.labelled("mwpc_container_phys"),
            container,
            world,
            side.rotation(),
            on_axis(z),
            true,
        )?;
        Ok(container)
    }

    /// Package frame holding the MWPC and scintillator: Al entrance
    /// collimator, exit window with N2 gap and steel backing material.
    fn frame(
        &mut self,
        world: VolumeId,
        side: Side,
        dims: &ScintillatorDimensions,
        scint_tube: &Arc<Solid>,
        mwpc_box: &Arc<Solid>,
    ) -> GeometryResult<VolumeId> {
        let package_radius = 6.0 * INCH;
        let entrance_thick = 0.375 * INCH;
        let entrance_radius = 3.0 * INCH;
        let entrance_depth = 5.0 * INCH;
        let front_frame_thick = 1.0 * INCH;
        let mwpc_entrance_radius = 7.0 * CM;
        let mwpc_exit_radius = 7.5 * CM;
        let mwpc_half = mwpc_half_z();
        let mwpc_z = mwpc_z(dims);

        let section_length = entrance_depth + front_frame_thick;
        let entrance_tube = Arc::new(Solid::cylinder(
            "mwpc_entrance_tube",
            0.0,
            package_radius,
            0.5 * section_length,
        )?);
        let front_tube = Arc::new(Solid::cylinder(
            "entrance_front_tube",
            entrance_radius + entrance_thick,
            package_radius,
            0.5 * entrance_thick,
        )?);
        let mid_tube = Arc::new(Solid::cylinder(
            "entrance_mid_tube",
            entrance_radius,
            entrance_radius + entrance_thick,
            0.5 * entrance_depth,
        )?);
        let back_tube = Arc::new(Solid::cylinder(
            "entrance_back_tube",
            mwpc_entrance_radius,
            package_radius,
            0.5 * front_frame_thick,
        )?);

        let frame_half_z = entrance_depth + 2.0 * mwpc_half + 1.0 * INCH;
        let package_tube =
            Arc::new(Solid::cylinder("detPackage_tube", 0.0, package_radius, frame_half_z)?);
        // cut-outs are made before the frame is rotated into place
        let minus_scint = Arc::new(Solid::subtraction(
            "DPC_frame_minus_scint_container_log",
            package_tube,
            Arc::clone(scint_tube),
            Rotation::identity(),
            on_axis(-dims.face_z()),
        ));
        let frame_shape = Arc::new(Solid::subtraction(
            "frame_container_minus_Scint_MWPC",
            minus_scint,
            Arc::clone(mwpc_box),
            Rotation::identity(),
            on_axis(mwpc_z),
        ));

        let entrance_z = mwpc_z - 0.5 * (2.0 * mwpc_half + section_length);
        let exit_tube = Arc::new(Solid::cylinder(
            "mwpc_exit_tube",
            mwpc_exit_radius,
            package_radius,
            0.5 * BACK_WINDOW_FRAME_THICK,
        )?);
        let exit_z = mwpc_z + 0.5 * (2.0 * mwpc_half + BACK_WINDOW_FRAME_THICK);
        let exit_gas_tube = Arc::new(Solid::cylinder(
            "mwpc_exit_N2_tube",
            0.0,
            mwpc_exit_radius,
            0.5 * BACK_WINDOW_FRAME_THICK,
        )?);
        let back_stuff_thick = 1.0 * INCH;
        let back_stuff_tube = Arc::new(Solid::cylinder(
            "backstuff_tube",
            0.0,
            0.5 * package_radius,
            back_stuff_thick,
        )?);

        let entrance_vis = vis(0.7, 0.7, 0.7, 0.8);
        let entrance = self.logical(
            side.suffixed("mwpc_entrance_log_"),
            &entrance_tube,
            "Vacuum",
            invisible(),
        )?;
        let front = self.logical(
            side.suffixed("entrance_front_log_"),
            &front_tube,
            "Aluminum",
            entrance_vis,
        )?;
        let mid =
            self.logical(side.suffixed("entrance_mid_log_"), &mid_tube, "Aluminum", entrance_vis)?;
        let back = self.logical(
            side.suffixed("entrance_back_log_"),
            &back_tube,
            "Aluminum",
            entrance_vis,
        )?;
        let container = self.logical(
            side.suffixed("frame_container_log_"),
            &frame_shape,
            "Vacuum",
            invisible(),
        )?;
        let exit = self.logical(
            side.suffixed("mwpc_exit_log_"),
            &exit_tube,
            "Aluminum",
            vis(0.3, 0.3, 0.3, 0.8),
        )?;
        let exit_gas = self.logical(
            side.suffixed("mwpc_exit_N2_log_"),
            &exit_gas_tube,
            "MWPC_N2",
            invisible(),
        )?;
        let back_stuff =
            self.logical(side.suffixed("backStuff_log_"), &back_stuff_tube, "Stainless304", None)?;

        self.put(
            side.suffixed("entrance_front_phys_"),
            front,
            entrance,
            -0.5 * (section_length - entrance_thick),
        )?;
        self.put(side.suffixed("entrance_mid_phys_"), mid, entrance, -0.5 * front_frame_thick)?;
        self.put(
            side.suffixed("entrance_back_phys_"),
            back,
            entrance,
            0.5 * (section_length - front_frame_thick),
        )?;

        self.put(side.suffixed("frame_mwpc_entrance_"), entrance, container, entrance_z)?;
        self.put(side.suffixed("mwpc_exit_"), exit, container, exit_z)?;
        self.put(side.suffixed("mwpc_exit_N2_phys_"), exit_gas, container, exit_z)?;
        self.put(
            side.suffixed("backStuff_phys_"),
            back_stuff,
            container,
            frame_half_z - 0.5 * back_stuff_thick,
        )?;

        let z = side.sign() * DETECTOR_DISTANCE;
        self.place(
            side.labelled("Detector_Package_Frame"),
            container,
            world,
            side.rotation(),
            on_axis(z),
            true,
        )?;
        Ok(container)
    }
}

fn mwpc_half_z() -> f64 {
    0.5 * (5.0 * MM + 5.0 * MM + 2.0 * CM)
}

/// MWPC centre relative to the scintillator face, before the side flip.
fn mwpc_z(dims: &ScintillatorDimensions) -> f64 {
    -mwpc_half_z() - BACK_WINDOW_FRAME_THICK - (0.5 * dims.container_length() + dims.face_z())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_naming() {
        assert_eq!(Side::East.suffixed("scint_log_"), "scint_log_0");
        assert_eq!(Side::West.suffixed("be_win_log"), "be_win_log1");
        assert_eq!(Side::West.labelled("mwpc_container_log"), "mwpc_container_log_WEST");
        assert_eq!(Side::East.sign(), -1.0);
        assert!(Side::West.rotation().is_identity());
    }

    #[test]
    fn test_scintillator_dimensions() {
        let dims = ScintillatorDimensions::default();
        assert!(dims.is_consistent());
        assert!((dims.container_length() - 35.4).abs() < 1e-9);
        assert!((dims.face_z() + 17.7).abs() < 1e-9);
        let thin = ScintillatorDimensions {
            light_guide_thick: 1.0,
            ..dims
        };
        assert!(!thin.is_consistent());
    }

    #[test]
    fn test_mwpc_offset() {
        let dims = ScintillatorDimensions::default();
        assert!((mwpc_half_z() - 15.0).abs() < 1e-12);
        assert!((mwpc_z(&dims) + 27.7).abs() < 1e-9);
    }
}
