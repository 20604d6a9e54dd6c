use ucnsim::detector::ScintillatorDimensions;
use ucnsim::units::{ATMOSPHERE, MG_PER_CM3, UNIVERSE_MEAN_DENSITY, VOLT};
use ucnsim::volume::{Axis, PhysicalVolume};
use ucnsim::{Config, Detector, DetectorConstruction, Side};

fn detector() -> Detector {
    DetectorConstruction::construct(&Config::new()).unwrap()
}

fn placement_z(d: &Detector, name: &str) -> f64 {
    let id = d.geometry.find_physical(name).unwrap();
    match d.geometry.physical(id).unwrap() {
        PhysicalVolume::Placement(p) => p.translation[2],
        PhysicalVolume::Replica(_) => panic!("{} is a replica", name),
    }
}

#[test]
fn test_detector_builds_and_passes_containment() {
    let d = detector();
    assert!(d.geometry.overlap_violations().is_empty());
    assert_eq!(d.geometry.world().unwrap(), d.volumes.world);
    assert_eq!(d.geometry.world_name(), "World_phys");
}

#[test]
fn test_expected_volumes_exist_for_both_sides() {
    let d = detector();
    for stem in [
        "scint_log_",
        "Dead_scint_log_",
        "light_guide_log_",
        "backing_log_",
        "N2_Vol_log_",
        "mwpc_gas_log_",
        "anode_log_",
        "cathode_log_",
        "kevStrip_log_",
        "winIn_log_",
        "winOut_log_",
        "trap_win_log_",
        "collimator_log_",
        "frame_container_log_",
        "backStuff_log_",
    ] {
        for side in Side::ALL {
            let name = side.suffixed(stem);
            assert!(d.geometry.find_logical(&name).is_some(), "missing {}", name);
        }
    }
    for name in [
        "World_log",
        "source_container_log",
        "source_window_log",
        "source_coating_log0",
        "source_coating_log1",
        "decayTrap_tube_log",
        "mwpc_container_log_EAST",
        "mwpc_container_log_WEST",
    ] {
        assert!(d.geometry.find_logical(name).is_some(), "missing {}", name);
    }
    assert!(d.geometry.logical_by_name("no_such_log").is_err());
}

#[test]
fn test_materials_of_key_volumes() {
    let d = detector();
    let material = |name: &str| d.geometry.logical_by_name(name).unwrap().material.name.clone();
    assert_eq!(material("scint_log_0"), "Scintillator");
    assert_eq!(material("mwpc_gas_log_1"), "Pentane");
    assert_eq!(material("anode_log_0"), "Tungsten");
    assert_eq!(material("cathode_plate_log_1"), "Gold");
    assert_eq!(material("N2_Vol_log_0"), "MWPC_N2");
    assert_eq!(material("decayTrap_tube_log"), "Copper");
    assert_eq!(material("source_holder_log"), "Brass");
    assert_eq!(material("backStuff_log_1"), "Stainless304");
}

#[test]
fn test_vacuum_volumes_and_visibility() {
    let d = detector();
    let vacuum = d
        .geometry
        .logical_volumes()
        .filter(|(_, v)| v.material.name == "Vacuum")
        .count();
    assert_eq!(vacuum, 14);

    let mut names: Vec<&str> = d.geometry.physical_volumes().map(|(_, p)| p.name()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);

    assert!(!d.geometry.logical_by_name("World_log").unwrap().is_visible());
    assert!(d.geometry.logical_by_name("scint_log_1").unwrap().is_visible());
}

#[test]
fn test_tree_depths() {
    let d = detector();
    let depth = |name: &str| {
        let id = d.geometry.find_logical(name).unwrap();
        d.geometry.depth(id).unwrap()
    };
    assert_eq!(depth("World_log"), 0);
    assert_eq!(depth("source_container_log"), 1);
    assert_eq!(depth("source_window_log"), 2);
    assert_eq!(depth("scint_log_0"), 2);
    assert_eq!(depth("mwpc_gas_log_1"), 2);
    assert_eq!(depth("anode_log_0"), 5);
    assert_eq!(depth("cathode_log_1"), 5);
    assert_eq!(depth("entrance_front_log_0"), 3);
}

#[test]
fn test_sides_mirror_each_other() {
    let d = detector();
    let east = placement_z(&d, "scint_container_phys_EAST");
    let west = placement_z(&d, "scint_container_phys_WEST");
    assert!((west - 2217.7).abs() < 1e-9);
    assert!((east + west).abs() < 1e-9);
    assert!((placement_z(&d, "mwpc_container_phys_WEST") - 2172.3).abs() < 1e-9);
    assert!((placement_z(&d, "Detector_Package_Frame_EAST") + 2200.0).abs() < 1e-9);
    assert!((placement_z(&d, "trap_win_0") + placement_z(&d, "trap_win_1")).abs() < 1e-12);

    let id = d.geometry.find_physical("mwpc_container_phys_EAST").unwrap();
    match d.geometry.physical(id).unwrap() {
        PhysicalVolume::Placement(p) => assert!(!p.rotation.is_identity() && p.check_overlaps),
        _ => panic!("expected a placement"),
    }
}

#[test]
fn test_wire_and_string_replicas() {
    let d = detector();
    for (name, count, width) in [
        ("AnodeArray_0", 64, 2.54),
        ("CathodeArray1_1", 64, 2.54),
        ("CathodeArray2_0", 64, 2.54),
        ("kevlar_plane_1", 32, 5.0),
    ] {
        let id = d.geometry.find_physical(name).unwrap();
        match d.geometry.physical(id).unwrap() {
            PhysicalVolume::Replica(r) => {
                assert_eq!(r.count, count);
                assert!((r.width - width).abs() < 1e-12);
                assert_eq!(r.axis, Axis::X);
            }
            _ => panic!("{} should be a replica", name),
        }
    }
}

#[test]
fn test_user_limits() {
    let config = Config {
        scint_step_limit_mm: 0.25,
        ..Config::new()
    };
    let d = DetectorConstruction::construct(&config).unwrap();
    let step = |name: &str| {
        d.geometry
            .logical_by_name(name)
            .unwrap()
            .user_limits
            .map(|l| l.max_step)
    };
    assert_eq!(step("World_log"), Some(10_000.0));
    assert_eq!(step("mwpc_container_log_WEST"), Some(10.0));
    assert_eq!(step("kevStrip_log_1"), Some(0.25));
    assert_eq!(step("winOut_log_0"), Some(0.25));
    assert_eq!(step("trap_win_log_1"), Some(0.25));
    assert_eq!(step("scint_log_0"), None);
}

#[test]
fn test_fields_attached_to_wirechambers() {
    let d = detector();
    for side in Side::ALL {
        let field = d.mwpc_field(side).unwrap();
        assert_eq!(field.side, side);
        assert!((field.potential - 2700.0 * VOLT).abs() < 1e-15);
        assert!((field.translation[2] - side.sign() * 2172.3).abs() < 1e-9);
    }
    assert!(d.mwpc_field(Side::East).unwrap().rotation.is_some());
    assert!(d.mwpc_field(Side::West).unwrap().rotation.is_none());

    // the chamber field reaches the wires but not the scintillator
    let anode = d.geometry.find_logical("anode_log_0").unwrap();
    assert_eq!(d.geometry.effective_field(anode).unwrap().side, Side::East);
    let scint = d.geometry.find_logical("scint_log_0").unwrap();
    assert!(d.geometry.effective_field(scint).is_none());
    assert_eq!(d.global_field.max_loop_count, i32::MAX);
}

#[test]
fn test_vacuum_pressure() {
    let mut d = detector();
    let world = d.geometry.logical(d.volumes.world).unwrap();
    assert_eq!(world.material.density, UNIVERSE_MEAN_DENSITY);

    let updated = d.set_vacuum_pressure(ATMOSPHERE).unwrap();
    assert_eq!(updated, 14);
    let world = d.geometry.logical(d.volumes.world).unwrap();
    assert!((world.material.density - 1.2048 * MG_PER_CM3).abs() < 1e-12);

    let thin = Config {
        vacuum_pressure_torr: 1e-3,
        ..Config::new()
    };
    let d = DetectorConstruction::construct(&thin).unwrap();
    let density = d.materials.get("Vacuum").unwrap().density;
    assert!((density - 1.2048 * MG_PER_CM3 * 1e-3 / 760.0).abs() < 1e-18);
}

#[test]
fn test_default_scintillator_dimensions_are_consistent() {
    assert!(ScintillatorDimensions::default().is_consistent());
}

#[test]
fn test_json_dump() {
    let d = detector();
    let json = d.geometry.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["logical"].as_array().unwrap().len(),
        d.geometry.logical_count()
    );
    assert_eq!(
        value["physical"].as_array().unwrap().len(),
        d.geometry.physical_count()
    );
}

#[test]
fn test_global_config_snapshot() {
    Config::set_global(Config {
        check_overlaps: false,
        ..Config::new()
    })
    .unwrap();
    let d = DetectorConstruction::from_global().unwrap();
    assert!(d.geometry.find_logical("World_log").is_some());
    Config::set_global(Config::new()).unwrap();
}
