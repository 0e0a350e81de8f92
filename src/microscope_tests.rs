use super::{all_lenses, declare_all, optics_versions, VariantOptions};
use crate::catalog::default_catalog;
use crate::emitter::Generator;
use crate::paths::BuildPaths;
use crate::schema::{ChangeableOption, Manifest};
use crate::value::ParamValue;

fn generate(include_extra_files: bool) -> Manifest {
    let mut generator = Generator::new(BuildPaths::default(), "openscad", true);
    declare_all(&mut generator, VariantOptions { include_extra_files }).expect("declare parts");
    let catalog = default_catalog().expect("catalog");
    generator
        .finish(&catalog)
        .expect("finish")
        .manifest
        .expect("manifest")
}

fn strs(values: &[&str]) -> ChangeableOption {
    ChangeableOption::Values(values.iter().map(|value| ParamValue::from(*value)).collect())
}

#[test]
fn lens_lists_cover_every_documented_lens() {
    assert_eq!(optics_versions().len(), 12);
    assert_eq!(
        all_lenses(),
        [
            "6ledcam_lens",
            "c270_lens",
            "dashcam_lens",
            "m12_lens",
            "pilens",
            "rms_f40d16",
            "rms_f50d13",
            "rms_infinity_f50d13",
        ]
    );
}

#[test]
fn every_part_gets_one_build_edge() {
    let mut generator = Generator::new(BuildPaths::default(), "openscad", true);
    declare_all(&mut generator, VariantOptions::default()).expect("declare parts");
    assert_eq!(generator.graph().edges().len(), 59);
    assert_eq!(generator.registry().expect("registry").records().len(), 71);

    let mut with_extras = Generator::new(BuildPaths::default(), "openscad", false);
    declare_all(
        &mut with_extras,
        VariantOptions {
            include_extra_files: true,
        },
    )
    .expect("declare parts");
    assert_eq!(with_extras.graph().edges().len(), 62);
}

#[test]
fn microscope_schema_matches_catalog() {
    let manifest = generate(false);
    let options = &manifest.options;
    assert_eq!(options.len(), 14);

    for key in [
        "enable_smart_brim",
        "include_actuator_drilling_jig",
        "include_actuator_tension_band",
        "legacy_picamera_tools",
        "motorised",
        "pi_in_base",
        "reflection_illumination",
        "use_motor_gears_for_hand_actuation",
        "use_pilens_optics_module",
    ] {
        assert_eq!(options[key], ChangeableOption::Bool, "{key}");
    }

    assert_eq!(
        options["camera"],
        strs(&["picamera_2", "logitech_c270", "m12", "6ledcam", "dashcam"])
    );
    assert_eq!(
        options["optics"],
        strs(&[
            "rms_f50d13",
            "rms_infinity_f50d13",
            "pilens",
            "c270_lens",
            "m12_lens",
            "6ledcam_lens",
            "dashcam_lens",
            "rms_f40d16",
        ])
    );
    assert_eq!(options["riser"], strs(&["no riser", "sample", "slide"]));
    assert_eq!(options["base"], strs(&["bucket", "feet"]));
    assert_eq!(
        options["microscope_stand:box_h"],
        ChangeableOption::Values(vec![ParamValue::from(30), ParamValue::from(45)])
    );

    // constant build parameters never reach the selector
    for key in ["big_stage", "sample_z", "motor_lugs", "sample_riser:h", "beamsplitter"] {
        assert!(!options.contains_key(key), "{key}");
    }
}

#[test]
fn stl_records_are_sorted_and_carry_predicates() {
    let manifest = generate(true);
    let names: Vec<&str> = manifest.stls.iter().map(|r| r.stl.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    let gears: Vec<_> = manifest
        .stls
        .iter()
        .filter(|record| record.stl == "gears.stl")
        .collect();
    assert_eq!(gears.len(), 2);

    let bottom: Vec<_> = manifest
        .stls
        .iter()
        .filter(|record| record.stl == "dashcam_and_6ledcam_mount_bottom.stl")
        .collect();
    assert_eq!(bottom.len(), 2);
    assert!(bottom
        .iter()
        .all(|record| record.input == "dashcam_and_6ledcam_mount_bottom.stl"));
}

#[test]
fn every_required_pattern_matches_a_part() {
    let manifest = generate(false);
    let catalog = default_catalog().expect("catalog");
    for pattern in catalog.required_patterns().expect("patterns") {
        assert!(
            manifest.stls.iter().any(|record| pattern.is_match(&record.stl)),
            "{pattern}"
        );
    }
}

#[test]
fn presets_only_use_changeable_options() {
    let manifest = generate(false);
    for preset in &manifest.presets {
        for key in preset.parameters.keys() {
            assert!(manifest.options.contains_key(key), "{}: {key}", preset.key);
        }
    }
}
