//! Every printable part of the microscope and the options that select it.
//!
//! Each function declares one family of parts. Names encode the variant
//! (`-M` motor lugs, `-BS`/`_beamsplitter` beamsplitter, `_brim` smart brim)
//! so the STL selector and humans agree on what a file contains.
use crate::emitter::{Generator, ScadTask};
use crate::error::GenerateResult;
use crate::value::{option_map, param_map, OptionMap, OptionValue, ParamMap, ParamValue};

/// Stage sizes currently built (`LS` = large stage).
const STAGE_SIZES: [&str; 1] = ["LS"];
/// Sample heights currently built, in mm.
const SAMPLE_Z: [i64; 1] = [65];

/// Cameras with a dedicated optics module.
const OPTICS_CAMERAS: [&str; 3] = ["picamera_2", "logitech_c270", "m12"];
/// Only RMS objectives are compatible with the beamsplitter.
const RMS_LENSES: [&str; 3] = ["rms_f40d16", "rms_f50d13", "rms_infinity_f50d13"];
/// Lenses only used with prebuilt camera mounts.
const MOUNT_ONLY_LENSES: [&str; 2] = ["dashcam_lens", "6ledcam_lens"];
/// The infinity-corrected objective needs the taller stand.
const INFINITY_LENS: &str = "rms_infinity_f50d13";

/// Options used when building a whole microscope variant set.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantOptions {
    /// Copy prebuilt STLs for cameras without an OpenSCAD mount.
    pub include_extra_files: bool,
}

/// Declare every part of the microscope.
pub fn declare_all(generator: &mut Generator, options: VariantOptions) -> GenerateResult<()> {
    main_bodies(generator)?;
    optics_modules(generator)?;
    microscope_stands(generator)?;
    motor_driver_cases(generator)?;
    feet(generator)?;
    camera_platforms(generator)?;
    lens_spacers(generator)?;
    picamera_tools(generator)?;
    sample_risers(generator)?;
    small_parts(generator)?;
    if options.include_extra_files {
        extra_files(generator)?;
    }
    Ok(())
}

fn stage_parameters(stage_size: &str, sample_z: i64) -> ParamMap {
    param_map([
        ("big_stage", (stage_size == "LS").into()),
        ("sample_z", sample_z.into()),
    ])
}

/// `(camera, lens)` pairs with an optics module.
fn optics_versions() -> Vec<(&'static str, &'static str)> {
    let mut versions = vec![
        ("picamera_2", "pilens"),
        ("logitech_c270", "c270_lens"),
        ("m12", "m12_lens"),
    ];
    for camera in OPTICS_CAMERAS {
        for lens in RMS_LENSES {
            versions.push((camera, lens));
        }
    }
    versions
}

/// Every lens any part is built for.
fn all_lenses() -> Vec<&'static str> {
    let mut lenses: Vec<&str> = optics_versions().into_iter().map(|(_, lens)| lens).collect();
    lenses.extend(MOUNT_ONLY_LENSES);
    lenses.sort_unstable();
    lenses.dedup();
    lenses
}

fn is_rms(lens: &str) -> bool {
    RMS_LENSES.contains(&lens)
}

fn main_bodies(generator: &mut Generator) -> GenerateResult<()> {
    // Every current body has motor lugs; hand-actuated builds use thumbwheels.
    let motors = true;
    for stage_size in STAGE_SIZES {
        for sample_z in SAMPLE_Z {
            for beamsplitter in [true, false] {
                for brim in [true, false] {
                    let output = format!(
                        "main_body_{stage_size}{sample_z}{}{}{}.stl",
                        if motors { "-M" } else { "" },
                        if beamsplitter { "-BS" } else { "" },
                        if brim { "_brim" } else { "" },
                    );
                    let mut parameters = stage_parameters(stage_size, sample_z);
                    parameters.insert("motor_lugs".to_string(), motors.into());
                    parameters.insert("enable_smart_brim".to_string(), brim.into());

                    generator.declare(
                        ScadTask::new(output, "main_body.scad")
                            .parameters(parameters)
                            .openscad_only_parameters(param_map([(
                                "beamsplitter",
                                beamsplitter.into(),
                            )]))
                            .select_if(option_map([(
                                "reflection_illumination",
                                beamsplitter.into(),
                            )])),
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn optics_modules(generator: &mut Generator) -> GenerateResult<()> {
    for sample_z in SAMPLE_Z {
        for (camera, lens) in optics_versions() {
            let beamsplitter_options: &[bool] = if is_rms(lens) { &[true, false] } else { &[false] };
            for &beamsplitter in beamsplitter_options {
                let output = format!(
                    "optics_{camera}_{lens}{}.stl",
                    if beamsplitter { "_beamsplitter" } else { "" }
                );

                let box_h = if lens == INFINITY_LENS { 45 } else { 30 };
                let mut select_if = option_map([
                    ("reflection_illumination", beamsplitter.into()),
                    ("microscope_stand:box_h", box_h.into()),
                ]);
                if lens == "pilens" {
                    select_if.insert("use_pilens_optics_module".to_string(), true.into());
                }
                if !is_rms(lens) {
                    select_if.insert("riser".to_string(), "no riser".into());
                }

                generator.declare(
                    ScadTask::new(output, "optics.scad")
                        .parameters(param_map([
                            ("sample_z", sample_z.into()),
                            ("optics", lens.into()),
                            ("camera", camera.into()),
                        ]))
                        .openscad_only_parameters(param_map([("beamsplitter", beamsplitter.into())]))
                        .select_if(select_if),
                )?;
            }
        }
    }
    Ok(())
}

fn microscope_stands(generator: &mut Generator) -> GenerateResult<()> {
    for stand_height in [30_i64, 45] {
        for beamsplitter in [true, false] {
            let output = format!(
                "microscope_stand_{stand_height}{}.stl",
                if beamsplitter { "-BS" } else { "" }
            );
            let compatible_lenses: Vec<&str> = all_lenses()
                .into_iter()
                .filter(|&lens| (lens == INFINITY_LENS) == (stand_height == 45))
                .collect();
            let clauses: Vec<OptionMap> = compatible_lenses
                .into_iter()
                .map(|optics| {
                    option_map([
                        ("pi_in_base", true.into()),
                        ("base", "bucket".into()),
                        ("reflection_illumination", beamsplitter.into()),
                        ("optics", optics.into()),
                    ])
                })
                .collect();

            generator.declare(
                ScadTask::new(output, "microscope_stand.scad")
                    .openscad_only_parameters(param_map([("beamsplitter", beamsplitter.into())]))
                    .file_local_parameters(param_map([("box_h", stand_height.into())]))
                    .select_if(clauses),
            )?;
        }
    }

    generator.declare(
        ScadTask::new("microscope_stand_no_pi.stl", "microscope_stand_no_pi.scad").select_if(
            option_map([("pi_in_base", false.into()), ("base", "bucket".into())]),
        ),
    )
}

/// Alternative electronics cases; not offered by the STL selector.
fn motor_driver_cases(generator: &mut Generator) -> GenerateResult<()> {
    for electronics in ["sangaboard", "arduino_nano"] {
        generator.build_only(
            &format!("motor_driver_case_{electronics}.stl"),
            "motor_driver_case.scad",
            &param_map([("motor_driver_electronics", electronics.into())]),
        )?;
    }
    Ok(())
}

fn feet(generator: &mut Generator) -> GenerateResult<()> {
    let non_rms: Vec<&str> = all_lenses().into_iter().filter(|l| !is_rms(l)).collect();

    // Tall feet give RMS objectives enough clearance when there is no bucket.
    let tall = option_map([
        ("base", "feet".into()),
        ("optics", OptionValue::one_of(RMS_LENSES)),
    ]);
    let tall_height = param_map([("foot_height", 26.into())]);
    generator.declare(
        ScadTask::new("back_foot_tall.stl", "back_foot.scad")
            .openscad_only_parameters(tall_height.clone())
            .select_if(tall.clone()),
    )?;
    generator.declare(
        ScadTask::new("feet_tall.stl", "feet.scad")
            .openscad_only_parameters(tall_height)
            .select_if(tall),
    )?;

    let short_on_feet = option_map([
        ("base", "feet".into()),
        ("optics", OptionValue::one_of(non_rms)),
    ]);
    let short_in_bucket = option_map([
        ("base", "bucket".into()),
        ("optics", OptionValue::one_of(all_lenses())),
    ]);
    let short_height = param_map([("foot_height", 15.into())]);
    generator.declare(
        ScadTask::new("back_foot.stl", "back_foot.scad")
            .openscad_only_parameters(short_height.clone())
            .select_if(short_on_feet.clone()),
    )?;
    generator.declare(
        ScadTask::new("feet.stl", "feet.scad")
            .openscad_only_parameters(short_height)
            .select_if(vec![short_in_bucket, short_on_feet]),
    )
}

fn camera_platforms(generator: &mut Generator) -> GenerateResult<()> {
    let versions = [
        ("picamera_2", "pilens"),
        ("6ledcam", "6ledcam_lens"),
        ("dashcam", "dashcam_lens"),
    ];
    for stage_size in STAGE_SIZES {
        for sample_z in SAMPLE_Z {
            for (camera, optics) in versions {
                let mut parameters = stage_parameters(stage_size, sample_z);
                parameters.insert("camera".to_string(), camera.into());
                generator.declare(
                    ScadTask::new(
                        format!("camera_platform_{camera}_{stage_size}{sample_z}.stl"),
                        "camera_platform.scad",
                    )
                    .parameters(parameters)
                    .select_if(option_map([
                        ("riser", "no riser".into()),
                        ("optics", optics.into()),
                    ])),
                )?;
            }
        }
    }
    Ok(())
}

fn lens_spacers(generator: &mut Generator) -> GenerateResult<()> {
    for stage_size in STAGE_SIZES {
        for sample_z in SAMPLE_Z {
            let mut parameters = stage_parameters(stage_size, sample_z);
            parameters.insert("optics".to_string(), "pilens".into());
            generator.declare(
                ScadTask::new(
                    format!("lens_spacer_picamera_2_pilens_{stage_size}{sample_z}.stl"),
                    "lens_spacer.scad",
                )
                .parameters(parameters)
                .select_if(option_map([
                    ("camera", "picamera_2".into()),
                    ("reflection_illumination", false.into()),
                    ("use_pilens_optics_module", false.into()),
                    ("riser", "no riser".into()),
                ])),
            )?;
        }
    }
    Ok(())
}

fn picamera_tools(generator: &mut Generator) -> GenerateResult<()> {
    let camera = param_map([("camera", "picamera_2".into())]);
    for tool in ["gripper", "lens_gripper"] {
        generator.declare(
            ScadTask::new(
                format!("picamera_2_{tool}.stl"),
                format!("cameras/picamera_2_{tool}.scad"),
            )
            .parameters(camera.clone())
            .select_if(option_map([("legacy_picamera_tools", true.into())])),
        )?;
    }
    generator.declare(
        ScadTask::new("picamera_2_cover.stl", "cameras/picamera_2_cover.scad")
            .parameters(camera)
            .select_if(option_map([("optics", OptionValue::one_of(RMS_LENSES))])),
    )
}

fn sample_risers(generator: &mut Generator) -> GenerateResult<()> {
    for riser in ["sample", "slide"] {
        generator.declare(
            ScadTask::new(format!("{riser}_riser_LS10.stl"), format!("{riser}_riser.scad"))
                .parameters(param_map([("big_stage", true.into())]))
                .file_local_parameters(param_map([("h", 10.into())]))
                .select_if(option_map([("riser", riser.into())])),
        )?;
    }
    Ok(())
}

fn small_parts(generator: &mut Generator) -> GenerateResult<()> {
    for part in [
        "actuator_assembly_tools",
        "condenser",
        "illumination_dovetail",
        "lens_tool",
    ] {
        generator.declare(ScadTask::new(format!("{part}.stl"), format!("{part}.scad")))?;
    }

    let selected: [(&str, OptionMap); 6] = [
        (
            "actuator_tension_band",
            option_map([("include_actuator_tension_band", true.into())]),
        ),
        (
            "actuator_drilling_jig",
            option_map([("include_actuator_drilling_jig", true.into())]),
        ),
        ("fl_cube", option_map([("reflection_illumination", true.into())])),
        (
            "motor_driver_case",
            option_map([("motorised", true.into()), ("base", "bucket".into())]),
        ),
        ("small_gears", option_map([("motorised", true.into())])),
        (
            "thumbwheels",
            option_map([
                ("motorised", false.into()),
                ("use_motor_gears_for_hand_actuation", false.into()),
            ]),
        ),
    ];
    for (part, select_if) in selected {
        generator.declare(
            ScadTask::new(format!("{part}.stl"), format!("{part}.scad")).select_if(select_if),
        )?;
    }

    generator.declare(ScadTask::new("gears.stl", "gears.scad").select_if(vec![
        option_map([("motorised", true.into())]),
        option_map([
            ("motorised", false.into()),
            ("use_motor_gears_for_hand_actuation", true.into()),
        ]),
    ]))?;
    generator.declare(
        ScadTask::new("sample_clips.stl", "sample_clips.scad")
            .select_if(option_map([("riser", "sample".into())])),
    )?;
    generator.declare(
        ScadTask::new("reflection_illuminator.stl", "reflection_illuminator.scad")
            .select_if(option_map([("reflection_illumination", true.into())])),
    )?;

    generator.declare(
        ScadTask::new("just_leg_test.stl", "just_leg_test.scad")
            .openscad_only_parameters(param_map([("big_stage", false.into())])),
    )
}

/// Prebuilt mounts for cameras that have no OpenSCAD model.
fn extra_files(generator: &mut Generator) -> GenerateResult<()> {
    let mount = |camera: &str| {
        option_map([
            ("camera", camera.into()),
            ("optics", ParamValue::from(format!("{camera}_lens")).into()),
            ("riser", "no riser".into()),
        ])
    };
    for camera in ["6ledcam", "dashcam"] {
        generator.copy_stl(&format!("{camera}_mount_top.stl"), mount(camera))?;
    }
    generator.copy_stl(
        "dashcam_and_6ledcam_mount_bottom.stl",
        vec![mount("dashcam"), mount("6ledcam")],
    )
}

#[cfg(test)]
#[path = "microscope_tests.rs"]
mod tests;
