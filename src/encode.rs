//! OpenSCAD command-line parameter encoding.
use crate::value::{ParamMap, ParamValue};

/// Render parameters as OpenSCAD `-D 'name=value'` definitions.
///
/// Names and string values are not escaped; a `'` or `"` inside either will
/// break the generated command line.
pub fn parameters_to_string(parameters: &ParamMap) -> String {
    parameters
        .iter()
        .map(|(name, value)| format!("-D '{name}={}'", scad_literal(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn scad_literal(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(value) => value.to_string(),
        ParamValue::Int(value) => value.to_string(),
        ParamValue::Float(value) => value.to_string(),
        ParamValue::Str(value) => format!("\"{value}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::param_map;

    #[test]
    fn encodes_each_value_kind() {
        let params = param_map([
            ("big_stage", true.into()),
            ("camera", "picamera_2".into()),
            ("sample_z", 65.into()),
            ("tilt", 2.5.into()),
        ]);
        assert_eq!(
            parameters_to_string(&params),
            "-D 'big_stage=true' -D 'camera=\"picamera_2\"' -D 'sample_z=65' -D 'tilt=2.5'"
        );
    }

    #[test]
    fn empty_parameters_encode_to_empty_string() {
        assert_eq!(parameters_to_string(&ParamMap::new()), "");
    }

    #[test]
    fn quotes_are_passed_through() {
        let params = param_map([("label", "it's".into())]);
        assert_eq!(parameters_to_string(&params), "-D 'label=\"it's\"'");
    }
}
