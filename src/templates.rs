pub const MICROSCOPE_CATALOG_JSON: &str = include_str!("../templates/microscope_catalog.json");
