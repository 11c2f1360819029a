use wasm_bindgen::prelude::*;

mod bodies;
use bodies::SolarSystem;

orrery_web::export_orrery!(SolarSystem, "solar-system");
