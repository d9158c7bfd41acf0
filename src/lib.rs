use js_sys::{Array, Function, Object, Reflect};
use log::{LevelFilter, warn};
use wasm_bindgen::prelude::*;

pub mod animation;
pub mod config;
pub mod error;
pub mod garden;
pub mod growth;
pub mod interaction;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod music;

pub use config::{GroveConfig, MusicParams};
pub use error::GroveError;
pub use garden::{Garden, NoteEvent, TreeId};
pub use growth::{GrowthParams, TreeAggregate};

use interaction::ground_intersection;
use math::Vec3;
use music::Oscillator;

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Info);
}

/// Engine state exposed to JavaScript
#[wasm_bindgen]
pub struct SonicGrove {
    garden: Garden,
}

#[wasm_bindgen]
impl SonicGrove {
    /// Create an engine with default settings and a fixed seed
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> Result<SonicGrove, JsValue> {
        Self::build(GroveConfig::default(), seed)
    }

    /// Create an engine from a YAML configuration
    #[wasm_bindgen]
    pub fn with_config(yaml: &str, seed: f64) -> Result<SonicGrove, JsValue> {
        let config = GroveConfig::from_yaml(yaml).map_err(to_js)?;
        Self::build(config, seed)
    }

    /// Create an engine seeded from `Math.random`
    #[wasm_bindgen]
    pub fn with_random_seed() -> Result<SonicGrove, JsValue> {
        Self::build(GroveConfig::default(), js_sys::Math::random() * u32::MAX as f64)
    }

    fn build(config: GroveConfig, seed: f64) -> Result<SonicGrove, JsValue> {
        let garden = Garden::new(config, seed as u64).map_err(to_js)?;
        Ok(Self { garden })
    }

    /// Plant a tree at a world point without placement checks
    #[wasm_bindgen]
    pub fn plant_tree(&mut self, x: f32, y: f32, z: f32) -> u32 {
        self.garden.plant_tree(Vec3::new(x, y, z)).0
    }

    /// Plant a tree if the point is far enough from the viewer and the
    /// tree limit has not been reached
    #[wasm_bindgen]
    pub fn try_plant_tree(&mut self, x: f32, y: f32, z: f32, vx: f32, vy: f32, vz: f32) -> Option<u32> {
        self.garden
            .try_plant(Vec3::new(x, y, z), Vec3::new(vx, vy, vz))
            .map(|id| id.0)
    }

    /// Plant where a view ray meets flat ground at `ground_height`
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn plant_from_ray(
        &mut self,
        ox: f32,
        oy: f32,
        oz: f32,
        dx: f32,
        dy: f32,
        dz: f32,
        ground_height: f32,
    ) -> Option<u32> {
        let origin = Vec3::new(ox, oy, oz);
        let point = ground_intersection(origin, Vec3::new(dx, dy, dz), ground_height)?;
        self.garden.try_plant(point, origin).map(|id| id.0)
    }

    /// Advance the simulation by one frame
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f64) {
        self.garden.update(dt);
    }

    #[wasm_bindgen]
    pub fn dispose_tree(&mut self, id: u32) -> bool {
        self.garden.dispose(TreeId(id))
    }

    #[wasm_bindgen]
    pub fn clear_trees(&mut self) {
        self.garden.clear();
    }

    #[wasm_bindgen]
    pub fn tree_count(&self) -> u32 {
        self.garden.tree_count() as u32
    }

    /// Branch line segments (6 floats per branch) in tree-local space
    #[wasm_bindgen]
    pub fn line_segments(&self, id: u32) -> Vec<f32> {
        self.garden
            .geometry(TreeId(id))
            .map(|g| g.line_segments.clone())
            .unwrap_or_default()
    }

    /// Instanced node matrices (16 floats each, column-major)
    #[wasm_bindgen]
    pub fn node_transforms(&self, id: u32) -> Vec<f32> {
        self.garden
            .geometry(TreeId(id))
            .map(|g| g.node_transforms.clone())
            .unwrap_or_default()
    }

    /// Instanced node colors (RGB)
    #[wasm_bindgen]
    pub fn node_colors(&self, id: u32) -> Vec<f32> {
        self.garden
            .geometry(TreeId(id))
            .map(|g| g.node_colors.clone())
            .unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn line_color(&self, id: u32) -> Vec<f32> {
        self.garden
            .geometry(TreeId(id))
            .map(|g| g.line_color.to_vec())
            .unwrap_or_default()
    }

    /// Register `callback(note)` for every note sung by any tree
    ///
    /// `note` is `{ tree, name, midi, frequency, oscillator, x, y, z }`.
    #[wasm_bindgen]
    pub fn on_note_played(&mut self, callback: Function) {
        self.garden.on_note_played(move |event| {
            let result = note_event_to_js(event)
                .and_then(|value| callback.call1(&JsValue::NULL, &value));
            if let Err(e) = result {
                warn!("note callback failed: {:?}", e);
            }
        });
    }

    #[wasm_bindgen]
    pub fn set_scale(&mut self, id: &str) {
        self.garden.set_active_scale(id);
    }

    #[wasm_bindgen]
    pub fn set_scale_index(&mut self, index: u32) {
        self.garden.set_active_scale_index(index as usize);
    }

    #[wasm_bindgen]
    pub fn set_oscillator(&mut self, key: &str) {
        self.garden.set_active_oscillator(key);
    }

    #[wasm_bindgen]
    pub fn set_oscillator_index(&mut self, index: u32) {
        self.garden.set_active_oscillator_index(index as usize);
    }

    /// Display names of the available scales, in menu order
    #[wasm_bindgen]
    pub fn scale_names(&self) -> Array {
        self.garden
            .scales()
            .iter()
            .map(|scale| JsValue::from_str(&scale.name))
            .collect()
    }

    /// Display names of the available oscillators, in menu order
    #[wasm_bindgen]
    pub fn oscillator_names(&self) -> Array {
        Oscillator::ALL
            .iter()
            .map(|osc| JsValue::from_str(osc.display_name()))
            .collect()
    }
}

fn to_js(e: GroveError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn note_event_to_js(event: &NoteEvent) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"tree".into(), &JsValue::from(event.tree.0))?;
    Reflect::set(&obj, &"name".into(), &JsValue::from_str(&event.note.name))?;
    Reflect::set(&obj, &"midi".into(), &JsValue::from(event.note.midi))?;
    Reflect::set(&obj, &"frequency".into(), &JsValue::from(event.note.frequency))?;
    Reflect::set(&obj, &"oscillator".into(), &JsValue::from_str(event.oscillator.key()))?;
    Reflect::set(&obj, &"x".into(), &JsValue::from(event.position.x))?;
    Reflect::set(&obj, &"y".into(), &JsValue::from(event.position.y))?;
    Reflect::set(&obj, &"z".into(), &JsValue::from(event.position.z))?;
    Ok(obj.into())
}
