//! JavaScript entry points.

use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlInputElement;

use crate::config::IntakeConfig;
use crate::intake::{Dropzone, ExtractedImage};
use crate::logging::init_logging;
use crate::platform::web::{WebDir, install};

#[wasm_bindgen(start)]
pub fn start() {
    let config = IntakeConfig::load_from_local_storage().unwrap_or_default();
    init_logging(config.log_level);
    log::info!("LEP intake loaded");
}

/// Convert an image into a plain JS object:
/// `{ name, type, lastModified, bytes }`.
fn image_to_js(image: &ExtractedImage) -> Result<JsValue, JsValue> {
    let object = Object::new();
    let last_modified = image
        .last_modified
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    Reflect::set(&object, &"name".into(), &image.name.as_str().into())?;
    Reflect::set(&object, &"type".into(), &image.media_type.as_str().into())?;
    Reflect::set(&object, &"lastModified".into(), &last_modified.into())?;
    Reflect::set(&object, &"bytes".into(), &Uint8Array::from(image.bytes()).into())?;
    Ok(object.into())
}

/// Turn the element with id `target_id` into a drop target backed by the
/// file input `input_id`.
///
/// `on_files` is called with an array of `{ name, type, lastModified, bytes }`
/// objects each time an intake finds images.
#[wasm_bindgen]
pub fn mount(target_id: &str, input_id: &str, on_files: Function) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let target = document
        .get_element_by_id(target_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", target_id)))?;
    let input: HtmlInputElement = document
        .get_element_by_id(input_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", input_id)))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("'{}' is not an input element", input_id)))?;

    let config = IntakeConfig::load_from_local_storage().unwrap_or_default();
    let dropzone = Dropzone::<WebDir>::new(&config, move |images| {
        let array = Array::new();
        for image in &images {
            match image_to_js(image) {
                Ok(value) => {
                    array.push(&value);
                }
                Err(e) => log::error!("Failed to convert '{}': {:?}", image.name, e),
            }
        }
        if let Err(e) = on_files.call1(&JsValue::NULL, &array) {
            log::error!("File callback failed: {:?}", e);
        }
    });

    install(&target, &input, Rc::new(dropzone))
}
