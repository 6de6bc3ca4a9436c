//! Conversion of engine outputs into JavaScript values.
//!
//! A [`CropResult`] becomes a plain object
//! `{ width, height, base64?, blob?, file? }` where `blob` is a DOM `Blob`
//! and `file` a DOM `File`. Errors become the tagged objects produced by
//! `CropUploadError`'s serde representation.

use imagecrop_core::{Blob, CropResult, CropUploadError, NamedFile};
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub(crate) fn crop_result_to_js(result: &CropResult) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    set(&obj, "width", &JsValue::from(result.width))?;
    set(&obj, "height", &JsValue::from(result.height))?;

    if let Some(base64) = &result.base64 {
        set(&obj, "base64", &JsValue::from_str(base64))?;
    }
    if let Some(blob) = &result.blob {
        set(&obj, "blob", &to_js_blob(blob)?)?;
    }
    if let Some(file) = &result.file {
        set(&obj, "file", &to_js_file(file)?)?;
    }
    Ok(obj.into())
}

pub(crate) fn error_to_js(err: &CropUploadError) -> JsValue {
    serde_wasm_bindgen::to_value(err).unwrap_or_else(|_| JsValue::from_str(&err.to_string()))
}

fn set(obj: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(obj, &JsValue::from_str(key), value).map(|_| ())
}

fn blob_parts(bytes: &[u8]) -> Array {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    parts
}

fn to_js_blob(blob: &Blob) -> Result<JsValue, JsValue> {
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(&blob.mime_type);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts(&blob.bytes), &options)
        .map(JsValue::from)
}

fn to_js_file(file: &NamedFile) -> Result<JsValue, JsValue> {
    let options = web_sys::FilePropertyBag::new();
    options.set_type(&file.blob.mime_type);
    web_sys::File::new_with_u8_array_sequence_and_options(
        &blob_parts(&file.blob.bytes),
        &file.name,
        &options,
    )
    .map(JsValue::from)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn get(value: &JsValue, key: &str) -> JsValue {
        Reflect::get(value, &JsValue::from_str(key)).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_base64_only_result() {
        let mut result = CropResult::new(10, 20);
        result.base64 = Some("data:image/png;base64,AAAA".to_string());

        let js = crop_result_to_js(&result).unwrap();
        assert_eq!(get(&js, "width").as_f64(), Some(10.0));
        assert_eq!(get(&js, "height").as_f64(), Some(20.0));
        assert_eq!(
            get(&js, "base64").as_string().as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert!(get(&js, "blob").is_undefined());
        assert!(get(&js, "file").is_undefined());
    }

    #[wasm_bindgen_test]
    fn test_blob_and_file() {
        let blob = Blob::new(vec![1, 2, 3], "image/png");
        let mut result = CropResult::new(1, 1);
        result.file = Some(NamedFile::new("avatar.png", blob.clone()));
        result.blob = Some(blob);

        let js = crop_result_to_js(&result).unwrap();
        let js_blob: web_sys::Blob = get(&js, "blob").dyn_into().unwrap();
        assert_eq!(js_blob.size(), 3.0);
        assert_eq!(js_blob.type_(), "image/png");

        let js_file: web_sys::File = get(&js, "file").dyn_into().unwrap();
        assert_eq!(js_file.name(), "avatar.png");
    }

    #[wasm_bindgen_test]
    fn test_error_to_js() {
        let js = error_to_js(&CropUploadError::canvas("Failed to convert canvas to blob"));
        assert_eq!(get(&js, "type").as_string().as_deref(), Some("CANVAS_ERROR"));
        assert_eq!(
            get(&js, "message").as_string().as_deref(),
            Some("Failed to convert canvas to blob")
        );
    }
}
