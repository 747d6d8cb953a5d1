use crate::models::UploadFile;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileReader, HtmlInputElement};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum FileReadError {
    #[error("could not read {name}: {detail}")]
    Read { name: String, detail: String },
}

impl FileReadError {
    fn read(file: &File, err: JsValue) -> Self {
        Self::Read {
            name: file.name(),
            detail: format!("{err:?}"),
        }
    }
}

/// First file picked in a file input, if any.
pub(crate) fn selected_file(input: &HtmlInputElement) -> Option<File> {
    input.files().and_then(|list| list.get(0))
}

pub(crate) async fn read_upload_file(file: &File) -> Result<UploadFile, FileReadError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| FileReadError::read(file, e))?;

    Ok(UploadFile {
        name: file.name(),
        mime: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

/// Reads `file` into a `data:` URL for an `<img>` preview.
pub(crate) async fn read_data_url(file: &File) -> Result<String, FileReadError> {
    let reader = FileReader::new().map_err(|e| FileReadError::read(file, e))?;

    let pending = js_sys::Promise::new(&mut |resolve, reject| {
        let done = reader.clone();
        let onload = Closure::once_into_js(move || {
            let result = done.result().unwrap_or(JsValue::NULL);
            let _ = resolve.call1(&JsValue::NULL, &result);
        });
        let failed = reject.clone();
        let onerror = Closure::once_into_js(move || {
            let _ = failed.call1(&JsValue::NULL, &JsValue::from_str("FileReader error"));
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        reader.set_onerror(Some(onerror.unchecked_ref()));

        if let Err(e) = reader.read_as_data_url(file) {
            let _ = reject.call1(&JsValue::NULL, &e);
        }
    });

    let value = JsFuture::from(pending)
        .await
        .map_err(|e| FileReadError::read(file, e))?;

    value.as_string().ok_or_else(|| FileReadError::Read {
        name: file.name(),
        detail: "result is not a string".to_string(),
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn text_file(name: &str, body: &str) -> File {
        let parts = js_sys::Array::of1(&JsValue::from_str(body));
        let opts = web_sys::FilePropertyBag::new();
        opts.set_type("text/plain");
        File::new_with_str_sequence_and_options(&parts, name, &opts).expect("file")
    }

    #[wasm_bindgen_test]
    async fn test_read_upload_file_bytes() {
        let file = text_file("a.txt", "hi");

        let upload = read_upload_file(&file).await.expect("readable");

        assert_eq!(upload.name, "a.txt");
        assert_eq!(upload.mime, "text/plain");
        assert_eq!(upload.bytes, b"hi".to_vec());
    }

    #[wasm_bindgen_test]
    async fn test_read_data_url() {
        let file = text_file("a.txt", "hi");

        let url = read_data_url(&file).await.expect("readable");

        assert_eq!(url, "data:text/plain;base64,aGk=");
    }
}
