//! Скачивание сгенерированных файлов через браузер
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

pub const PDF_MIME: &str = "application/pdf";

/// Отдаёт байты PDF браузеру как файл `filename`
pub fn download_pdf(bytes: &[u8], filename: &str) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("PDF document is empty".to_string());
    }
    let blob = create_blob(bytes, PDF_MIME)?;
    download_blob(&blob, filename)
}

/// Создает Blob из бинарных данных
fn create_blob(bytes: &[u8], mime: &str) -> Result<Blob, String> {
    let data = js_sys::Uint8Array::from(bytes);
    let array = js_sys::Array::new();
    array.push(&data.buffer());

    let properties = BlobPropertyBag::new();
    properties.set_type(mime);

    Blob::new_with_u8_array_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))
}

/// Инициирует скачивание Blob через браузер
fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    // Временная ссылка для скачивания
    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    let body = document.body().ok_or("No body element")?;
    body.append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;

    anchor.click();

    body.remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}
