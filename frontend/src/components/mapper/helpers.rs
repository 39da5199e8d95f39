//! Utility functions for the CSV mapper component.
//!
//! - **User Feedback**: temporary "toast" notifications for upload results.
//! - **Formatting**: file sizes and row counts shown next to the picked file.
//! - **Selector values**: conversion between `<select>` values and canonical fields.

use common::model::field::CanonicalField;
use num_format::{Locale, ToFormattedString};
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Displays a temporary notification message at the bottom of the screen.
///
/// The toast removes itself after three seconds.
pub fn show_toast(message: &str) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let (Ok(toast), Some(body)) = (document.create_element("div"), document.body()) {
                toast.set_text_content(Some(message));
                let html_toast: HtmlElement = toast.unchecked_into();
                let style = html_toast.style();
                style.set_property("position", "fixed").ok();
                style.set_property("bottom", "20px").ok();
                style.set_property("left", "50%").ok();
                style.set_property("transform", "translateX(-50%)").ok();
                style.set_property("background", "rgba(0, 0, 0, 0.8)").ok();
                style.set_property("color", "#fff").ok();
                style.set_property("padding", "10px 20px").ok();
                style.set_property("border-radius", "4px").ok();
                style.set_property("z-index", "10000").ok();
                style.set_property("font-family", "Arial, sans-serif").ok();

                if body.append_child(&html_toast).is_ok() {
                    wasm_bindgen_futures::spawn_local(async move {
                        gloo_timers::future::TimeoutFuture::new(3000).await;
                        if let Some(parent) = html_toast.parent_node() {
                            parent.remove_child(&html_toast).ok();
                        }
                    });
                }
            }
        }
    }
}

/// `"12.34 KB"` for a size in bytes.
pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// `"1,204 rows"`, singular for one.
pub fn format_row_count(rows: usize) -> String {
    let unit = if rows == 1 { "row" } else { "rows" };
    format!("{} {}", rows.to_formatted_string(&Locale::en), unit)
}

/// The `<select>` value for a mapping entry; the empty string is the "Select field" sentinel.
pub fn selector_value(field: Option<CanonicalField>) -> &'static str {
    field.map(|f| f.as_str()).unwrap_or("")
}

/// Inverse of `selector_value`. Unknown values count as unset.
pub fn field_from_selector(value: &str) -> Option<CanonicalField> {
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_and_counts_are_formatted() {
        assert_eq!(format_size_kb(2048), "2.00 KB");
        assert_eq!(format_size_kb(1536), "1.50 KB");
        assert_eq!(format_row_count(1), "1 row");
        assert_eq!(format_row_count(12345), "12,345 rows");
    }

    #[test]
    fn selector_values_round_trip() {
        assert_eq!(selector_value(None), "");
        assert_eq!(field_from_selector(""), None);
        for field in CanonicalField::ALL {
            assert_eq!(field_from_selector(selector_value(Some(field))), Some(field));
        }
    }
}
