use crate::domain::a002_sale::ui::details::SaleDetails;
use leptos::prelude::*;
use std::collections::HashMap;
use std::rc::Rc;

/// Разбор `?id=...` из строки запроса
fn sale_id_from_query(search: &str) -> Option<String> {
    let params: HashMap<String, String> =
        serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default();
    params.get("id").filter(|id| !id.is_empty()).cloned()
}

fn replace_url_with_id(id: &str) {
    let query_string = serde_qs::to_string(&HashMap::from([("id".to_string(), id.to_string())]))
        .unwrap_or_default();
    let new_url = format!("?{}", query_string);
    if let Some(w) = web_sys::window() {
        if let Ok(history) = w.history() {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&new_url));
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let id = sale_id_from_query(&search);

    let on_saved: Rc<dyn Fn(String)> = Rc::new(|id: String| replace_url_with_id(&id));

    view! {
        <SaleDetails id=id on_saved=on_saved />
    }
}
