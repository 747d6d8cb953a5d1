use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

const INPUT_BASE: &str = "file:text-foreground placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs transition-[color,box-shadow] outline-none file:inline-flex file:h-7 file:border-0 file:bg-transparent file:text-sm file:font-medium disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm";

#[component]
pub fn Input(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] name: String,
    #[prop(into, optional)] id: String,

    // Manual wiring instead of `bind:value`, which has moved between Leptos releases.
    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        INPUT_BASE,
        "focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2",
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            bind_value.set(input.value());
        }
    };

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            name=name
            id=id
            prop:value=move || bind_value.get()
            on:input=on_input
        />
    }
}

/// File picker; the page reads the selection through `node_ref`.
#[component]
pub fn FileInput(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] name: String,
    #[prop(into, optional)] id: String,
    #[prop(into, optional)] accept: String,
    node_ref: NodeRef<html::Input>,
    #[prop(optional, into)] on_change: Option<Callback<web_sys::Event>>,
) -> impl IntoView {
    let merged_class = tw_merge!(INPUT_BASE, "h-auto py-1.5", class);

    view! {
        <input
            data-name="FileInput"
            type="file"
            class=merged_class
            name=name
            id=id
            accept=accept
            node_ref=node_ref
            on:change=move |ev| {
                if let Some(cb) = on_change {
                    cb.run(ev);
                }
            }
        />
    }
}
