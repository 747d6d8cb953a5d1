use crate::components::ui::{Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Spinner};
use crate::feedback::{Severity, ToastFeedback};
use leptos::prelude::*;

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "border-green-600/40 bg-green-50 text-green-900",
        Severity::Warning => "border-amber-500/40 bg-amber-50 text-amber-900",
        Severity::Danger => "border-destructive/40 bg-red-50 text-destructive",
        Severity::Info => "border-sky-500/40 bg-sky-50 text-sky-900",
    }
}

/// Top-right stack of transient messages.
#[component]
pub fn ToastStack(feedback: ToastFeedback) -> impl IntoView {
    view! {
        <div class="pointer-events-none fixed right-4 top-4 z-50 flex w-80 flex-col gap-2" aria-live="polite">
            {move || {
                feedback
                    .toasts
                    .get()
                    .into_iter()
                    .map(|toast| {
                        let id = toast.id;
                        let severity: &'static str = toast.severity.into();
                        view! {
                            <Alert
                                class=format!("pointer-events-auto flex items-start gap-2 {}", severity_class(toast.severity))
                                attr:data-severity=severity
                                attr:role="alert"
                            >
                                <AlertDescription class="flex-1">{toast.message}</AlertDescription>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    class="size-5 text-xs"
                                    attr:aria-label="Close"
                                    on:click=move |_| feedback.dismiss(id)
                                >
                                    "✕"
                                </Button>
                            </Alert>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}

/// Full-screen overlay shown while any request is in flight.
#[component]
pub fn BusyOverlay(feedback: ToastFeedback) -> impl IntoView {
    view! {
        <Show when=move || feedback.is_busy() fallback=|| ().into_view()>
            <div class="fixed inset-0 z-40 flex items-center justify-center bg-background/60">
                <Spinner class="size-8 text-primary" />
            </div>
        </Show>
    }
}
