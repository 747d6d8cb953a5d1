use crate::browser::Page;
use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use leptos::prelude::*;

#[component]
pub fn NavBar(#[prop(into)] on_logout: Callback<()>) -> impl IntoView {
    view! {
        <nav class="border-b bg-background">
            <div class="mx-auto flex h-12 max-w-5xl items-center gap-4 px-4">
                <a href=Page::Dashboard.path() class="text-sm font-semibold text-foreground">"StudyHub"</a>
                <a href=Page::Dashboard.path() class="text-sm text-muted-foreground hover:text-foreground">"My Notes"</a>
                <a href=Page::Profile.path() class="text-sm text-muted-foreground hover:text-foreground">"Profile"</a>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    class="ml-auto"
                    on:click=move |_| on_logout.run(())
                >
                    "Logout"
                </Button>
            </div>
        </nav>
    }
}
