use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardFooter, CardHeader, CardTitle,
};
use crate::dashboard::NoteCard;
use leptos::prelude::*;

pub(crate) const EMPTY_MESSAGE: &str = "📄 No notes found. Upload your first one!";

/// Note cards in fetch order, rebuilt from scratch whenever `cards` changes.
/// All note text goes through text nodes.
#[component]
pub fn NoteGrid(
    #[prop(into)] cards: Signal<Vec<NoteCard>>,
    #[prop(into)] on_delete: Callback<String>,
) -> impl IntoView {
    view! {
        <div data-name="NoteGrid" class="grid grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-3">
            {move || {
                let cards = cards.get();
                if cards.is_empty() {
                    return view! {
                        <p class="col-span-full py-10 text-center text-sm text-muted-foreground">
                            {EMPTY_MESSAGE}
                        </p>
                    }
                    .into_any();
                }

                cards
                    .into_iter()
                    .map(|card| {
                        let id_for_delete = card.id.clone();
                        view! {
                            <Card class="gap-3 py-4" attr:data-note-id=card.id>
                                <CardHeader class="px-4">
                                    <CardTitle class="text-base">{card.title}</CardTitle>
                                </CardHeader>
                                <CardContent class="flex flex-col gap-1 px-4 text-sm">
                                    <p><span class="font-medium">"Subject: "</span>{card.subject}</p>
                                    <p><span class="font-medium">"Tags: "</span>{card.tags_label}</p>
                                </CardContent>
                                <CardFooter class="px-4">
                                    <a
                                        class="text-sm text-primary underline underline-offset-4"
                                        href=card.download_url
                                        target="_blank"
                                        rel="noopener"
                                    >
                                        "Download"
                                    </a>
                                    <Button
                                        variant=ButtonVariant::Destructive
                                        size=ButtonSize::Sm
                                        class="ml-auto"
                                        on:click=move |_| on_delete.run(id_for_delete.clone())
                                    >
                                        "Delete"
                                    </Button>
                                </CardFooter>
                            </Card>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}
