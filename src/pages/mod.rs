use crate::auth::{AuthFlow, FormPhase, LoginForm, RegisterForm};
use crate::browser::Page;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    FileInput, Input, Label, Spinner,
};
use crate::components::{NavBar, NoteGrid};
use crate::dashboard::{Dashboard, MutationOutcome, UploadDraft};
use crate::feedback::{Feedback, Severity};
use crate::profile::ProfileView;
use crate::state::AppContext;
use crate::util::{read_data_url, read_upload_file, selected_file};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::Redirect;

/// Centered card used by the login and registration forms.
#[component]
fn AuthCard(
    #[prop(into)] title: String,
    #[prop(into)] description: String,
    children: Children,
) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <span class="text-sm font-medium text-foreground">"StudyHub"</span>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">{title}</CardTitle>
                        <CardDescription class="text-xs">{description}</CardDescription>
                    </CardHeader>
                    <CardContent>{children()}</CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
fn SubmitButton(
    phase: RwSignal<FormPhase>,
    #[prop(into)] idle_label: String,
    #[prop(into)] busy_label: String,
) -> impl IntoView {
    let busy = move || phase.get() != FormPhase::Idle;

    view! {
        <Button class="w-full" size=ButtonSize::Sm attr:disabled=busy>
            <span class="inline-flex items-center gap-2">
                <Show when=busy fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                {move || if busy() { busy_label.clone() } else { idle_label.clone() }}
            </span>
        </Button>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let phase: RwSignal<FormPhase> = RwSignal::new(FormPhase::Idle);

    let app = expect_context::<AppContext>();
    let flow = StoredValue::new(AuthFlow::new(app.0.clone()));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let form = LoginForm {
            email: email.get_untracked(),
            password: password.get_untracked(),
        };
        let flow = flow.get_value();
        if flow.phase() == FormPhase::Idle {
            phase.set(FormPhase::Submitting);
        }

        spawn_local(async move {
            phase.set(flow.submit_login(form).await);
        });
    };

    view! {
        <AuthCard title="Log in" description="Use your email and password to continue.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="email" class="text-xs">"Email"</Label>
                    <Input id="email" name="email" r#type="email" placeholder="you@example.com" bind_value=email class="h-8 text-sm" />
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label html_for="password" class="text-xs">"Password"</Label>
                    <Input id="password" name="password" r#type="password" placeholder="••••••••" bind_value=password class="h-8 text-sm" />
                </div>

                <SubmitButton phase=phase idle_label="Continue" busy_label="Signing in..." />

                <div class="pt-1 text-xs text-muted-foreground">
                    "No account? "
                    <a class="text-primary underline underline-offset-4" href=Page::Register.path()>"Sign up"</a>
                </div>
            </form>
        </AuthCard>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let username: RwSignal<String> = RwSignal::new(String::new());
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let phase: RwSignal<FormPhase> = RwSignal::new(FormPhase::Idle);

    let app = expect_context::<AppContext>();
    let flow = StoredValue::new(AuthFlow::new(app.0.clone()));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let form = RegisterForm {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
        };
        let flow = flow.get_value();
        if flow.phase() == FormPhase::Idle {
            phase.set(FormPhase::Submitting);
        }

        spawn_local(async move {
            phase.set(flow.submit_register(form).await);
        });
    };

    view! {
        <AuthCard title="Create account" description="Pick a username and sign up with your email.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="username" class="text-xs">"Username"</Label>
                    <Input id="username" name="username" placeholder="your name" bind_value=username class="h-8 text-sm" />
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label html_for="email" class="text-xs">"Email"</Label>
                    <Input id="email" name="email" r#type="email" placeholder="you@example.com" bind_value=email class="h-8 text-sm" />
                </div>

                <div class="flex flex-col gap-1.5">
                    <Label html_for="password" class="text-xs">"Password"</Label>
                    <Input id="password" name="password" r#type="password" placeholder="••••••••" bind_value=password class="h-8 text-sm" />
                </div>

                <SubmitButton phase=phase idle_label="Create account" busy_label="Creating account..." />

                <div class="pt-1 text-xs text-muted-foreground">
                    "Already registered? "
                    <a class="text-primary underline underline-offset-4" href=Page::Login.path()>"Log in"</a>
                </div>
            </form>
        </AuthCard>
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let app = expect_context::<AppContext>();
    let feedback = app.0.feedback;
    let dashboard = StoredValue::new(Dashboard::new(app.0.clone()));

    // Bumped whenever the note library may have changed.
    let revision: RwSignal<u64> = RwSignal::new(0);
    let bump = move || revision.update(|r| *r = r.wrapping_add(1));

    let query: RwSignal<String> = RwSignal::new(String::new());
    let title: RwSignal<String> = RwSignal::new(String::new());
    let subject: RwSignal<String> = RwSignal::new(String::new());
    let tags: RwSignal<String> = RwSignal::new(String::new());
    let file_ref: NodeRef<html::Input> = NodeRef::new();

    let cards = Signal::derive(move || {
        revision.track();
        let q = query.get();
        dashboard.with_value(|d| d.visible_cards(q.trim()))
    });

    let first_load = dashboard.get_value();
    spawn_local(async move {
        first_load.activate().await;
        bump();
    });

    let clear_form = move || {
        title.set(String::new());
        subject.set(String::new());
        tags.set(String::new());
        if let Some(input) = file_ref.get_untracked() {
            input.set_value("");
        }
    };

    let on_upload = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let input = file_ref.get_untracked();
        debug_assert!(input.is_some(), "upload file input not mounted");
        let Some(input) = input else {
            tracing::error!("upload file input not mounted");
            return;
        };

        let picked = selected_file(&input);
        let (title_val, subject_val, tags_val) =
            (title.get_untracked(), subject.get_untracked(), tags.get_untracked());
        let dashboard = dashboard.get_value();

        spawn_local(async move {
            let file = match picked {
                Some(f) => match read_upload_file(&f).await {
                    Ok(upload) => Some(upload),
                    Err(e) => {
                        tracing::error!(error = %e, "reading upload failed");
                        feedback.notify("Error uploading note", Severity::Danger);
                        return;
                    }
                },
                None => None,
            };

            let outcome = dashboard
                .upload(UploadDraft {
                    title: title_val,
                    subject: subject_val,
                    tags: tags_val,
                    file,
                })
                .await;
            if outcome == MutationOutcome::Done {
                clear_form();
            }
            bump();
        });
    };

    let on_delete = Callback::new(move |id: String| {
        let dashboard = dashboard.get_value();
        spawn_local(async move {
            dashboard.delete(&id).await;
            bump();
        });
    });

    let on_logout = Callback::new(move |_: ()| {
        dashboard.with_value(|d| d.logout());
        bump();
    });

    view! {
        <div class="min-h-screen bg-background">
            <NavBar on_logout=on_logout />

            <main class="mx-auto flex max-w-5xl flex-col gap-6 px-4 py-6">
                <Card class="py-4">
                    <CardHeader class="px-4">
                        <CardTitle class="text-base">"Upload a note"</CardTitle>
                    </CardHeader>
                    <CardContent class="px-4">
                        <form class="grid gap-3 sm:grid-cols-2" on:submit=on_upload>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="title" class="text-xs">"Title"</Label>
                                <Input id="title" name="title" bind_value=title class="h-8 text-sm" />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="subject" class="text-xs">"Subject"</Label>
                                <Input id="subject" name="subject" bind_value=subject class="h-8 text-sm" />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="tags" class="text-xs">"Tags"</Label>
                                <Input id="tags" name="tags" placeholder="exam, chapter 3" bind_value=tags class="h-8 text-sm" />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="file" class="text-xs">"File"</Label>
                                <FileInput id="file" name="file" node_ref=file_ref class="text-sm" />
                            </div>
                            <div class="flex gap-2 sm:col-span-2">
                                <Button size=ButtonSize::Sm attr:disabled=move || feedback.is_busy()>
                                    "Upload"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |ev: web_sys::MouseEvent| {
                                        ev.prevent_default();
                                        clear_form();
                                    }
                                >
                                    "Clear"
                                </Button>
                            </div>
                        </form>
                    </CardContent>
                </Card>

                <div class="flex flex-col gap-3">
                    <div class="flex items-center justify-between gap-3">
                        <h1 class="text-xl font-semibold">"My Notes"</h1>
                        <Input
                            id="search"
                            name="search"
                            r#type="search"
                            placeholder="Search by title, subject or tag"
                            bind_value=query
                            class="h-8 max-w-xs text-sm"
                        />
                    </div>
                    <NoteGrid cards=cards on_delete=on_delete />
                </div>
            </main>
        </div>
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let app = expect_context::<AppContext>();
    let profile = StoredValue::new(ProfileView::new(app.0.clone()));
    let summary = profile.with_value(|p| p.activate());

    let preview: RwSignal<Option<String>> = RwSignal::new(None);
    let photo_ref: NodeRef<html::Input> = NodeRef::new();

    let on_pick = Callback::new(move |_: web_sys::Event| {
        let Some(file) = photo_ref.get_untracked().and_then(|i| selected_file(&i)) else {
            preview.set(None);
            return;
        };
        spawn_local(async move {
            match read_data_url(&file).await {
                Ok(url) => preview.set(Some(url)),
                Err(e) => tracing::warn!(error = %e, "avatar preview failed"),
            }
        });
    });

    let on_save = move |_: web_sys::MouseEvent| {
        let input = photo_ref.get_untracked();
        debug_assert!(input.is_some(), "avatar input not mounted");
        let Some(input) = input else {
            tracing::error!("avatar input not mounted");
            return;
        };
        let has_file = selected_file(&input).is_some();
        let profile = profile.get_value();
        spawn_local(async move {
            profile.save_avatar(has_file).await;
        });
    };

    let on_logout = Callback::new(move |_: ()| profile.with_value(|p| p.logout()));

    let Some(summary) = summary else {
        return view! { <div class="min-h-screen bg-background"></div> }.into_any();
    };

    view! {
        <div class="min-h-screen bg-background">
            <NavBar on_logout=on_logout />

            <main class="mx-auto flex max-w-md flex-col gap-6 px-4 py-8">
                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">{summary.username}</CardTitle>
                        <CardDescription>{summary.email}</CardDescription>
                        <CardDescription class="text-xs">{summary.joined}</CardDescription>
                    </CardHeader>
                    <CardContent class="flex flex-col items-center gap-4">
                        <div class="flex size-28 items-center justify-center overflow-hidden rounded-full border bg-muted">
                            {move || match preview.get() {
                                Some(src) => view! { <img src=src alt="Avatar preview" class="size-full object-cover" /> }.into_any(),
                                None => view! { <span class="text-xs text-muted-foreground">"No photo"</span> }.into_any(),
                            }}
                        </div>
                        <FileInput id="avatar" name="avatar" accept="image/*" node_ref=photo_ref on_change=on_pick class="text-sm" />
                        <Button size=ButtonSize::Sm on:click=on_save>"Save avatar"</Button>
                    </CardContent>
                </Card>
            </main>
        </div>
    }
    .into_any()
}

/// `/` forwards to the dashboard with a session, otherwise to login.
#[component]
pub fn RootPage() -> impl IntoView {
    let app = expect_context::<AppContext>();
    let target = if app.0.session.load().is_valid() {
        Page::Dashboard
    } else {
        Page::Login
    };

    view! { <Redirect path=target.path() /> }
}
