use crate::components::{BusyOverlay, ToastStack};
use crate::config::EnvConfig;
use crate::pages::{DashboardPage, LoginPage, ProfilePage, RegisterPage, RootPage};
use crate::state::{AppContext, WebServices};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App(config: EnvConfig) -> impl IntoView {
    let services = WebServices::from_config(&config);
    let feedback = services.feedback;
    provide_context(AppContext(services));

    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("register") view=RegisterPage />
                <Route path=path!("dashboard") view=DashboardPage />
                <Route path=path!("profile") view=ProfilePage />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
        <ToastStack feedback=feedback />
        <BusyOverlay feedback=feedback />
    }
}
