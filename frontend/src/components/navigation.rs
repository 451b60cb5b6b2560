use crate::api::use_api;
use crate::auth::{logout, use_auth};
use crate::web::router::Link;
use garage_shared::User;
use leptos::prelude::*;

/// 导航栏中的问候语
pub fn greeting(user: &User) -> String {
    format!("Welcome, {}!", user.first_name)
}

/// 顶部导航栏
///
/// 只在用户已登录时挂载。
#[component]
pub fn Navigation() -> impl IntoView {
    let auth = use_auth();
    let api = StoredValue::new(use_api());

    let on_logout = move |_| {
        api.with_value(|api| logout(auth, api));
    };

    view! {
        <nav class="nav">
            <h1>"🚗 Parking Garage"</h1>
            <div class="nav-links">
                <Link to="/dashboard">"Dashboard"</Link>
                <Link to="/cars">"My Cars"</Link>
                <Link to="/park">"Park Car"</Link>
                <Link to="/active">"Active Sessions"</Link>
                <span>{move || auth.user().as_ref().map(greeting)}</span>
                <button class="btn btn-danger" on:click=on_logout>
                    "Logout"
                </button>
            </div>
        </nav>
    }
}
