//! 停车场前端应用
//!
//! 采用 Context-Driven 架构：
//! - `api`: 类型化 HTTP 客户端，每次请求附带 Bearer Token
//! - `auth`: 会话状态 `Loading -> Authenticated | Anonymous`
//! - `web::route`: 路由定义与守卫裁决（纯函数）
//! - `web::router`: 路由服务，监听认证状态自动重定向
//! - `components`: 页面与导航栏

mod api;
mod auth;
mod components {
    pub mod active_sessions;
    mod banner;
    pub mod dashboard;
    pub mod login;
    pub mod my_cars;
    pub mod navigation;
    pub mod park_car;
    pub mod register;
    mod resync;
}
mod config;
mod error;
pub mod logging;

use crate::api::browser_api;
use crate::auth::{AuthContext, init_auth};
use crate::components::active_sessions::ActiveSessionsPage;
use crate::components::dashboard::DashboardPage;
use crate::components::login::LoginPage;
use crate::components::my_cars::MyCarsPage;
use crate::components::navigation::Navigation;
use crate::components::park_car::ParkCarPage;
use crate::components::register::RegisterPage;
use crate::config::AppConfig;

use leptos::prelude::*;

// 原生 Web API 封装模块
// 直接基于 web-sys，不引入 gloo-* 系列 crate。
pub(crate) mod web {
    mod dialog;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use dialog::confirm;
    pub use http::FetchClient;
    pub use storage::{LocalStorage, LocalStorageTokens};
}

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。`Root` 总会被守卫重定向，不会到达这里。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Cars => view! { <MyCarsPage /> }.into_any(),
        AppRoute::Park => view! { <ParkCarPage /> }.into_any(),
        AppRoute::ActiveSessions => view! { <ActiveSessionsPage /> }.into_any(),
        AppRoute::Root | AppRoute::NotFound => view! {
            <div class="container">
                <div class="card">
                    <h1>"404"</h1>
                    <p>"Page not found"</p>
                    <Link to="/dashboard" class="btn btn-primary">"Back to Dashboard"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与 API 客户端
    let config = AppConfig::from_build_env();
    let api = browser_api(&config);
    tracing::info!(api_base = %config.api_base, "starting parking garage client");
    provide_context(config);
    provide_context(api.clone());

    // 2. 认证上下文，从 LocalStorage 恢复会话
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);
    init_auth(auth_ctx, api);

    // 3. 认证阶段信号注入路由服务
    let phase = auth_ctx.phase_signal();
    let signed_in = move || auth_ctx.user().is_some();

    view! {
        <Router phase=phase>
            <Show when=signed_in>
                <Navigation />
            </Show>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
