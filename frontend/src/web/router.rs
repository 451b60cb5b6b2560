//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, RouteDecision};
use crate::auth::AuthPhase;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History 状态
///
/// `use_push` 为 false 时替换当前记录（用于重定向）
fn write_history_state(path: &str, use_push: bool) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = if use_push {
        history.push_state_with_url(&JsValue::NULL, "", Some(path))
    } else {
        history.replace_state_with_url(&JsValue::NULL, "", Some(path))
    };
    if result.is_err() {
        tracing::warn!(path, "failed to update history state");
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证阶段信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    phase: Signal<AuthPhase>,
}

impl RouterService {
    fn new(phase: Signal<AuthPhase>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        let router = Self {
            current_route,
            set_route,
            phase,
        };
        // 规范化初始地址，如 `/` -> `/dashboard`
        router.navigate_to_route(initial_route, false);
        router
    }

    /// 当前路由在当前认证阶段下的裁决
    pub fn decision(&self) -> RouteDecision {
        self.current_route.get().resolve(self.phase.get())
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let phase = self.phase.get_untracked();

        let landed = match target.settle(phase) {
            RouteDecision::Redirect(redirect) => {
                tracing::info!(%target, %redirect, ?phase, "route guard redirect");
                redirect
            }
            RouteDecision::Render(_) | RouteDecision::Pending => target,
        };

        write_history_state(landed.to_path(), use_push);
        self.set_route.set(landed);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            // popstate 时也执行守卫逻辑，重定向只替换记录
            router.navigate_to_route(AppRoute::from_path(&current_path()), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证阶段变化时重新裁决当前路由
    ///
    /// 覆盖三种情况：启动检查结束、登录/注册成功、注销。
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let phase = router.phase.get();
            let route = router.current_route.get_untracked();

            if let RouteDecision::Redirect(redirect) = route.settle(phase) {
                tracing::info!(%route, %redirect, ?phase, "auth state changed, redirecting");
                write_history_state(redirect.to_path(), true);
                router.set_route.set(redirect);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(phase: Signal<AuthPhase>) -> RouterService {
    let router = RouterService::new(phase);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(&str) + Copy + Send + Sync + 'static {
    let router = use_router();
    move |to: &str| {
        router.navigate(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证阶段信号
    phase: Signal<AuthPhase>,
    children: Children,
) -> impl IntoView {
    provide_router(phase);

    children()
}

/// 路由出口组件
///
/// 只有守卫裁决为 `Render` 时才渲染页面，其余情况显示占位内容，
/// 重定向由认证监听完成。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    let decision = Memo::new(move |_| router.decision());

    move || match decision.get() {
        RouteDecision::Render(route) => matcher(route),
        RouteDecision::Pending | RouteDecision::Redirect(_) => view! {
            <div class="container">
                <p>"Loading..."</p>
            </div>
        }
        .into_any(),
    }
}

/// 站内链接，拦截点击改为 History 导航
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(into, optional)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
