//! 认证模块
//!
//! 会话状态是一个显式的值：`Loading -> Authenticated | Anonymous`。
//! 状态迁移由注入的 [`GarageApi`] 计算，与 Leptos 无关，便于单独测试；
//! [`AuthContext`] 只负责把结果放进信号，供路由和导航栏读取。

use crate::api::{BrowserApi, GarageApi, HttpClient, TokenStore};
use crate::error::ApiError;
use garage_shared::{AuthResponse, LoginRequest, RegisterRequest, User};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 会话状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// 初始状态，正在检查已保存的 Token
    #[default]
    Loading,
    Authenticated(User),
    Anonymous,
}

/// 路由守卫只关心的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Loading,
    Authenticated,
    Anonymous,
}

impl SessionState {
    pub fn phase(&self) -> AuthPhase {
        match self {
            SessionState::Loading => AuthPhase::Loading,
            SessionState::Authenticated(_) => AuthPhase::Authenticated,
            SessionState::Anonymous => AuthPhase::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

// =========================================================
// 状态迁移 (Transitions)
// =========================================================

/// 启动时恢复会话
///
/// 没有 Token 直接进入 `Anonymous`；有 Token 则请求当前用户，
/// 失败时清除 Token。
pub async fn resume_session<C: HttpClient>(api: &GarageApi<C>) -> SessionState {
    if api.bearer_token().is_none() {
        return SessionState::Anonymous;
    }

    match api.current_user().await {
        Ok(user) => {
            tracing::info!(user = %user.first_name, "session restored");
            SessionState::Authenticated(user)
        }
        Err(e) => {
            tracing::info!(error = %e, status = ?e.status(), "stored token rejected, clearing");
            api.tokens().clear();
            SessionState::Anonymous
        }
    }
}

fn accept(tokens: &dyn TokenStore, res: AuthResponse) -> SessionState {
    tokens.store(&res.token);
    SessionState::Authenticated(res.user)
}

pub async fn sign_in<C: HttpClient>(
    api: &GarageApi<C>,
    req: &LoginRequest,
) -> Result<SessionState, ApiError> {
    let res = api.login(req).await?;
    tracing::info!(user = %res.user.first_name, "logged in");
    Ok(accept(api.tokens(), res))
}

pub async fn sign_up<C: HttpClient>(
    api: &GarageApi<C>,
    req: &RegisterRequest,
) -> Result<SessionState, ApiError> {
    let res = api.register(req).await?;
    tracing::info!(user = %res.user.first_name, "registered");
    Ok(accept(api.tokens(), res))
}

/// 同步清除 Token
pub fn sign_out<C: HttpClient>(api: &GarageApi<C>) -> SessionState {
    api.tokens().clear();
    tracing::info!("logged out");
    SessionState::Anonymous
}

// =========================================================
// 认证上下文 (Reactive Context)
// =========================================================

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: ReadSignal<SessionState>,
    pub set_state: WriteSignal<SessionState>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (state, set_state) = signal(SessionState::default());
        Self { state, set_state }
    }

    /// 获取认证阶段信号（用于路由服务注入）
    ///
    /// 使用 Memo，用户信息变化但阶段不变时不会触发路由重新裁决。
    pub fn phase_signal(&self) -> Signal<AuthPhase> {
        let state = self.state;
        Memo::new(move |_| state.with(SessionState::phase)).into()
    }

    /// 当前用户（响应式读取）
    pub fn user(&self) -> Option<User> {
        self.state.with(|s| s.user().cloned())
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
pub fn init_auth(ctx: AuthContext, api: BrowserApi) {
    spawn_local(async move {
        let state = resume_session(&api).await;
        ctx.set_state.set(state);
    });
}

/// 登录并更新上下文
///
/// 页面跳转由路由服务监听认证状态自动完成。
pub async fn login(ctx: AuthContext, api: &BrowserApi, req: LoginRequest) -> Result<(), ApiError> {
    let state = sign_in(api, &req).await?;
    ctx.set_state.set(state);
    Ok(())
}

pub async fn register(
    ctx: AuthContext,
    api: &BrowserApi,
    req: RegisterRequest,
) -> Result<(), ApiError> {
    let state = sign_up(api, &req).await?;
    ctx.set_state.set(state);
    Ok(())
}

/// 注销并清除状态
pub fn logout(ctx: AuthContext, api: &BrowserApi) {
    ctx.set_state.set(sign_out(api));
}
