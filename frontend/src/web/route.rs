//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及守卫规则。

use crate::auth::AuthPhase;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    /// `/`，总是转到控制面板
    Root,
    Login,
    Register,
    Dashboard,
    Cars,
    Park,
    ActiveSessions,
    NotFound,
}

/// 守卫的裁决结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// 认证状态未确定，显示占位内容
    Pending,
    Render(AppRoute),
    Redirect(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/" => Self::Root,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/cars" => Self::Cars,
            "/park" => Self::Park,
            "/active" => Self::ActiveSessions,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Cars => "/cars",
            Self::Park => "/park",
            Self::ActiveSessions => "/active",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Dashboard | Self::Cars | Self::Park | Self::ActiveSessions
        )
    }

    /// 已认证用户是否应该离开此路由（登录、注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 认证成功时的重定向目标
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 根据认证阶段裁决目标路由
    pub fn resolve(self, phase: AuthPhase) -> RouteDecision {
        if self == Self::Root {
            return RouteDecision::Redirect(Self::Dashboard);
        }

        if self.requires_auth() {
            return match phase {
                AuthPhase::Loading => RouteDecision::Pending,
                AuthPhase::Anonymous => RouteDecision::Redirect(Self::auth_failure_redirect()),
                AuthPhase::Authenticated => RouteDecision::Render(self),
            };
        }

        if self.should_redirect_when_authenticated() && phase == AuthPhase::Authenticated {
            return RouteDecision::Redirect(Self::auth_success_redirect());
        }

        RouteDecision::Render(self)
    }

    /// 沿重定向链裁决到最终结果
    ///
    /// 返回 `Redirect(x)` 时 `x` 是最终落地的路由。
    pub fn settle(self, phase: AuthPhase) -> RouteDecision {
        const MAX_HOPS: usize = 4;

        let mut route = self;
        for _ in 0..MAX_HOPS {
            match route.resolve(phase) {
                RouteDecision::Redirect(next) => route = next,
                RouteDecision::Pending if route == self => return RouteDecision::Pending,
                RouteDecision::Render(r) if r == self => return RouteDecision::Render(self),
                _ => return RouteDecision::Redirect(route),
            }
        }
        RouteDecision::Redirect(route)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTECTED: [AppRoute; 4] = [
        AppRoute::Dashboard,
        AppRoute::Cars,
        AppRoute::Park,
        AppRoute::ActiveSessions,
    ];

    #[test]
    fn test_path_round_trip() {
        for route in PROTECTED
            .into_iter()
            .chain([AppRoute::Login, AppRoute::Register, AppRoute::Root])
        {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/cars/"), AppRoute::Cars);
        assert_eq!(AppRoute::from_path("/park?floor=2"), AppRoute::Park);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path(""), AppRoute::Root);
    }

    #[test]
    fn test_protected_routes_wait_while_loading() {
        for route in PROTECTED {
            assert_eq!(route.resolve(AuthPhase::Loading), RouteDecision::Pending);
        }
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        for route in PROTECTED {
            assert_eq!(
                route.resolve(AuthPhase::Anonymous),
                RouteDecision::Redirect(AppRoute::Login)
            );
        }
        assert_eq!(
            AppRoute::Login.resolve(AuthPhase::Anonymous),
            RouteDecision::Render(AppRoute::Login)
        );
        assert_eq!(
            AppRoute::Register.resolve(AuthPhase::Anonymous),
            RouteDecision::Render(AppRoute::Register)
        );
    }

    #[test]
    fn test_authenticated_user_leaves_login_and_register() {
        for route in [AppRoute::Login, AppRoute::Register] {
            assert_eq!(
                route.resolve(AuthPhase::Authenticated),
                RouteDecision::Redirect(AppRoute::Dashboard)
            );
        }
        for route in PROTECTED {
            assert_eq!(
                route.resolve(AuthPhase::Authenticated),
                RouteDecision::Render(route)
            );
        }
    }

    #[test]
    fn test_root_settles_through_dashboard() {
        assert_eq!(
            AppRoute::Root.settle(AuthPhase::Anonymous),
            RouteDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(
            AppRoute::Root.settle(AuthPhase::Authenticated),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            AppRoute::Root.settle(AuthPhase::Loading),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            AppRoute::Cars.settle(AuthPhase::Authenticated),
            RouteDecision::Render(AppRoute::Cars)
        );
        assert_eq!(
            AppRoute::NotFound.settle(AuthPhase::Anonymous),
            RouteDecision::Render(AppRoute::NotFound)
        );
    }
}
