//! API 客户端
//!
//! 所有对外 HTTP 请求的唯一出口。每次请求都会重新读取 Token 存储，
//! 存在 Token 时附加 `Authorization: Bearer <token>`。
//! 不做重试、缓存或超时覆盖，结果直接交给调用方。

use crate::config::AppConfig;
use crate::error::{ApiError, TransportError};
use crate::web::{FetchClient, LocalStorageTokens};
use async_trait::async_trait;
use garage_shared::protocol::{
    ActiveSessionsRequest, ApiRequest, AvailableSpotsRequest, CurrentUserRequest,
    DeleteCarRequest, HttpMethod, LeaveSpotRequest, ListCarsRequest, ParkRequest,
};
use garage_shared::{
    AuthResponse, Car, CarId, ErrorBody, Floor, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE,
    LoginRequest, NewCar, ParkingSession, ParkingSpot, RegisterRequest, SessionId, User,
};
use leptos::prelude::use_context;
use std::collections::HashMap;
use std::sync::Arc;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Bearer Token 的持久化位置
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn store(&self, token: &str);
    fn clear(&self);
}

// =========================================================
// GarageApi
// =========================================================

pub struct GarageApi<C> {
    base_url: String,
    client: Arc<C>,
    tokens: Arc<dyn TokenStore>,
}

impl<C> Clone for GarageApi<C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: Arc::clone(&self.client),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<C: HttpClient> GarageApi<C> {
    pub fn new(base_url: impl Into<String>, client: C, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Arc::new(client),
            tokens,
        }
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    /// 当前存储的 Token，空字符串视为没有 Token
    pub fn bearer_token(&self) -> Option<String> {
        self.tokens.token().filter(|t| !t.is_empty())
    }

    fn url<R: ApiRequest>(&self, req: &R) -> String {
        let mut url = format!("{}{}", self.base_url, req.path());
        if let Some(query) = req.query() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// 发送一个类型化请求
    pub async fn send<R: ApiRequest>(&self, req: &R) -> Result<R::Response, ApiError> {
        let url = self.url(req);
        let mut http = HttpRequest::new(&url, R::METHOD);

        // 每次请求都重新读取存储，支持 Token 轮换
        if let Some(token) = self.bearer_token() {
            http = http.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        if R::HAS_BODY {
            let body = serde_json::to_string(req).map_err(|e| ApiError::Encode(e.to_string()))?;
            http = http
                .with_header(HEADER_CONTENT_TYPE, "application/json")
                .with_body(body);
        }

        tracing::debug!(method = R::METHOD.as_str(), %url, "api request");

        let res = self.client.send(http).await.map_err(|e| {
            tracing::warn!(method = R::METHOD.as_str(), %url, error = %e, "api transport failure");
            ApiError::from(e)
        })?;

        if !res.ok() {
            let body = serde_json::from_str::<ErrorBody>(&res.body).unwrap_or_default();
            tracing::warn!(
                method = R::METHOD.as_str(),
                %url,
                status = res.status,
                error = ?body.error,
                "api request rejected"
            );
            return Err(ApiError::Server {
                status: res.status,
                body,
            });
        }

        // 204 / 空响应体按 null 解析，对应 `()`
        let text = if res.body.trim().is_empty() {
            "null"
        } else {
            res.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| {
            tracing::warn!(%url, error = %e, "api response decode failure");
            ApiError::Decode(e.to_string())
        })
    }

    // --- Auth ---

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.send(req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send(req).await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.send(&CurrentUserRequest).await
    }

    // --- Cars ---

    pub async fn list_cars(&self) -> Result<Vec<Car>, ApiError> {
        self.send(&ListCarsRequest).await
    }

    pub async fn add_car(&self, car: &NewCar) -> Result<Car, ApiError> {
        self.send(car).await
    }

    pub async fn delete_car(&self, id: CarId) -> Result<(), ApiError> {
        self.send(&DeleteCarRequest { id }).await
    }

    // --- Spots & Parking ---

    pub async fn available_spots(&self, floor: Option<Floor>) -> Result<Vec<ParkingSpot>, ApiError> {
        self.send(&AvailableSpotsRequest { floor }).await
    }

    pub async fn park(&self, req: &ParkRequest) -> Result<ParkingSession, ApiError> {
        self.send(req).await
    }

    pub async fn active_sessions(&self) -> Result<Vec<ParkingSession>, ApiError> {
        self.send(&ActiveSessionsRequest).await
    }

    pub async fn leave_spot(&self, session_id: SessionId) -> Result<(), ApiError> {
        self.send(&LeaveSpotRequest { session_id }).await
    }
}

// =========================================================
// 浏览器装配 (Browser Wiring)
// =========================================================

/// 浏览器中使用的客户端：fetch 传输 + LocalStorage Token
pub type BrowserApi = GarageApi<FetchClient>;

pub fn browser_api(config: &AppConfig) -> BrowserApi {
    GarageApi::new(config.api_base.clone(), FetchClient, Arc::new(LocalStorageTokens))
}

/// 从 Context 获取 API 客户端
pub fn use_api() -> BrowserApi {
    use_context::<BrowserApi>().expect("GarageApi should be provided")
}

// =========================================================
// 测试工具: MockHttpClient / MemoryTokens
// =========================================================
