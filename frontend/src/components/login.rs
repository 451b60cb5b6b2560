use super::banner::{BannerView, Banners};
use crate::api::use_api;
use crate::auth::{login, use_auth};
use crate::error::{ApiError, MessageField};
use crate::web::router::Link;
use garage_shared::LoginRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

pub(crate) const FILL_ALL_FIELDS: &str = "Please fill in all fields";

/// 校验登录表单
pub fn login_request(email: &str, password: &str) -> Result<LoginRequest, ApiError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::precondition(FILL_ALL_FIELDS));
    }
    Ok(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let api = StoredValue::new(use_api());
    let banners = Banners::new();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        banners.clear();

        let req = match login_request(&email.get_untracked(), &password.get_untracked()) {
            Ok(req) => req,
            Err(e) => {
                banners.fail(e.user_message(MessageField::Error, FILL_ALL_FIELDS));
                return;
            }
        };

        set_is_submitting.set(true);
        let api = api.get_value();
        spawn_local(async move {
            // 成功后由路由监听认证状态跳转到 Dashboard
            if let Err(e) = login(auth, &api, req).await {
                tracing::warn!(error = %e, "login failed");
                banners.fail(e.user_message(MessageField::Error, "Login failed"));
            }
            let _ = set_is_submitting.try_set(false);
        });
    };

    view! {
        <div class="container">
            <div class="card auth-card">
                <h1>"Login"</h1>
                <BannerView banners=banners />
                <form on:submit=on_submit>
                    <div class="form-group">
                        <label for="email">"Email"</label>
                        <input
                            id="email"
                            type="email"
                            prop:value=email
                            on:input=move |ev| email.set(event_target_value(&ev))
                            required
                        />
                    </div>
                    <div class="form-group">
                        <label for="password">"Password"</label>
                        <input
                            id="password"
                            type="password"
                            prop:value=password
                            on:input=move |ev| password.set(event_target_value(&ev))
                            required
                        />
                    </div>
                    <button type="submit" class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() { "Logging in..." } else { "Login" }}
                    </button>
                </form>
                <p>
                    "Don't have an account? "
                    <Link to="/register">"Register here"</Link>
                </p>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_both_fields() {
        let err = login_request("  ", "secret").unwrap_err();
        assert_eq!(err, ApiError::precondition(FILL_ALL_FIELDS));
        assert!(login_request("jo@example.com", "").is_err());
    }

    #[test]
    fn test_login_request_trims_email() {
        let req = login_request(" jo@example.com ", "secret").unwrap();
        assert_eq!(req.email, "jo@example.com");
        assert_eq!(req.password, "secret");
    }
}
