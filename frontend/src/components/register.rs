use super::banner::{BannerView, Banners};
use super::login::FILL_ALL_FIELDS;
use crate::api::use_api;
use crate::auth::{register, use_auth};
use crate::error::{ApiError, MessageField};
use crate::web::router::Link;
use garage_shared::RegisterRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 注册表单状态
#[derive(Clone, Copy)]
struct RegisterForm {
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    email: RwSignal<String>,
    password: RwSignal<String>,
}

impl RegisterForm {
    fn new() -> Self {
        Self {
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            password: RwSignal::new(String::new()),
        }
    }

    fn to_request(&self) -> Result<RegisterRequest, ApiError> {
        register_request(RegisterRequest {
            first_name: self.first_name.get_untracked(),
            last_name: self.last_name.get_untracked(),
            email: self.email.get_untracked(),
            password: self.password.get_untracked(),
        })
    }
}

/// 去掉首尾空白并检查必填项
pub fn register_request(raw: RegisterRequest) -> Result<RegisterRequest, ApiError> {
    let req = RegisterRequest {
        first_name: raw.first_name.trim().to_string(),
        last_name: raw.last_name.trim().to_string(),
        email: raw.email.trim().to_string(),
        password: raw.password,
    };

    let missing = [&req.first_name, &req.last_name, &req.email, &req.password]
        .iter()
        .any(|s| s.is_empty());
    if missing {
        return Err(ApiError::precondition(FILL_ALL_FIELDS));
    }
    Ok(req)
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let api = StoredValue::new(use_api());
    let banners = Banners::new();
    let form = RegisterForm::new();
    let (is_submitting, set_is_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        banners.clear();

        let req = match form.to_request() {
            Ok(req) => req,
            Err(e) => {
                banners.fail(e.user_message(MessageField::Error, FILL_ALL_FIELDS));
                return;
            }
        };

        set_is_submitting.set(true);
        let api = api.get_value();
        spawn_local(async move {
            if let Err(e) = register(auth, &api, req).await {
                tracing::warn!(error = %e, "registration failed");
                banners.fail(e.user_message(MessageField::Error, "Registration failed"));
            }
            let _ = set_is_submitting.try_set(false);
        });
    };

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-group">
                <label for=id>{label}</label>
                <input
                    id=id
                    type=kind
                    prop:value=value
                    on:input=move |ev| value.set(event_target_value(&ev))
                    required
                />
            </div>
        }
    };

    view! {
        <div class="container">
            <div class="card auth-card">
                <h1>"Register"</h1>
                <BannerView banners=banners />
                <form on:submit=on_submit>
                    {field("firstName", "First Name", "text", form.first_name)}
                    {field("lastName", "Last Name", "text", form.last_name)}
                    {field("email", "Email", "email", form.email)}
                    {field("password", "Password", "password", form.password)}
                    <button type="submit" class="btn btn-primary" disabled=move || is_submitting.get()>
                        {move || if is_submitting.get() { "Registering..." } else { "Register" }}
                    </button>
                </form>
                <p>
                    "Already have an account? "
                    <Link to="/login">"Login here"</Link>
                </p>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(first: &str, last: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_register_request_trims_names() {
        let req = register_request(raw(" Jo ", "Doe", "jo@example.com ", " pw ")).unwrap();
        assert_eq!(req.first_name, "Jo");
        assert_eq!(req.email, "jo@example.com");
        // 密码保持原样
        assert_eq!(req.password, " pw ");
    }

    #[test]
    fn test_register_request_rejects_blank_field() {
        let err = register_request(raw("Jo", "   ", "jo@example.com", "pw")).unwrap_err();
        assert_eq!(
            err.user_message(MessageField::Error, "Registration failed"),
            FILL_ALL_FIELDS
        );
    }
}
