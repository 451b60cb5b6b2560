//! 我的车辆
//!
//! 列表、新增表单与删除。所有写操作成功后都重新拉取列表。

use super::banner::{BannerView, Banners};
use super::resync::mutate_then_reload;
use crate::api::use_api;
use crate::config::use_config;
use crate::error::{ApiError, MessageField};
use crate::web::confirm;
use garage_shared::{Car, CarId, LicensePlate, NewCar, normalize_plate_input};
use leptos::prelude::*;
use leptos::task::spawn_local;

// =========================================================
// 表单 (Form)
// =========================================================

/// 表单内容的快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarDraft {
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub color: String,
}

impl CarDraft {
    /// 提交前校验，返回请求体
    pub fn validate(&self) -> Result<NewCar, ApiError> {
        let make = self.make.trim();
        let model = self.model.trim();
        if make.is_empty() || model.is_empty() {
            return Err(ApiError::precondition("Make and model are required"));
        }

        let plate = LicensePlate::parse(&self.license_plate)?;

        Ok(NewCar {
            make: make.to_string(),
            model: model.to_string(),
            license_plate: plate.into_string(),
            color: self.color.trim().to_string(),
        })
    }
}

/// 新增车辆表单的信号集合
#[derive(Clone, Copy)]
struct CarForm {
    make: RwSignal<String>,
    model: RwSignal<String>,
    license_plate: RwSignal<String>,
    color: RwSignal<String>,
}

impl CarForm {
    fn new() -> Self {
        Self {
            make: RwSignal::new(String::new()),
            model: RwSignal::new(String::new()),
            license_plate: RwSignal::new(String::new()),
            color: RwSignal::new(String::new()),
        }
    }

    fn reset(&self) {
        self.make.set(String::new());
        self.model.set(String::new());
        self.license_plate.set(String::new());
        self.color.set(String::new());
    }

    /// 每次输入都转大写并截断
    fn set_plate(&self, raw: &str) {
        self.license_plate.set(normalize_plate_input(raw));
    }

    fn snapshot(&self) -> CarDraft {
        CarDraft {
            make: self.make.get_untracked(),
            model: self.model.get_untracked(),
            license_plate: self.license_plate.get_untracked(),
            color: self.color.get_untracked(),
        }
    }
}

// =========================================================
// 页面 (Page)
// =========================================================

#[component]
pub fn MyCarsPage() -> impl IntoView {
    let api = StoredValue::new(use_api());
    let config = use_config();
    let banners = Banners::new();
    let form = CarForm::new();
    let cars = RwSignal::new(Vec::<Car>::new());
    let show_form = RwSignal::new(false);

    let load_cars = move || {
        let api = api.get_value();
        spawn_local(async move {
            match api.list_cars().await {
                Ok(list) => {
                    let _ = cars.try_set(list);
                }
                Err(e) => tracing::error!(error = %e, "failed to load cars"),
            }
        });
    };

    load_cars();

    let lifetime = config.banner_lifetime;

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        banners.clear();

        let car = match form.snapshot().validate() {
            Ok(car) => car,
            Err(e) => {
                banners.fail(e.user_message(MessageField::Message, "Error adding car"));
                return;
            }
        };

        let api = api.get_value();
        spawn_local(async move {
            match mutate_then_reload(api.add_car(&car), api.list_cars()).await {
                Ok(list) => {
                    if let Some(list) = list {
                        let _ = cars.try_set(list);
                    }
                    banners.succeed("Car added successfully!", lifetime);
                    form.reset();
                    show_form.set(false);
                }
                Err(e) => banners.fail(e.user_message(MessageField::Message, "Error adding car")),
            }
        });
    };

    let on_delete = move |id: CarId| {
        if !confirm("Are you sure you want to delete this car?") {
            return;
        }
        banners.clear();

        let api = api.get_value();
        spawn_local(async move {
            match mutate_then_reload(api.delete_car(id), api.list_cars()).await {
                Ok(list) => {
                    if let Some(list) = list {
                        let _ = cars.try_set(list);
                    }
                    banners.succeed("Car deleted successfully!", lifetime);
                }
                Err(e) => banners.fail(e.user_message(MessageField::Message, "Error deleting car")),
            }
        });
    };

    view! {
        <div class="container">
            <div class="page-header">
                <h1>"My Cars"</h1>
                <button class="btn btn-primary" on:click=move |_| show_form.update(|v| *v = !*v)>
                    {move || if show_form.get() { "Cancel" } else { "Add New Car" }}
                </button>
            </div>

            <BannerView banners=banners />

            <Show when=move || show_form.get()>
                <div class="card">
                    <h2>"Add New Car"</h2>
                    <form on:submit=on_submit>
                        <div class="form-group">
                            <label>"Make"</label>
                            <input
                                type="text"
                                prop:value=form.make
                                on:input=move |ev| form.make.set(event_target_value(&ev))
                                required
                            />
                        </div>
                        <div class="form-group">
                            <label>"Model"</label>
                            <input
                                type="text"
                                prop:value=form.model
                                on:input=move |ev| form.model.set(event_target_value(&ev))
                                required
                            />
                        </div>
                        <div class="form-group">
                            <label>"License Plate (7 characters)"</label>
                            <input
                                type="text"
                                maxlength="7"
                                pattern="[A-Z0-9]{7}"
                                prop:value=form.license_plate
                                on:input=move |ev| form.set_plate(&event_target_value(&ev))
                                required
                            />
                        </div>
                        <div class="form-group">
                            <label>"Color"</label>
                            <input
                                type="text"
                                prop:value=form.color
                                on:input=move |ev| form.color.set(event_target_value(&ev))
                            />
                        </div>
                        <button type="submit" class="btn btn-success">"Add Car"</button>
                    </form>
                </div>
            </Show>

            <div class="grid grid-2">
                <For
                    each=move || cars.get()
                    key=|car| car.id
                    children=move |car| {
                        let id = car.id;
                        let color = car.color().map(str::to_string);
                        view! {
                            <div class="card">
                                <h3>{format!("{} {}", car.make, car.model)}</h3>
                                <p><strong>"License Plate: "</strong>{car.license_plate.clone()}</p>
                                {color.map(|c| view! { <p><strong>"Color: "</strong>{c}</p> })}
                                <button class="btn btn-danger" on:click=move |_| on_delete(id)>
                                    "Delete"
                                </button>
                            </div>
                        }
                    }
                />
            </div>

            <Show when=move || cars.with(Vec::is_empty) && !show_form.get()>
                <div class="card">
                    <p class="empty">"No cars registered yet. Add your first car!"</p>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use garage_shared::protocol::HttpMethod;
    use serde_json::json;

    fn draft(make: &str, model: &str, plate: &str) -> CarDraft {
        CarDraft {
            make: make.into(),
            model: model.into(),
            license_plate: normalize_plate_input(plate),
            color: String::new(),
        }
    }

    #[test]
    fn test_validate_requires_make_and_model() {
        let err = draft("Honda", " ", "AB12CDE").validate().unwrap_err();
        assert_eq!(err, ApiError::precondition("Make and model are required"));
    }

    #[test]
    fn test_validate_rejects_short_plate() {
        let err = draft("Honda", "Civic", "ab12").validate().unwrap_err();
        assert_eq!(
            err.user_message(MessageField::Message, "Error adding car"),
            "License plate must be 7 letters/numbers"
        );
    }

    #[test]
    fn test_plate_input_is_normalized_before_validation() {
        let car = draft("Honda", "Civic", "ab12cdefg").validate().unwrap();
        assert_eq!(car.license_plate, "AB12CDE");
        assert_eq!(car.color, "");
    }

    #[tokio::test]
    async fn test_add_car_posts_then_refetches() {
        let client = MockHttpClient::new();
        let created = json!({"id": 9, "make": "Honda", "model": "Civic", "licensePlate": "AB12CDE", "color": ""});
        client.mock(HttpMethod::Post, "/api/cars", 200, created.clone());
        client.mock(HttpMethod::Get, "/api/cars", 200, json!([created]));
        let api = api_with(client, MemoryTokens::with_token("abc123"));

        let car = draft("Honda", "Civic", "ab12cde").validate().unwrap();
        let list = mutate_then_reload(api.add_car(&car), api.list_cars())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(list[0].license_plate, "AB12CDE");
        assert_eq!(list[0].color(), None);
        let mock = mock_of(&api);
        assert_eq!(mock.calls(), vec!["POST /api/cars", "GET /api/cars"]);
        assert_eq!(
            mock.requests.borrow()[0].json(),
            json!({"make": "Honda", "model": "Civic", "licensePlate": "AB12CDE", "color": ""})
        );
    }

    #[tokio::test]
    async fn test_add_car_error_uses_message_field() {
        let client = MockHttpClient::new();
        client.mock(
            HttpMethod::Post,
            "/api/cars",
            400,
            json!({"error": "DUPLICATE_PLATE", "message": "License plate already registered"}),
        );
        let api = api_with(client, MemoryTokens::with_token("abc123"));

        let car = draft("Honda", "Civic", "AB12CDE").validate().unwrap();
        let err = mutate_then_reload(api.add_car(&car), api.list_cars())
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(MessageField::Message, "Error adding car"),
            "License plate already registered"
        );
        assert_eq!(mock_of(&api).calls(), vec!["POST /api/cars"]);
    }
}
