//! 停车页面
//!
//! 同一份表单状态支持两种流程：点击某个空闲车位（手动），
//! 或只提交车辆由服务端分配（自动）。成功后延时跳转到会话列表。

use super::banner::{BannerView, Banners};
use super::resync::{LoadGeneration, mutate_then_reload};
use crate::api::{GarageApi, HttpClient, use_api};
use crate::config::use_config;
use crate::error::{ApiError, MessageField};
use crate::web::route::AppRoute;
use crate::web::router::use_navigate;
use garage_shared::protocol::{ParkRequest, SpotChoice};
use garage_shared::{Car, CarId, Floor, ParkingSpot};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub(crate) const SELECT_CAR_FIRST: &str = "Please select a car first";

/// 下拉框的值，空字符串表示未选择
pub fn parse_car_selection(value: &str) -> Option<CarId> {
    value.trim().parse().ok()
}

/// 楼层筛选，空字符串表示全部楼层
pub fn parse_floor_filter(value: &str) -> Option<Floor> {
    value.trim().parse().ok()
}

/// 组装停车请求，未选车辆时返回前置条件错误
pub fn build_park_request(car: Option<CarId>, choice: SpotChoice) -> Result<ParkRequest, ApiError> {
    let car_id = car.ok_or_else(|| ApiError::precondition(SELECT_CAR_FIRST))?;
    Ok(ParkRequest { car_id, choice })
}

pub fn success_message(choice: &SpotChoice) -> &'static str {
    match choice {
        SpotChoice::Manual { .. } => "Car parked successfully!",
        SpotChoice::Auto => "Car parked automatically in the best available spot!",
    }
}

fn manual_choice(spot: &ParkingSpot) -> SpotChoice {
    SpotChoice::Manual {
        floor: spot.floor,
        spot_number: spot.spot_number.clone(),
    }
}

// =========================================================
// 加载与停车 (Load & Park)
// =========================================================

/// 页面数据：车辆列表和当前楼层的空闲车位
pub async fn load_page<C: HttpClient>(
    api: &GarageApi<C>,
    floor: Option<Floor>,
) -> Result<(Vec<Car>, Vec<ParkingSpot>), ApiError> {
    futures::try_join!(api.list_cars(), api.available_spots(floor))
}

/// 停车成功后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParkOutcome {
    pub message: &'static str,
    /// 重新加载的页面数据，加载失败时为 `None`
    pub reloaded: Option<(Vec<Car>, Vec<ParkingSpot>)>,
}

/// 停车，成功后重新加载页面数据并安排跳转到会话列表
///
/// 前置条件不满足或停车请求失败时不会调用 `schedule`。
pub async fn park_then_redirect<C, S>(
    api: &GarageApi<C>,
    car: Option<CarId>,
    choice: SpotChoice,
    floor: Option<Floor>,
    delay: Duration,
    schedule: S,
) -> Result<ParkOutcome, ApiError>
where
    C: HttpClient,
    S: FnOnce(AppRoute, Duration),
{
    let req = build_park_request(car, choice)?;
    let reloaded = mutate_then_reload(api.park(&req), load_page(api, floor)).await?;
    tracing::info!(car_id = req.car_id, "car parked");

    schedule(AppRoute::ActiveSessions, delay);

    Ok(ParkOutcome {
        message: success_message(&req.choice),
        reloaded,
    })
}

// =========================================================
// 延时跳转 (Pending Redirect)
// =========================================================

struct RedirectSlot<H> {
    handle: Option<H>,
    closed: bool,
}

/// 尚未触发的跳转
///
/// 页面卸载时关闭：取出句柄交给调用方取消，之后不再接受新的跳转。
pub struct PendingRedirect<H> {
    slot: Arc<Mutex<RedirectSlot<H>>>,
}

impl<H> Clone for PendingRedirect<H> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<H> Default for PendingRedirect<H> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(RedirectSlot {
                handle: None,
                closed: false,
            })),
        }
    }
}

impl<H> PendingRedirect<H> {
    pub fn is_closed(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).closed
    }

    /// 记录新的跳转，返回被替换的旧句柄
    pub fn replace(&self, handle: H) -> Option<H> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle
            .replace(handle)
    }

    pub fn close(&self) -> Option<H> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.closed = true;
        slot.handle.take()
    }
}

/// 当前 Owner 清理时关闭 `pending` 并取消其中的跳转
pub fn cancel_on_cleanup<H, F>(pending: PendingRedirect<H>, cancel: F)
where
    H: Send + 'static,
    F: Fn(H) + Send + Sync + 'static,
{
    on_cleanup(move || {
        if let Some(handle) = pending.close() {
            cancel(handle);
        }
    });
}

// =========================================================
// 页面 (Page)
// =========================================================

#[component]
pub fn ParkCarPage() -> impl IntoView {
    let api = StoredValue::new(use_api());
    let config = use_config();
    let navigate = use_navigate();
    let banners = Banners::new();

    let cars = RwSignal::new(Vec::<Car>::new());
    let spots = RwSignal::new(Vec::<ParkingSpot>::new());
    let selected_car = RwSignal::new(Option::<CarId>::None);
    let selected_floor = RwSignal::new(Option::<Floor>::None);
    let generation = StoredValue::new(LoadGeneration::default());

    // 页面卸载时取消尚未触发的跳转
    let pending = PendingRedirect::<TimeoutHandle>::default();
    cancel_on_cleanup(pending.clone(), |handle: TimeoutHandle| handle.clear());
    let pending = StoredValue::new(pending);

    let apply = move |(car_list, spot_list): (Vec<Car>, Vec<ParkingSpot>)| {
        let _ = cars.try_set(car_list);
        let _ = spots.try_set(spot_list);
    };

    // 楼层筛选变化时重新加载车辆和车位，较早发起的加载结果被丢弃
    Effect::new(move |_| {
        let floor = selected_floor.get();
        let api = api.get_value();
        let generation = generation.get_value();
        spawn_local(async move {
            match generation.guard(load_page(&api, floor)).await {
                Some(Ok(data)) => apply(data),
                Some(Err(e)) => tracing::error!(error = %e, ?floor, "failed to load parking data"),
                None => {}
            }
        });
    });

    let redirect_delay = config.redirect_delay;
    let lifetime = config.banner_lifetime;

    let park = move |choice: SpotChoice| {
        banners.clear();

        let api = api.get_value();
        let generation = generation.get_value();
        let pending = pending.get_value();
        let car = selected_car.get_untracked();
        let floor = selected_floor.get_untracked();

        let schedule = move |route: AppRoute, delay: Duration| {
            if pending.is_closed() {
                return;
            }
            let path = route.to_path();
            match set_timeout_with_handle(move || navigate(path), delay) {
                Ok(handle) => {
                    if let Some(previous) = pending.replace(handle) {
                        previous.clear();
                    }
                }
                Err(e) => tracing::warn!(error = ?e, "failed to schedule redirect"),
            }
        };

        // 停车后的重新加载与楼层加载共用代次
        let ticket = generation.begin();
        spawn_local(async move {
            match park_then_redirect(&api, car, choice, floor, redirect_delay, schedule).await {
                Ok(outcome) => {
                    if let Some(data) = outcome.reloaded.filter(|_| generation.is_current(ticket)) {
                        apply(data);
                    }
                    banners.succeed(outcome.message, lifetime);
                }
                Err(e) => banners.fail(e.user_message(MessageField::Error, "Error parking car")),
            }
        });
    };

    let floor_options = config
        .floors
        .iter()
        .map(|floor| view! { <option value=floor.to_string()>{format!("Floor {}", floor)}</option> })
        .collect_view();

    view! {
        <div class="container">
            <h1 class="page-title">"Park a Car"</h1>
            <BannerView banners=banners />

            <div class="card">
                <div class="form-group">
                    <label>"Select Car"</label>
                    <select on:change=move |ev| selected_car.set(parse_car_selection(&event_target_value(&ev)))>
                        <option value="">"-- Select a car --"</option>
                        <For
                            each=move || cars.get()
                            key=|car| car.id
                            children=move |car| view! {
                                <option value=car.id.to_string()>{car.label()}</option>
                            }
                        />
                    </select>
                </div>

                <Show when=move || selected_car.get().is_some()>
                    <button class="btn btn-primary" on:click=move |_| park(SpotChoice::Auto)>
                        "Auto-Park (Let System Choose Best Spot)"
                    </button>
                </Show>
            </div>

            <h2 class="section">"Or Choose Your Spot Manually"</h2>

            <div class="card">
                <div class="form-group">
                    <label>"Filter by Floor"</label>
                    <select on:change=move |ev| selected_floor.set(parse_floor_filter(&event_target_value(&ev)))>
                        <option value="">"All Floors"</option>
                        {floor_options}
                    </select>
                </div>
            </div>

            <h2 class="section">
                {move || format!("Available Parking Spots ({})", spots.with(Vec::len))}
            </h2>

            <Show
                when=move || !spots.with(Vec::is_empty)
                fallback=|| view! {
                    <div class="card">
                        <p class="empty">"No available spots on the selected floor."</p>
                    </div>
                }
            >
                <div class="grid grid-3">
                    <For
                        each=move || spots.get()
                        key=|spot| spot.id
                        children=move |spot| {
                            let choice = manual_choice(&spot);
                            view! {
                                <div class="parking-spot available" on:click=move |_| park(choice.clone())>
                                    <h3>{format!("Spot {}", spot.spot_number)}</h3>
                                    <p>{format!("Floor {}", spot.floor)}</p>
                                    <button class="btn btn-success">"Park Here"</button>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use crate::config::AppConfig;
    use garage_shared::SpotNumber;
    use leptos::reactive::owner::Owner;
    use std::cell::RefCell;
    use garage_shared::protocol::HttpMethod;
    use serde_json::json;

    fn spot_14() -> ParkingSpot {
        serde_json::from_value(json!({"id": 40, "floor": 2, "spotNumber": "14"})).unwrap()
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!(parse_car_selection("7"), Some(7));
        assert_eq!(parse_car_selection(""), None);
        assert_eq!(parse_floor_filter("2"), Some(2));
        assert_eq!(parse_floor_filter(""), None);
    }

    #[test]
    fn test_park_without_car_is_a_precondition_error() {
        let err = build_park_request(None, SpotChoice::Auto).unwrap_err();
        assert_eq!(
            err.user_message(MessageField::Error, "Error parking car"),
            SELECT_CAR_FIRST
        );
    }

    #[test]
    fn test_success_message_depends_on_choice() {
        assert_eq!(success_message(&manual_choice(&spot_14())), "Car parked successfully!");
        assert_eq!(
            success_message(&SpotChoice::Auto),
            "Car parked automatically in the best available spot!"
        );
    }

    fn parked_session() -> serde_json::Value {
        json!({
            "parkingSessionId": 3,
            "car": {"id": 7, "make": "Honda", "model": "Civic", "licensePlate": "AB12CDE"},
            "spot": {"id": 40, "floor": 2, "spotNumber": "14"},
            "startTime": "2026-10-17T10:00:00"
        })
    }

    #[tokio::test]
    async fn test_manual_park_sends_floor_and_spot_then_redirects() {
        let client = MockHttpClient::new();
        client.mock(HttpMethod::Post, "/api/parking/park", 200, parked_session());
        client.mock(HttpMethod::Get, "/api/cars", 200, json!([parked_session()["car"].clone()]));
        client.mock(HttpMethod::Get, "/api/spots/available?floor=2", 200, json!([]));
        let api = api_with(client, MemoryTokens::with_token("abc123"));
        let delay = AppConfig::default().redirect_delay;
        let scheduled = RefCell::new(Vec::new());

        let outcome = park_then_redirect(
            &api,
            parse_car_selection("7"),
            manual_choice(&spot_14()),
            Some(2),
            delay,
            |route, after| scheduled.borrow_mut().push((route, after)),
        )
        .await
        .unwrap();

        assert_eq!(outcome.message, "Car parked successfully!");
        let (cars, spots) = outcome.reloaded.unwrap();
        assert_eq!(cars[0].id, 7);
        assert!(spots.is_empty());
        assert_eq!(
            scheduled.into_inner(),
            vec![(AppRoute::ActiveSessions, Duration::from_secs(2))]
        );
        assert_eq!(AppRoute::ActiveSessions.to_path(), "/active");

        let mock = mock_of(&api);
        assert_eq!(
            mock.requests.borrow()[0].json(),
            json!({"carId": 7, "floor": 2, "spotNumber": "14"})
        );
        assert_eq!(mock.calls()[0], "POST /api/parking/park");
        assert!(mock.calls().contains(&"GET /api/cars".to_string()));
        assert!(mock.calls().contains(&"GET /api/spots/available?floor=2".to_string()));
    }

    #[tokio::test]
    async fn test_failed_park_schedules_nothing() {
        let client = MockHttpClient::new();
        client.mock(
            HttpMethod::Post,
            "/api/parking/park",
            409,
            json!({"error": "Spot is already occupied"}),
        );
        let api = api_with(client, MemoryTokens::with_token("abc123"));
        let scheduled = RefCell::new(Vec::new());

        let err = park_then_redirect(
            &api,
            Some(7),
            manual_choice(&spot_14()),
            None,
            Duration::from_secs(2),
            |route, after| scheduled.borrow_mut().push((route, after)),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.user_message(MessageField::Error, "Error parking car"),
            "Spot is already occupied"
        );
        assert!(scheduled.borrow().is_empty());
        assert_eq!(mock_of(&api).calls(), vec!["POST /api/parking/park"]);
    }

    #[tokio::test]
    async fn test_missing_car_schedules_nothing_and_sends_nothing() {
        let api = api_with(MockHttpClient::new(), MemoryTokens::with_token("abc123"));
        let scheduled = RefCell::new(Vec::new());

        let err = park_then_redirect(
            &api,
            parse_car_selection(""),
            SpotChoice::Auto,
            None,
            Duration::from_secs(2),
            |route, after| scheduled.borrow_mut().push((route, after)),
        )
        .await
        .unwrap_err();

        assert_eq!(err, ApiError::precondition(SELECT_CAR_FIRST));
        assert!(scheduled.borrow().is_empty());
        assert!(mock_of(&api).calls().is_empty());
    }

    #[test]
    fn test_unmount_cancels_pending_redirect() {
        let cancelled = Arc::new(Mutex::new(Vec::new()));
        let pending = PendingRedirect::<u32>::default();

        let owner = Owner::new();
        owner.with(|| {
            let cancelled = Arc::clone(&cancelled);
            cancel_on_cleanup(pending.clone(), move |handle| {
                cancelled.lock().unwrap().push(handle)
            });
        });
        assert_eq!(pending.replace(1), None);
        // 第二次停车替换掉第一次的跳转
        assert_eq!(pending.replace(2), Some(1));

        owner.cleanup();

        assert_eq!(*cancelled.lock().unwrap(), vec![2]);
        assert!(pending.is_closed());
        assert_eq!(pending.close(), None);
    }

    #[tokio::test]
    async fn test_auto_park_sends_only_car() {
        let client = MockHttpClient::new();
        client.mock(
            HttpMethod::Post,
            "/api/parking/park",
            409,
            json!({"error": "No available spots"}),
        );
        let api = api_with(client, MemoryTokens::with_token("abc123"));

        let req = build_park_request(Some(7), SpotChoice::Auto).unwrap();
        let err = api.park(&req).await.unwrap_err();

        assert_eq!(mock_of(&api).requests.borrow()[0].json(), json!({"carId": 7}));
        assert_eq!(
            err.user_message(MessageField::Error, "Error parking car"),
            "No available spots"
        );
    }

    #[test]
    fn test_numeric_spot_number_is_sent_back_as_number() {
        let spot: ParkingSpot =
            serde_json::from_value(json!({"id": 1, "floor": 1, "spotNumber": 5})).unwrap();
        let req = build_park_request(Some(1), manual_choice(&spot)).unwrap();
        assert_eq!(
            req.choice,
            SpotChoice::Manual {
                floor: 1,
                spot_number: SpotNumber::Number(5)
            }
        );
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"carId": 1, "floor": 1, "spotNumber": 5})
        );
    }
}
