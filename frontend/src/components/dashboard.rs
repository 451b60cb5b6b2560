use super::banner::{BannerView, Banners};
use crate::api::{GarageApi, HttpClient, use_api};
use crate::error::{ApiError, MessageField};
use crate::web::router::Link;
use garage_shared::{Car, ParkingSession};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Dashboard 展示的汇总数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub cars: Vec<Car>,
    pub sessions: Vec<ParkingSession>,
    pub available_spots: usize,
}

/// 并发拉取三项数据
///
/// 任意一项失败则整体失败，调用方不做部分更新。
pub async fn load_overview<C: HttpClient>(api: &GarageApi<C>) -> Result<Overview, ApiError> {
    let (cars, sessions, spots) = futures::try_join!(
        api.list_cars(),
        api.active_sessions(),
        api.available_spots(None),
    )?;

    Ok(Overview {
        cars,
        sessions,
        available_spots: spots.len(),
    })
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let banners = Banners::new();
    let overview = RwSignal::new(Overview::default());

    spawn_local(async move {
        match load_overview(&api).await {
            Ok(data) => {
                let _ = overview.try_set(data);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load dashboard data");
                let _ = banners.error.try_set(Some(
                    e.user_message(MessageField::Error, "Error loading dashboard data"),
                ));
            }
        }
    });

    let cars_count = move || overview.with(|o| o.cars.len());
    let sessions_count = move || overview.with(|o| o.sessions.len());
    let spots_count = move || overview.with(|o| o.available_spots);

    view! {
        <div class="container">
            <h1 class="page-title">"Dashboard"</h1>
            <BannerView banners=banners />

            <div class="grid grid-3">
                <div class="card">
                    <h3>"My Cars"</h3>
                    <p class="stat-value">{cars_count}</p>
                    <Link to="/cars" class="btn btn-primary">"Manage Cars"</Link>
                </div>
                <div class="card">
                    <h3>"Active Parking Sessions"</h3>
                    <p class="stat-value">{sessions_count}</p>
                    <Link to="/active" class="btn btn-primary">"View Sessions"</Link>
                </div>
                <div class="card">
                    <h3>"Available Spots"</h3>
                    <p class="stat-value">{spots_count}</p>
                    <Link to="/park" class="btn btn-success">"Park a Car"</Link>
                </div>
            </div>

            <Show when=move || { sessions_count() > 0 }>
                <div class="section">
                    <h2>"Current Parking Sessions"</h2>
                    <div class="grid grid-2">
                        <For
                            each=move || overview.get().sessions
                            key=|s| s.parking_session_id
                            children=move |s| view! {
                                <div class="card">
                                    <h3>{format!("{} {}", s.car.make, s.car.model)}</h3>
                                    <p><strong>"License Plate: "</strong>{s.car.license_plate.clone()}</p>
                                    <p><strong>"Location: "</strong>{s.location()}</p>
                                    <p><strong>"Started: "</strong>{s.start_time.display()}</p>
                                </div>
                            }
                        />
                    </div>
                </div>
            </Show>
        </div>
    }
}
