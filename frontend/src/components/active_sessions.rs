use super::banner::{BannerView, Banners};
use super::resync::mutate_then_reload;
use crate::api::use_api;
use crate::config::use_config;
use crate::error::MessageField;
use crate::web::confirm;
use chrono::NaiveDateTime;
use garage_shared::{Elapsed, ParkingSession, SessionId};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 已停时长，不自动刷新
pub fn duration_label(session: &ParkingSession, now: NaiveDateTime) -> String {
    Elapsed::between(session.start_time, now).to_string()
}

/// 会话列表及其加载时刻
///
/// 每次加载（含离场后的重新拉取）都盖上新的时间戳，时长按该时刻计算。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBoard {
    pub sessions: Vec<ParkingSession>,
    pub loaded_at: NaiveDateTime,
}

impl SessionBoard {
    pub fn loaded(sessions: Vec<ParkingSession>, now: NaiveDateTime) -> Self {
        Self {
            sessions,
            loaded_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn duration_of(&self, id: SessionId) -> Option<String> {
        self.sessions
            .iter()
            .find(|s| s.parking_session_id == id)
            .map(|s| duration_label(s, self.loaded_at))
    }
}

/// 浏览器本地时间
fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[component]
pub fn ActiveSessionsPage() -> impl IntoView {
    let api = StoredValue::new(use_api());
    let lifetime = use_config().banner_lifetime;
    let banners = Banners::new();
    let board = RwSignal::new(SessionBoard::default());
    let show = move |list: Vec<ParkingSession>| {
        let _ = board.try_set(SessionBoard::loaded(list, local_now()));
    };

    {
        let api = api.get_value();
        spawn_local(async move {
            match api.active_sessions().await {
                Ok(list) => show(list),
                Err(e) => tracing::error!(error = %e, "failed to load sessions"),
            }
        });
    }

    let on_leave = move |id: SessionId| {
        if !confirm("Are you sure you want to leave this parking spot?") {
            return;
        }
        banners.clear();

        let api = api.get_value();
        spawn_local(async move {
            match mutate_then_reload(api.leave_spot(id), api.active_sessions()).await {
                Ok(list) => {
                    if let Some(list) = list {
                        show(list);
                    }
                    tracing::info!(session_id = id, "parking spot freed");
                    banners.succeed("Parking spot freed successfully!", lifetime);
                }
                Err(e) => {
                    banners.fail(e.user_message(MessageField::Error, "Error leaving parking spot"))
                }
            }
        });
    };

    view! {
        <div class="container">
            <h1 class="page-title">"Active Parking Sessions"</h1>
            <BannerView banners=banners />

            <Show
                when=move || !board.with(SessionBoard::is_empty)
                fallback=|| view! {
                    <div class="card">
                        <p class="empty">"You don't have any active parking sessions."</p>
                    </div>
                }
            >
                <div class="grid grid-2">
                    <For
                        each=move || board.with(|b| b.sessions.clone())
                        key=|s| s.parking_session_id
                        children=move |s| {
                            let id = s.parking_session_id;
                            let duration = move || board.with(|b| b.duration_of(id)).unwrap_or_default();
                            let color = s.car.color().map(str::to_string);
                            view! {
                                <div class="card">
                                    <h3>{format!("{} {}", s.car.make, s.car.model)}</h3>
                                    <p><strong>"License Plate: "</strong>{s.car.license_plate.clone()}</p>
                                    {color.map(|c| view! { <p><strong>"Color: "</strong>{c}</p> })}
                                    <hr />
                                    <p><strong>"Floor: "</strong>{s.spot.floor}</p>
                                    <p><strong>"Spot Number: "</strong>{s.spot.spot_number.to_string()}</p>
                                    <p><strong>"Started: "</strong>{s.start_time.display()}</p>
                                    <p><strong>"Duration: "</strong>{duration}</p>
                                    <button class="btn btn-danger btn-block" on:click=move |_| on_leave(id)>
                                        "Leave Spot"
                                    </button>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        </div>
    }
}
