use leptos::prelude::*;
use std::time::Duration;

/// 页面顶部的错误 / 成功提示
///
/// 错误提示保留到下一次操作；成功提示在指定时长后自动消失。
#[derive(Clone, Copy)]
pub struct Banners {
    pub error: RwSignal<Option<String>>,
    pub success: RwSignal<Option<String>>,
}

impl Banners {
    pub fn new() -> Self {
        Self {
            error: RwSignal::new(None),
            success: RwSignal::new(None),
        }
    }

    /// 开始新的操作前清空
    pub fn clear(&self) {
        self.error.set(None);
        self.success.set(None);
    }

    pub fn fail(&self, message: String) {
        self.error.set(Some(message));
    }

    pub fn succeed(&self, message: &str, lifetime: Duration) {
        let message = message.to_string();
        self.success.set(Some(message.clone()));

        let success = self.success;
        set_timeout(
            move || {
                // 页面可能已经卸载，也可能已经显示了新的提示
                success.try_update(|current| {
                    if current.as_deref() == Some(message.as_str()) {
                        *current = None;
                    }
                });
            },
            lifetime,
        );
    }
}

impl Default for Banners {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn BannerView(banners: Banners) -> impl IntoView {
    view! {
        {move || banners.error.get().map(|msg| view! { <div class="error">{msg}</div> })}
        {move || banners.success.get().map(|msg| view! { <div class="success">{msg}</div> })}
    }
}
