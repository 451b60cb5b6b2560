/// 弹出浏览器确认框，用户取消或无法弹出时返回 `false`
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}
