//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 提供简洁的本地存储接口，并实现 Token 存储。

use crate::api::TokenStore;
use garage_shared::TOKEN_STORAGE_KEY;

/// 本地存储操作封装
///
/// 提供静态方法访问浏览器 LocalStorage API。
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值
    ///
    /// 键不存在或发生错误时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，返回操作是否成功
    pub fn set(key: &str, value: &str) -> bool {
        let ok = Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some();
        if !ok {
            tracing::warn!(key, "failed to write local storage");
        }
        ok
    }

    /// 删除存储的键值对，返回操作是否成功
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 以固定键把 Bearer Token 保存在 LocalStorage 中
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageTokens;

impl TokenStore for LocalStorageTokens {
    fn token(&self) -> Option<String> {
        LocalStorage::get(TOKEN_STORAGE_KEY)
    }

    fn store(&self, token: &str) {
        LocalStorage::set(TOKEN_STORAGE_KEY, token);
    }

    fn clear(&self) {
        LocalStorage::delete(TOKEN_STORAGE_KEY);
    }
}
