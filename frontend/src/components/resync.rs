//! 写操作后的重新同步
//!
//! 所有写操作（新增/删除车辆、停车、离场）成功后都重新拉取完整列表，
//! 不在本地做增量修改。

use crate::error::ApiError;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 先执行写操作，成功后再拉取列表
///
/// - 写操作失败：返回该错误，列表请求不会发出
/// - 写操作成功、重新拉取失败：记录日志并返回 `Ok(None)`，调用方保留旧列表
pub async fn mutate_then_reload<M, R, L, T>(mutation: M, reload: L) -> Result<Option<T>, ApiError>
where
    M: Future<Output = Result<R, ApiError>>,
    L: Future<Output = Result<T, ApiError>>,
{
    mutation.await?;

    match reload.await {
        Ok(list) => Ok(Some(list)),
        Err(e) => {
            tracing::warn!(error = %e, "resync after mutation failed");
            Ok(None)
        }
    }
}

/// 加载代次
///
/// 每次发起加载时领取一个编号，只有最近一次加载的结果会被写回页面。
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration(Arc<AtomicU64>);

impl LoadGeneration {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }

    /// 立即领取编号；`fut` 完成时若已有更新的加载发起，返回 `None`
    pub fn guard<F: Future>(&self, fut: F) -> impl Future<Output = Option<F::Output>> + use<F> {
        let ticket = self.begin();
        let generation = self.clone();
        async move {
            let output = fut.await;
            if generation.is_current(ticket) {
                Some(output)
            } else {
                tracing::debug!(ticket, "dropping stale load result");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::*;
    use garage_shared::protocol::HttpMethod;
    use serde_json::json;

    fn car(id: i64, plate: &str) -> serde_json::Value {
        json!({"id": id, "make": "Honda", "model": "Civic", "licensePlate": plate})
    }

    #[tokio::test]
    async fn test_delete_always_refetches() {
        let client = MockHttpClient::new();
        client.mock_empty(HttpMethod::Delete, "/api/cars/1", 204);
        client.mock(HttpMethod::Get, "/api/cars", 200, json!([car(2, "ZZ99ZZZ")]));
        let api = api_with(client, MemoryTokens::with_token("t"));

        let list = mutate_then_reload(api.delete_car(1), api.list_cars())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, 2);
        assert_eq!(
            mock_of(&api).calls(),
            vec!["DELETE /api/cars/1", "GET /api/cars"]
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_skips_refetch() {
        let client = MockHttpClient::new();
        client.mock(
            HttpMethod::Delete,
            "/api/cars/1",
            404,
            json!({"error": "CAR_NOT_FOUND", "message": "Car not found or not owned by user"}),
        );
        let api = api_with(client, MemoryTokens::with_token("t"));

        let err = mutate_then_reload(api.delete_car(1), api.list_cars())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(mock_of(&api).calls(), vec!["DELETE /api/cars/1"]);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_success() {
        let client = MockHttpClient::new();
        client.mock_empty(HttpMethod::Delete, "/api/cars/1", 204);
        client.fail(HttpMethod::Get, "/api/cars");
        let api = api_with(client, MemoryTokens::with_token("t"));

        let outcome = mutate_then_reload(api.delete_car(1), api.list_cars()).await;
        assert_eq!(outcome, Ok(None));
    }

    #[tokio::test]
    async fn test_slow_earlier_load_is_dropped() {
        let client = MockHttpClient::new();
        client.mock(HttpMethod::Get, "/api/spots/available?floor=1", 200, json!([{"id": 1, "floor": 1, "spotNumber": 1}]));
        client.mock(HttpMethod::Get, "/api/spots/available?floor=2", 200, json!([{"id": 2, "floor": 2, "spotNumber": 1}]));
        let api = api_with(client, MemoryTokens::with_token("t"));
        let generation = LoadGeneration::default();
        let (release, released) = futures::channel::oneshot::channel::<()>();

        // 楼层 1 先发起，但要等楼层 2 返回之后才完成
        let floor_1 = generation.guard(async {
            let _ = released.await;
            api.available_spots(Some(1)).await
        });
        let floor_2 = generation.guard(async {
            let spots = api.available_spots(Some(2)).await;
            let _ = release.send(());
            spots
        });

        let (stale, fresh) = futures::join!(floor_1, floor_2);
        assert_eq!(stale, None);
        assert_eq!(fresh.unwrap().unwrap()[0].floor, 2);
    }

    #[test]
    fn test_generation_clones_share_the_counter() {
        let generation = LoadGeneration::default();
        let page = generation.clone();
        let ticket = page.begin();
        assert!(generation.is_current(ticket));
        generation.begin();
        assert!(!page.is_current(ticket));
    }
}
