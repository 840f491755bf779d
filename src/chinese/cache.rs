//! 按年份緩存的計算結果，容量有限，滿則先入先出。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;

/// 以公元年為鍵的有界緩存。
///
/// 計算時不持鎖：同一年份並發請求時可能重複計算，以後寫入者為準。計算失敗不寫入。
#[derive(Debug)]
pub(crate) struct YearCache<T> {
    capacity: usize,
    inner: Mutex<Entries<T>>,
}

#[derive(Debug)]
struct Entries<T> {
    map: HashMap<i32, Arc<T>>,
    /// 插入次序，最舊者在前
    order: VecDeque<i32>,
}

impl<T> YearCache<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Entries {
                map: HashMap::with_capacity(capacity.min(16)),
                order: VecDeque::with_capacity(capacity.min(16)),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries<T>> {
        // 緩存內容恆為完整結果，毒化後仍可安全使用
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self, year: i32) -> Option<Arc<T>> {
        self.lock().map.get(&year).cloned()
    }

    /// 寫入結果，必要時淘汰最舊的年份。
    pub(crate) fn insert(&self, year: i32, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.lock();
        if entries.map.insert(year, Arc::clone(&value)).is_none() {
            entries.order.push_back(year);
            while entries.order.len() > self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.map.remove(&oldest);
                }
            }
        }
        value
    }

    /// 取得緩存結果，若無則以 `f` 計算並寫入。
    pub(crate) fn get_or_try_insert_with<F>(&self, year: i32, f: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(hit) = self.get(year) {
            return Ok(hit);
        }
        tracing::debug!(year, "cache miss");
        let value = f()?;
        Ok(self.insert(year, value))
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalendarError;

    #[test]
    fn evicts_oldest() {
        let cache = YearCache::new(2);
        cache.insert(2000, "a");
        cache.insert(2001, "b");
        cache.insert(2002, "c");
        assert_eq!(2, cache.len());
        assert_eq!(None, cache.get(2000));
        assert_eq!(Some("b"), cache.get(2001).as_deref().copied());
        assert_eq!(Some("c"), cache.get(2002).as_deref().copied());
    }

    #[test]
    fn reinsert_keeps_order() {
        let cache = YearCache::new(2);
        cache.insert(2000, 1);
        cache.insert(2001, 2);
        cache.insert(2000, 3);
        cache.insert(2002, 4);
        assert_eq!(None, cache.get(2000));
        assert_eq!(Some(2), cache.get(2001).map(|v| *v));
    }

    #[test]
    fn computes_once() {
        let cache = YearCache::new(4);
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache
                .get_or_try_insert_with(2024, || {
                    calls += 1;
                    Ok(vec![1, 2, 3])
                })
                .unwrap();
            assert_eq!(vec![1, 2, 3], *v);
        }
        assert_eq!(1, calls);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache: YearCache<u32> = YearCache::new(4);
        let err = CalendarError::CycleCount {
            year: 2024,
            count: 12,
        };
        assert_eq!(
            Err(err.clone()),
            cache.get_or_try_insert_with(2024, || Err(err.clone()))
        );
        assert_eq!(0, cache.len());
        assert_eq!(7, *cache.get_or_try_insert_with(2024, || Ok(7)).unwrap());
    }
}
