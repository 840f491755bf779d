//! 二十四節氣。

use std::sync::Arc;

use super::{Calendar, fmt};
use crate::date::Date;
use crate::ephemeris::Ephemeris;
use crate::error::Result;
use crate::time_scales::Ut;

/// 冬至在一年節氣中的序號。
pub const WINTER_SOLSTICE: usize = 18;

/// 每次搜索的窗口長度（日）。
const SEARCH_WINDOW_DAYS: f64 = 30.0;
/// 相鄰兩次搜索起點的間隔（日）。
const SEED_STEP_DAYS: f64 = 15.0;

/// 節氣，即太陽視黃經到達 15° 倍數的時刻。
///
/// `index` 自春分（0°）起算，取值 `0..24`，冬至為 18。
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolarTerm {
    pub index: u32,
    pub instant: Ut,
}

impl SolarTerm {
    /// 中氣（黃經為 30° 倍數，即序號為偶數）為 `true`。
    ///
    /// ```
    /// use nongli::chinese::SolarTerm;
    /// use nongli::time_scales::Ut;
    ///
    /// let winter_solstice = SolarTerm { index: 18, instant: Ut(2451534.82) };
    /// assert!(winter_solstice.is_principal());
    /// assert_eq!("冬至", winter_solstice.name());
    /// ```
    pub fn is_principal(&self) -> bool {
        self.index % 2 == 0
    }

    pub fn name(&self) -> &'static str {
        fmt::solar_term(self.index)
    }

    /// 太陽視黃經，單位為度。
    pub fn longitude(&self) -> f64 {
        f64::from(self.index) * 15.0
    }
}

impl<E: Ephemeris> Calendar<E> {
    /// 取得公元 `year` 年自春分至次年驚蟄的 24 個節氣，按時間排列。
    ///
    /// 結果按年緩存，重複調用返回同一數據。
    ///
    /// # 用例
    ///
    /// ```
    /// use nongli::{Calendar, CalendarConfig};
    ///
    /// let calendar = Calendar::new(CalendarConfig::default()).unwrap();
    /// let terms = calendar.solar_terms(2023).unwrap();
    ///
    /// assert_eq!(24, terms.len());
    /// assert_eq!("2023-03-21", calendar.civil_date(terms[0].instant).iso_gregorian());
    /// ```
    ///
    /// # Errors
    ///
    /// 年份超出曆表範圍時返回 [`InvalidYear`](crate::CalendarError::InvalidYear)，
    /// 曆表搜索失敗時返回 [`EphemerisNotFound`](crate::CalendarError::EphemerisNotFound)。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn solar_terms(&self, year: i32) -> Result<Arc<Vec<SolarTerm>>> {
        self.require_years(year..=year)?;
        self.solar_terms_cache
            .get_or_try_insert_with(year, || self.compute_solar_terms(year))
    }

    fn compute_solar_terms(&self, year: i32) -> Result<Vec<SolarTerm>> {
        let march_10 = Date::from_gregorian(year, 3, 10).ok_or_else(|| self.invalid_year(year))?;
        // 起點每次固定前移 15 日，不以上一節氣時刻為準
        let mut seed = Ut::midnight(march_10, self.utc_offset());
        let mut terms = Vec::with_capacity(24);
        for index in 0..24 {
            let target = f64::from(index) * 15.0;
            let instant = self
                .ephemeris
                .find_solar_longitude(target, seed, SEARCH_WINDOW_DAYS)?;
            terms.push(SolarTerm { index, instant });
            seed = seed + SEED_STEP_DAYS;
        }
        Ok(terms)
    }
}
