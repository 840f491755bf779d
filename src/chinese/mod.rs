//! Chinese calendar
//!
//! Note: 為方便處理諸多術語，本模塊文檔用中文。
//!
//! 本程序依天文曆表即時推算節氣與月相，再據以編排夏曆，見 [`Calendar`]。
//!
//! 編算以「歲」為單位：歲 `y` 自 `y - 1` 年冬至所在月（十一月）起，至 `y` 年冬至所在月之前一月止。
//! 兩冬至間若有 13 個月則置閏，以其中首個不含中氣之月為閏月。

use std::fmt as std_fmt;
use std::ops::RangeInclusive;

use crate::config::CalendarConfig;
use crate::date::Date;
use crate::ephemeris::{Analytic, Ephemeris};
use crate::error::{CalendarError, Result};
use crate::time_scales::Ut;

mod cache;
pub mod fmt;
mod grid;
mod lunar_phases;
mod months;
mod solar_terms;

use cache::YearCache;
pub use grid::{CalendarMonth, DayCell, Festival, MonthSize};
pub use lunar_phases::{Phase, PhaseCycle};
pub use months::{Event, EventKind, MonthRecord};
pub use solar_terms::{SolarTerm, WINTER_SOLSTICE};

/// 夏曆編算上下文，持有配置、曆表及按年緩存的節氣與月編排。
///
/// 可在多線程間共享（`E: Sync` 時）。
///
/// # 用例
///
/// ```
/// use nongli::{Calendar, CalendarConfig, Date};
/// use nongli::chinese::Month::*;
///
/// let calendar = Calendar::new(CalendarConfig::default()).unwrap();
/// let date = Date::from_gregorian(2000, 1, 1).unwrap();
/// let lunar = calendar.lunar_date(date).unwrap();
///
/// assert_eq!((1999, Common(11), 25), (lunar.year, lunar.month, lunar.day));
/// ```
#[derive(Debug)]
pub struct Calendar<E = Analytic> {
    config: CalendarConfig,
    ephemeris: E,
    solar_terms_cache: YearCache<Vec<SolarTerm>>,
    months_cache: YearCache<Vec<MonthRecord>>,
}

impl Calendar<Analytic> {
    /// 以內置解析曆表建立上下文。
    ///
    /// # Errors
    ///
    /// 配置無效時返回 [`InvalidConfig`](CalendarError::InvalidConfig)。
    pub fn new(config: CalendarConfig) -> Result<Self> {
        Self::with_ephemeris(config, Analytic)
    }
}

impl<E: Ephemeris> Calendar<E> {
    /// 以指定曆表建立上下文。
    ///
    /// # Errors
    ///
    /// 配置無效時返回 [`InvalidConfig`](CalendarError::InvalidConfig)。
    pub fn with_ephemeris(config: CalendarConfig, ephemeris: E) -> Result<Self> {
        config.validate()?;
        let capacity = config.cache_capacity();
        Ok(Self {
            config,
            ephemeris,
            solar_terms_cache: YearCache::new(capacity),
            months_cache: YearCache::new(capacity),
        })
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    /// 取得時刻在所配置時區的日期。
    pub fn civil_date(&self, instant: Ut) -> Date {
        instant.date_in_timezone(self.utc_offset())
    }

    /// 取得給定日期的夏曆年月日。
    ///
    /// 年為正月所在的公元年，十一、十二月若在冬至前後跨年，仍屬上一年。
    ///
    /// # 用例
    ///
    /// ```
    /// use nongli::{Calendar, CalendarConfig, Date};
    /// use nongli::chinese::Month::*;
    ///
    /// let calendar = Calendar::new(CalendarConfig::default()).unwrap();
    /// let lunar = calendar
    ///     .lunar_date(Date::from_gregorian(2017, 7, 23).unwrap())
    ///     .unwrap();
    ///
    /// assert_eq!((2017, Leap(6), 1), (lunar.year, lunar.month, lunar.day));
    /// assert_eq!("2017年閏六月初一", lunar.to_string());
    /// ```
    ///
    /// # Errors
    ///
    /// 同 [`months`](Calendar::months)。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn lunar_date(&self, date: Date) -> Result<LunarDate> {
        let (year, _, _) = date.gregorian();
        let mut span_year = year;
        let mut records = self.months(span_year)?;
        if records.last().is_some_and(|last| date >= last.next_start) {
            span_year += 1;
            records = self.months(span_year)?;
        }
        let record = records
            .iter()
            .find(|record| record.contains(date))
            .ok_or_else(|| self.invalid_year(year))?;
        let year = if record.number >= 10 { span_year - 1 } else { span_year };
        Ok(LunarDate {
            year,
            month: record.month(),
            day: (date - record.start) as u32 + 1,
        })
    }

    pub(crate) fn utc_offset(&self) -> i32 {
        self.config.utc_offset_minutes()
    }

    /// 確認 `years` 全在曆表支持範圍內。
    fn require_years(&self, years: RangeInclusive<i32>) -> Result<()> {
        let supported = self.ephemeris.supported_years();
        match [*years.start(), *years.end()]
            .into_iter()
            .find(|year| !supported.contains(year))
        {
            Some(year) => Err(self.invalid_year(year)),
            None => Ok(()),
        }
    }

    fn invalid_year(&self, year: i32) -> CalendarError {
        let supported = self.ephemeris.supported_years();
        CalendarError::InvalidYear {
            year,
            min: *supported.start(),
            max: *supported.end(),
        }
    }
}

/// 月名，`Common` 為平月，`Leap` 為閏月。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Month {
    Common(u32),
    Leap(u32),
}
impl Month {
    /// 取得月序號，無論平閏。
    pub fn num(&self) -> u32 {
        use Month::*;
        *match self {
            Common(v) | Leap(v) => v,
        }
    }
    /// 閏月為 `true`，平月為 `false`
    pub fn is_leap(&self) -> bool {
        matches!(self, Self::Leap(_))
    }
    /// 取得月名的文本形式，閏月冠以「閏」。
    pub fn name(&self) -> String {
        fmt::month(*self)
    }
}

/// 夏曆日期。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LunarDate {
    /// 正月所在的公元年
    pub year: i32,
    pub month: Month,
    /// `1..=30`
    pub day: u32,
}

impl LunarDate {
    /// 年干支，如「甲辰」。
    pub fn year_name(&self) -> String {
        fmt::sexagenary(sexagenary_for_year(self.year))
    }
}

impl std_fmt::Display for LunarDate {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        write!(f, "{}年{}{}", self.year, self.month.name(), fmt::day(self.day))
    }
}

/// 取得所給公元年的干支。
///
/// # 用例
///
/// ```
/// use nongli::chinese::{self, sexagenary_for_year};
///
/// assert_eq!(1, sexagenary_for_year(-2696));
/// assert_eq!("甲辰", chinese::fmt::sexagenary(sexagenary_for_year(2024)));
/// ```
pub fn sexagenary_for_year(year: i32) -> u32 {
    (year.rem_euclid(60) as u32 + 2696) % 60 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> Calendar {
        Calendar::new(CalendarConfig::default()).unwrap()
    }

    #[test]
    fn months() {
        let months = calendar().months(2000).unwrap();
        let stds = [
            (11, "1999-12-08"),
            (12, "2000-01-07"),
            (1, "2000-02-05"),
            (2, "2000-03-06"),
            (3, "2000-04-05"),
            (4, "2000-05-04"),
            (5, "2000-06-02"),
            (6, "2000-07-02"),
            (7, "2000-07-31"),
            (8, "2000-08-29"),
            (9, "2000-09-28"),
            (10, "2000-10-27"),
        ];
        assert_eq!(stds.len(), months.len());
        for (std, month) in stds.iter().zip(months.iter()) {
            assert_eq!(Month::Common(std.0), month.month());
            assert_eq!(std.1, month.start.iso_gregorian());
        }
        assert_eq!("2000-11-26", months[11].next_start.iso_gregorian());
    }

    #[test]
    fn leap_months() {
        let stds = [
            (11, "2016-11-29"),
            (12, "2016-12-29"),
            (1, "2017-01-28"),
            (2, "2017-02-26"),
            (3, "2017-03-28"),
            (4, "2017-04-26"),
            (5, "2017-05-26"),
            (6, "2017-06-24"),
            (-6, "2017-07-23"),
            (7, "2017-08-22"),
            (8, "2017-09-20"),
            (9, "2017-10-20"),
            (10, "2017-11-18"),
        ];
        let months = calendar().months(2017).unwrap();
        for (std, month) in stds.iter().zip(months.iter()) {
            let std_month = if std.0 > 0 {
                Month::Common(std.0 as u32)
            } else {
                Month::Leap(-std.0 as u32)
            };
            assert_eq!(
                (std_month, std.1.into()),
                (month.month(), month.start.iso_gregorian())
            );
        }
        assert_eq!(stds.len(), months.len());
        assert_eq!("2017-12-18", months[12].next_start.iso_gregorian());
    }

    #[test]
    fn dates() {
        use Month::*;
        let data = [
            ((2016, 11, 29), (2016, Common(11), 1)),
            ((2017, 1, 27), (2016, Common(12), 30)),
            ((2017, 1, 28), (2017, Common(1), 1)),
            ((2017, 7, 22), (2017, Common(6), 29)),
            ((2017, 7, 23), (2017, Leap(6), 1)),
            ((2017, 12, 17), (2017, Common(10), 30)),
            ((2017, 12, 18), (2017, Common(11), 1)),
            ((2000, 1, 1), (1999, Common(11), 25)),
        ];
        let calendar = calendar();
        for ((y, m, d), (year, month, day)) in data {
            let lunar = calendar
                .lunar_date(Date::from_gregorian(y, m, d).unwrap())
                .unwrap();
            assert_eq!(LunarDate { year, month, day }, lunar, "{y}-{m}-{d}");
        }
    }

    #[test]
    fn out_of_range() {
        let calendar = calendar();
        assert_eq!(
            Err(CalendarError::InvalidYear {
                year: 1699,
                min: 1700,
                max: 2200
            }),
            calendar.months(1700).map(|_| ())
        );
        assert_eq!(
            Err(CalendarError::InvalidYear {
                year: 2201,
                min: 1700,
                max: 2200
            }),
            calendar.build(2200).map(|_| ())
        );
        assert_eq!(0, calendar.solar_terms_cache.len());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = CalendarConfig::new().with_cache_capacity(0);
        assert!(matches!(
            Calendar::new(config),
            Err(CalendarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn lunar_date_display() {
        let lunar = LunarDate {
            year: 2024,
            month: Month::Common(1),
            day: 1,
        };
        assert_eq!("2024年正月初一", lunar.to_string());
        assert_eq!("甲辰", lunar.year_name());
    }

    #[test]
    fn year_sexagenary() {
        for (std, year) in [(60, -2697), (1, -2696), (17, 2000)] {
            assert_eq!(std, sexagenary_for_year(year));
        }
    }

    /// 月相正常而太陽停滯，節氣搜索必然失敗。
    struct NoSun;

    impl Ephemeris for NoSun {
        fn supported_years(&self) -> RangeInclusive<i32> {
            Analytic.supported_years()
        }

        fn sun_longitude(&self, _tt: crate::time_scales::Tt) -> f64 {
            42.0
        }

        fn moon_phase(&self, tt: crate::time_scales::Tt) -> f64 {
            Analytic.moon_phase(tt)
        }
    }

    #[test]
    fn failures_leave_caches_empty() {
        let calendar = Calendar::with_ephemeris(CalendarConfig::default(), NoSun).unwrap();
        assert!(matches!(
            calendar.months(2000),
            Err(CalendarError::EphemerisNotFound { .. })
        ));
        assert_eq!(0, calendar.solar_terms_cache.len());
        assert_eq!(0, calendar.months_cache.len());
    }

    #[test]
    fn caches_are_bounded() {
        let config = CalendarConfig::new().with_cache_capacity(2);
        let calendar = Calendar::new(config).unwrap();
        for year in 2000..2004 {
            calendar.solar_terms(year).unwrap();
        }
        assert_eq!(2, calendar.solar_terms_cache.len());
    }

    #[test]
    fn calendar_is_shareable() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<Calendar>();
    }
}
