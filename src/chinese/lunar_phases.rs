//! 月相週期：自朔至下弦，覆蓋相鄰兩冬至之間。

use super::solar_terms::WINTER_SOLSTICE;
use super::{Calendar, fmt};
use crate::date::Date;
use crate::ephemeris::Ephemeris;
use crate::error::{CalendarError, Result};
use crate::time_scales::Ut;

/// 首次搜索朔的窗口長度（日），起點在前一冬至前 30 日。
const FIRST_SEARCH_DAYS: f64 = 30.0;
/// 依次搜索弦望及下一朔的窗口長度（日）。
const CHAINED_SEARCH_DAYS: f64 = 10.0;

/// 月相
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Phase {
    /// 朔
    NewMoon,
    /// 上弦
    FirstQuarter,
    /// 望
    FullMoon,
    /// 下弦
    LastQuarter,
}

impl Phase {
    /// 月日黃經差，單位為度。
    pub fn angle(self) -> f64 {
        match self {
            Phase::NewMoon => 0.0,
            Phase::FirstQuarter => 90.0,
            Phase::FullMoon => 180.0,
            Phase::LastQuarter => 270.0,
        }
    }

    pub fn name(self) -> &'static str {
        fmt::phase(self)
    }
}

/// 一個朔望週期的四個月相時刻。
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PhaseCycle {
    /// 朔所在的民用日
    pub new_moon_day: Date,
    pub new_moon: Ut,
    pub first_quarter: Ut,
    pub full_moon: Ut,
    pub last_quarter: Ut,
}

impl PhaseCycle {
    /// 依時間順序列出四個月相。
    pub fn phases(&self) -> [(Phase, Ut); 4] {
        [
            (Phase::NewMoon, self.new_moon),
            (Phase::FirstQuarter, self.first_quarter),
            (Phase::FullMoon, self.full_moon),
            (Phase::LastQuarter, self.last_quarter),
        ]
    }
}

impl<E: Ephemeris> Calendar<E> {
    /// 取得自前一冬至所在月起、至 `year` 年冬至所在月止的朔望週期。
    ///
    /// 結果有 13 或 14 個週期，末一週期的朔即 `year` 年冬至所在月的首日。
    /// 本方法不緩存。
    ///
    /// # 用例
    ///
    /// ```
    /// use nongli::{Calendar, CalendarConfig};
    ///
    /// let calendar = Calendar::new(CalendarConfig::default()).unwrap();
    /// let cycles = calendar.lunar_phases(2000).unwrap();
    ///
    /// assert_eq!(13, cycles.len());
    /// assert_eq!("1999-12-08", cycles[0].new_moon_day.iso_gregorian());
    /// assert_eq!("2000-11-26", cycles[12].new_moon_day.iso_gregorian());
    /// ```
    ///
    /// # Errors
    ///
    /// 曆表搜索失敗時返回 [`EphemerisNotFound`](CalendarError::EphemerisNotFound)，
    /// 週期數不為 13 或 14 時返回 [`CycleCount`](CalendarError::CycleCount)。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn lunar_phases(&self, year: i32) -> Result<Vec<PhaseCycle>> {
        self.require_years(year - 1..=year)?;
        let prior = self.solar_terms(year - 1)?[WINTER_SOLSTICE].instant;
        let current = self.solar_terms(year)?[WINTER_SOLSTICE].instant;
        let prior_day = self.civil_date(prior);
        let current_day = self.civil_date(current);

        let eph = &self.ephemeris;
        let mut cycles = Vec::with_capacity(15);
        let mut new_moon =
            eph.find_moon_phase(Phase::NewMoon.angle(), prior - 30.0, FIRST_SEARCH_DAYS)?;
        loop {
            let new_moon_day = self.civil_date(new_moon);
            if new_moon_day > current_day {
                break;
            }
            let first_quarter =
                eph.find_moon_phase(Phase::FirstQuarter.angle(), new_moon, CHAINED_SEARCH_DAYS)?;
            let full_moon =
                eph.find_moon_phase(Phase::FullMoon.angle(), first_quarter, CHAINED_SEARCH_DAYS)?;
            let last_quarter =
                eph.find_moon_phase(Phase::LastQuarter.angle(), full_moon, CHAINED_SEARCH_DAYS)?;
            cycles.push(PhaseCycle {
                new_moon_day,
                new_moon,
                first_quarter,
                full_moon,
                last_quarter,
            });
            new_moon = eph.find_moon_phase(Phase::NewMoon.angle(), last_quarter, CHAINED_SEARCH_DAYS)?;
        }

        let cycles = trim_before_solstice(cycles, prior_day);
        let count = cycles.len();
        tracing::debug!(year, count, "lunar phase cycles");
        if !(13..=14).contains(&count) {
            return Err(CalendarError::CycleCount { year, count });
        }
        Ok(cycles)
    }
}

/// 保留前一冬至所在月（朔日不晚於冬至日的最後一個週期）及其後各週期。
fn trim_before_solstice(mut cycles: Vec<PhaseCycle>, solstice_day: Date) -> Vec<PhaseCycle> {
    let first_after = cycles
        .iter()
        .position(|cycle| cycle.new_moon_day > solstice_day)
        .unwrap_or(cycles.len());
    cycles.drain(..first_after.saturating_sub(1));
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CalendarConfig;

    fn cycle_on(y: i32, m: i32, d: i32) -> PhaseCycle {
        let day = Date::from_gregorian(y, m, d).unwrap();
        let new_moon = Ut::midnight(day, 480) + 0.5;
        PhaseCycle {
            new_moon_day: day,
            new_moon,
            first_quarter: new_moon + 7.4,
            full_moon: new_moon + 14.8,
            last_quarter: new_moon + 22.1,
        }
    }

    #[test]
    fn trim_keeps_solstice_month() {
        let cycles = vec![
            cycle_on(1999, 10, 9),
            cycle_on(1999, 11, 8),
            cycle_on(1999, 12, 8),
            cycle_on(2000, 1, 7),
        ];
        let solstice = Date::from_gregorian(1999, 12, 22).unwrap();
        let trimmed = trim_before_solstice(cycles, solstice);
        assert_eq!(2, trimmed.len());
        assert_eq!("1999-12-08", trimmed[0].new_moon_day.iso_gregorian());
    }

    #[test]
    fn trim_on_solstice_day() {
        // 朔與冬至同日，該月即冬至所在月
        let cycles = vec![cycle_on(2033, 11, 22), cycle_on(2033, 12, 22), cycle_on(2034, 1, 20)];
        let solstice = Date::from_gregorian(2033, 12, 22).unwrap();
        let trimmed = trim_before_solstice(cycles, solstice);
        assert_eq!("2033-12-22", trimmed[0].new_moon_day.iso_gregorian());
    }

    #[test]
    fn phases_in_order() {
        let calendar = Calendar::new(CalendarConfig::default()).unwrap();
        for cycle in calendar.lunar_phases(2023).unwrap() {
            let phases = cycle.phases();
            for pair in phases.windows(2) {
                let gap = pair[1].1 - pair[0].1;
                assert!((5.5..9.0).contains(&gap), "{gap}");
            }
            assert_eq!(cycle.new_moon_day, calendar.civil_date(cycle.new_moon));
        }
    }

    #[test]
    fn leap_year_has_fourteen_cycles() {
        let calendar = Calendar::new(CalendarConfig::default()).unwrap();
        assert_eq!(14, calendar.lunar_phases(2023).unwrap().len());
        assert_eq!(13, calendar.lunar_phases(2024).unwrap().len());
    }
}
