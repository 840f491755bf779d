//! 合併節氣與月相，定月序及閏月。
//!
//! 置閏用無中氣法：兩冬至間若有 13 個月，其中首個不含中氣的月為閏月，沿用前月月序。

use std::sync::Arc;

use super::grid::Festival;
use super::lunar_phases::{Phase, PhaseCycle};
use super::solar_terms::SolarTerm;
use super::{Calendar, Month};
use crate::date::Date;
use crate::ephemeris::Ephemeris;
use crate::error::Result;
use crate::time_scales::Ut;

/// 曆面事件類別。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventKind {
    Phase(Phase),
    /// 節氣序號，自春分起算
    SolarTerm(u32),
    Festival(Festival),
}

impl EventKind {
    /// 事件名稱，如「朔」「冬至」「中秋」。
    pub fn name(&self) -> &'static str {
        match *self {
            EventKind::Phase(phase) => phase.name(),
            EventKind::SolarTerm(index) => super::fmt::solar_term(index),
            EventKind::Festival(festival) => festival.name(),
        }
    }
}

/// 帶時刻的天文事件。
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event {
    pub kind: EventKind,
    pub instant: Ut,
}

/// 一個朔望月的編排結果。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MonthRecord {
    /// 月序，`0` 為正月，`11` 為十二月
    pub number: u32,
    pub is_leap: bool,
    /// 本月四個月相及落在本月的節氣，按時刻排列
    pub events: Vec<Event>,
    /// 月首（朔日）
    pub start: Date,
    /// 次月月首
    pub next_start: Date,
}

impl MonthRecord {
    pub fn month(&self) -> Month {
        if self.is_leap {
            Month::Leap(self.number + 1)
        } else {
            Month::Common(self.number + 1)
        }
    }

    /// 本月日數，29 或 30。
    pub fn days(&self) -> i32 {
        self.next_start - self.start
    }

    /// 日期在本月內為 `true`。
    pub fn contains(&self, date: Date) -> bool {
        (self.start..self.next_start).contains(&date)
    }
}

/// 置閏狀態。
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum LeapState {
    /// 本歲須置閏，尚未遇到無中氣之月
    Pending,
    /// 已置閏
    Assigned,
    /// 本歲只有 12 個月
    NotNeeded,
}

/// 逐月編排時傳遞的狀態。
#[derive(Debug, Copy, Clone)]
struct Fold {
    leap: LeapState,
    /// 平月計數，首月（冬至所在月）為 11
    counter: u32,
    /// 下一個未歸屬的節氣
    cursor: usize,
}

impl Fold {
    fn start(terms: &[SolarTerm], cycles: &[PhaseCycle], tz: i32) -> Self {
        let first_day = cycles.first().map(|c| c.new_moon_day);
        let cursor = terms
            .iter()
            .position(|term| Some(term.instant.date_in_timezone(tz)) >= first_day)
            .unwrap_or(terms.len());
        let leap = if cycles.len() == 14 {
            LeapState::Pending
        } else {
            LeapState::NotNeeded
        };
        Fold {
            leap,
            counter: 10,
            cursor,
        }
    }

    /// 編排 `this` 所在月，返回新狀態及月記錄。
    fn step(
        self,
        this: &PhaseCycle,
        next: &PhaseCycle,
        terms: &[SolarTerm],
        tz: i32,
    ) -> (Self, MonthRecord) {
        let mut events: Vec<Event> = this
            .phases()
            .iter()
            .map(|&(phase, instant)| Event {
                kind: EventKind::Phase(phase),
                instant,
            })
            .collect();

        let mut candidate = self.leap == LeapState::Pending;
        let mut cursor = self.cursor;
        while let Some(term) = terms.get(cursor) {
            if term.instant.date_in_timezone(tz) >= next.new_moon_day {
                break;
            }
            candidate &= !term.is_principal();
            events.push(Event {
                kind: EventKind::SolarTerm(term.index),
                instant: term.instant,
            });
            cursor += 1;
        }
        events.sort_by(|a, b| a.instant.0.total_cmp(&b.instant.0));

        let (leap, counter) = if candidate {
            tracing::debug!(
                start = %this.new_moon_day,
                number = (self.counter - 1) % 12,
                "leap month"
            );
            (LeapState::Assigned, self.counter)
        } else {
            (self.leap, self.counter + 1)
        };
        let record = MonthRecord {
            number: (counter - 1) % 12,
            is_leap: candidate,
            events,
            start: this.new_moon_day,
            next_start: next.new_moon_day,
        };
        (
            Fold {
                leap,
                counter,
                cursor,
            },
            record,
        )
    }
}

/// 以兩年的節氣（前一年接本年，共 48 個）及本歲月相週期編排各月。
///
/// 末一週期僅用以確定前一月的終點，故返回 `cycles.len() - 1` 個月。
pub(crate) fn assemble(terms: &[SolarTerm], cycles: &[PhaseCycle], tz: i32) -> Vec<MonthRecord> {
    let initial = Fold::start(terms, cycles, tz);
    let mut last = initial;
    let records: Vec<_> = cycles
        .windows(2)
        .scan(initial, |state, pair| {
            let (next, record) = state.step(&pair[0], &pair[1], terms, tz);
            *state = next;
            last = next;
            Some(record)
        })
        .collect();
    if last.leap == LeapState::Pending {
        tracing::warn!(
            first = ?cycles.first().map(|c| c.new_moon_day),
            "13 months without a month lacking a principal term"
        );
    }
    records
}

impl<E: Ephemeris> Calendar<E> {
    /// 取得冬至所在月起的各月編排，首月為 `year - 1` 年的十一月（或閏十月之後的十一月），
    /// 末月為 `year` 年冬至前一月。
    ///
    /// 結果按年緩存。
    ///
    /// # 用例
    ///
    /// ```
    /// use nongli::{Calendar, CalendarConfig};
    /// use nongli::chinese::Month::*;
    ///
    /// let calendar = Calendar::new(CalendarConfig::default()).unwrap();
    /// let months = calendar.months(2017).unwrap();
    ///
    /// assert_eq!(13, months.len());
    /// assert_eq!(Common(11), months[0].month());
    /// assert_eq!(Leap(6), months[8].month());
    /// assert_eq!("2017-07-23", months[8].start.iso_gregorian());
    /// ```
    ///
    /// # Errors
    ///
    /// 同 [`lunar_phases`](Calendar::lunar_phases)。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn months(&self, year: i32) -> Result<Arc<Vec<MonthRecord>>> {
        self.require_years(year - 1..=year)?;
        self.months_cache.get_or_try_insert_with(year, || {
            let prior = self.solar_terms(year - 1)?;
            let current = self.solar_terms(year)?;
            let terms: Vec<SolarTerm> = prior.iter().chain(current.iter()).copied().collect();
            let cycles = self.lunar_phases(year)?;
            Ok(assemble(&terms, &cycles, self.utc_offset()))
        })
    }
}
