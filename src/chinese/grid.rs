//! 曆面：按年拼接各月，並把每月展開為以週為行的日格。

use super::months::{Event, EventKind, MonthRecord};
use super::{Calendar, Month, fmt};
use crate::date::Date;
use crate::ephemeris::Ephemeris;
use crate::error::Result;

/// 傳統節日，只在平月。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Festival {
    /// 正月初一
    SpringFestival,
    /// 正月十五
    Lantern,
    /// 五月初五
    DragonBoat,
    /// 七月初七
    Qixi,
    /// 七月十五
    Ghost,
    /// 八月十五
    MidAutumn,
    /// 九月初九
    DoubleNinth,
    /// 十二月初八
    Laba,
    /// 十二月最末日
    NewYearsEve,
}

impl Festival {
    /// 取得某月某日的節日。`days_in_month` 用於確定除夕。
    ///
    /// ```
    /// use nongli::chinese::{Festival, Month::*};
    ///
    /// assert_eq!(Some(Festival::MidAutumn), Festival::on(Common(8), 15, 30));
    /// assert_eq!(Some(Festival::NewYearsEve), Festival::on(Common(12), 29, 29));
    /// assert_eq!(None, Festival::on(Leap(8), 15, 30));
    /// ```
    pub fn on(month: Month, day: u32, days_in_month: u32) -> Option<Self> {
        use Festival::*;
        let Month::Common(m) = month else {
            return None;
        };
        match (m, day) {
            (1, 1) => Some(SpringFestival),
            (1, 15) => Some(Lantern),
            (5, 5) => Some(DragonBoat),
            (7, 7) => Some(Qixi),
            (7, 15) => Some(Ghost),
            (8, 15) => Some(MidAutumn),
            (9, 9) => Some(DoubleNinth),
            (12, 8) => Some(Laba),
            (12, d) if d == days_in_month => Some(NewYearsEve),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        fmt::festival(self)
    }
}

/// 月大小。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MonthSize {
    /// 小月，29 日
    Small,
    /// 大月，30 日
    Big,
}

impl MonthSize {
    pub fn name(self) -> &'static str {
        match self {
            MonthSize::Small => "小",
            MonthSize::Big => "大",
        }
    }
}

/// 曆面上的一日。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DayCell {
    /// 在本月中的序號，月首為 0
    pub index: u32,
    /// 日名，如「初一」「廿五」
    pub name: &'static str,
    pub events: Vec<EventKind>,
    pub date: Date,
}

/// 曆面上的一月。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CalendarMonth {
    /// 月名，如「閏二月」
    pub name: String,
    pub month: Month,
    /// 每行七格，週一在前；首行前及末行後以 `None` 補齊
    pub weeks: Vec<[Option<DayCell>; 7]>,
    pub size: MonthSize,
    pub events: Vec<Event>,
    pub start: Date,
    pub next_start: Date,
}

impl CalendarMonth {
    /// 依次列出本月各日。
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten().flatten()
    }
}

/// 把一月展開為日格。
pub(crate) fn expand(record: &MonthRecord, tz: i32) -> CalendarMonth {
    let month = record.month();
    let count = record.days();
    let size = if count >= 30 {
        MonthSize::Big
    } else {
        MonthSize::Small
    };

    // 事件已按時刻排列，逐日前移即可
    let mut pending = record.events.iter().peekable();
    let days: Vec<DayCell> = (0..count)
        .map(|offset| {
            let date = record.start + offset;
            let mut events = Vec::new();
            while let Some(event) = pending.next_if(|e| e.instant.date_in_timezone(tz) <= date) {
                events.push(event.kind);
            }
            let day = offset as u32 + 1;
            if let Some(festival) = Festival::on(month, day, count as u32) {
                events.push(EventKind::Festival(festival));
            }
            DayCell {
                index: offset as u32,
                name: fmt::day(day),
                events,
                date,
            }
        })
        .collect();

    CalendarMonth {
        name: fmt::month(month),
        month,
        weeks: weeks(days, record.start.day_of_week()),
        size,
        events: record.events.clone(),
        start: record.start,
        next_start: record.next_start,
    }
}

/// 按週分行，`first_weekday` 為首日的星期（週一為 1）。
fn weeks(days: Vec<DayCell>, first_weekday: u32) -> Vec<[Option<DayCell>; 7]> {
    let lead = first_weekday.saturating_sub(1) as usize;
    let mut cells = std::iter::repeat_with(|| None)
        .take(lead)
        .chain(days.into_iter().map(Some))
        .peekable();
    let mut rows = Vec::with_capacity(6);
    while cells.peek().is_some() {
        rows.push(std::array::from_fn(|_| cells.next().flatten()));
    }
    rows
}

impl<E: Ephemeris> Calendar<E> {
    /// 編排公元 `year` 年的曆面，自正月至十二月，含其間閏月。
    ///
    /// 正月至十月取自 [`months(year)`](Calendar::months)，十一、十二月取自 `months(year + 1)`。
    ///
    /// # 用例
    ///
    /// ```
    /// use nongli::{Calendar, CalendarConfig};
    ///
    /// let calendar = Calendar::new(CalendarConfig::default()).unwrap();
    /// let months = calendar.build(2024).unwrap();
    ///
    /// assert_eq!(12, months.len());
    /// assert_eq!("正月", months[0].name);
    /// assert_eq!("2024-02-10", months[0].start.iso_gregorian());
    /// let first = months[0].days().next().unwrap();
    /// assert_eq!("初一", first.name);
    /// ```
    ///
    /// # Errors
    ///
    /// 同 [`months`](Calendar::months)，涉及 `year - 1` 至 `year + 1` 三年。
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn build(&self, year: i32) -> Result<Vec<CalendarMonth>> {
        self.require_years(year - 1..=year + 1)?;
        let current = self.months(year)?;
        let next = self.months(year + 1)?;
        let tz = self.utc_offset();
        Ok(current
            .iter()
            .filter(|record| record.number < 10)
            .chain(next.iter().filter(|record| record.number >= 10))
            .map(|record| expand(record, tz))
            .collect())
    }
}
