//! Integration tests against published almanac data (Purple Mountain
//! Observatory tables, UTC+8).

use std::ops::RangeInclusive;
use std::sync::Arc;

use nongli::chinese::{EventKind, Festival, Month, MonthSize};
use nongli::ephemeris::{Analytic, Body, Ephemeris};
use nongli::time_scales::Tt;
use nongli::{Calendar, CalendarConfig, CalendarError, Date};
use proptest::prelude::*;

fn calendar() -> Calendar {
    Calendar::new(CalendarConfig::default()).unwrap()
}

fn names_and_starts(calendar: &Calendar, year: i32) -> Vec<(String, String)> {
    calendar
        .build(year)
        .unwrap()
        .iter()
        .map(|m| (m.name.clone(), m.start.iso_gregorian()))
        .collect()
}

fn date(y: i32, m: i32, d: i32) -> Date {
    Date::from_gregorian(y, m, d).unwrap()
}

#[test]
fn year_2023_has_leap_second_month() {
    let calendar = calendar();
    let months = calendar.build(2023).unwrap();
    let stds = [
        ("正月", "2023-01-22", MonthSize::Small),
        ("二月", "2023-02-20", MonthSize::Big),
        ("閏二月", "2023-03-22", MonthSize::Small),
        ("三月", "2023-04-20", MonthSize::Small),
        ("四月", "2023-05-19", MonthSize::Big),
        ("五月", "2023-06-18", MonthSize::Big),
        ("六月", "2023-07-18", MonthSize::Small),
        ("七月", "2023-08-16", MonthSize::Big),
        ("八月", "2023-09-15", MonthSize::Big),
        ("九月", "2023-10-15", MonthSize::Small),
        ("十月", "2023-11-13", MonthSize::Big),
        ("十一月", "2023-12-13", MonthSize::Small),
        ("十二月", "2024-01-11", MonthSize::Big),
    ];
    assert_eq!(stds.len(), months.len());
    for ((name, start, size), month) in stds.iter().zip(&months) {
        assert_eq!(
            (*name, *start, *size),
            (month.name.as_str(), month.start.iso_gregorian().as_str(), month.size)
        );
    }
    assert_eq!(1, months.iter().filter(|m| m.month.is_leap()).count());

    // 閏月不含中氣
    let leap = &months[2];
    assert_eq!(Month::Leap(2), leap.month);
    for event in &leap.events {
        if let EventKind::SolarTerm(index) = event.kind {
            assert_eq!(1, index % 2, "{}", event.kind.name());
        }
    }
}

#[test]
fn year_2024() {
    let calendar = calendar();
    let months = calendar.build(2024).unwrap();
    let stds = [
        ("2024-02-10", 29),
        ("2024-03-10", 30),
        ("2024-04-09", 29),
        ("2024-05-08", 29),
        ("2024-06-06", 30),
        ("2024-07-06", 29),
        ("2024-08-04", 30),
        ("2024-09-03", 30),
        ("2024-10-03", 29),
        ("2024-11-01", 30),
        ("2024-12-01", 30),
        ("2024-12-31", 29),
    ];
    assert_eq!(stds.len(), months.len());
    for (i, ((start, days), month)) in stds.iter().zip(&months).enumerate() {
        assert_eq!(Month::Common(i as u32 + 1), month.month);
        assert_eq!(*start, month.start.iso_gregorian());
        assert_eq!(*days, month.next_start - month.start);
    }
}

#[test]
fn leap_months() {
    let calendar = calendar();
    for (year, name, start) in [
        (2017, "閏六月", "2017-07-23"),
        (2020, "閏四月", "2020-05-23"),
        (2025, "閏六月", "2025-07-25"),
        (2033, "閏十一月", "2033-12-22"),
    ] {
        let months = names_and_starts(&calendar, year);
        assert_eq!(13, months.len(), "{year}");
        assert!(months.contains(&(name.to_owned(), start.to_owned())), "{year}: {months:?}");
    }
}

#[test]
fn eleventh_leap_month_follows_solstice_year() {
    // 閏十一月屬 2034 歲的月編排，歲 2033 仍只有 13 個週期
    let calendar = calendar();
    assert_eq!(13, calendar.build(2033).unwrap().len());
    assert_eq!(13, calendar.lunar_phases(2033).unwrap().len());
    let months = calendar.months(2034).unwrap();
    assert_eq!(13, months.len());
    assert_eq!(Month::Leap(11), months[1].month());
    assert_eq!(12, calendar.build(2034).unwrap().len());
}

#[test]
fn festivals_of_2024() {
    let calendar = calendar();
    let months = calendar.build(2024).unwrap();
    let festival_dates: Vec<_> = months
        .iter()
        .flat_map(|m| m.days())
        .flat_map(|day| {
            day.events.iter().filter_map(move |kind| match kind {
                EventKind::Festival(f) => Some((*f, day.date.iso_gregorian())),
                _ => None,
            })
        })
        .collect();
    let stds = [
        (Festival::SpringFestival, "2024-02-10"),
        (Festival::Lantern, "2024-02-24"),
        (Festival::DragonBoat, "2024-06-10"),
        (Festival::Qixi, "2024-08-10"),
        (Festival::Ghost, "2024-08-18"),
        (Festival::MidAutumn, "2024-09-17"),
        (Festival::DoubleNinth, "2024-10-11"),
        (Festival::Laba, "2025-01-07"),
        (Festival::NewYearsEve, "2025-01-28"),
    ];
    assert_eq!(
        stds.iter()
            .map(|&(f, d)| (f, d.to_owned()))
            .collect::<Vec<_>>(),
        festival_dates
    );
}

#[test]
fn grid_covers_every_day_once() {
    let calendar = calendar();
    let months = calendar.build(2023).unwrap();
    let mut expected = months[0].start;
    for month in &months {
        for row in &month.weeks {
            for (col, cell) in row.iter().enumerate() {
                if let Some(cell) = cell {
                    assert_eq!(expected, cell.date);
                    assert_eq!(col as u32 + 1, cell.date.day_of_week());
                    expected = expected + 1;
                }
            }
        }
        assert_eq!(month.next_start, expected);
    }
}

#[test]
fn day_names() {
    let calendar = calendar();
    let months = calendar.build(2024).unwrap();
    let days: Vec<_> = months[1].days().collect();
    for (offset, name) in [(0, "初一"), (9, "初十"), (10, "十一"), (19, "二十"), (20, "廿一"), (29, "三十")] {
        assert_eq!(name, days[offset].name);
        assert_eq!(offset as u32, days[offset].index);
    }
}

#[test]
fn lunar_dates_agree_with_grid() {
    let calendar = calendar();
    for month in calendar.build(2023).unwrap() {
        for day in month.days() {
            let lunar = calendar.lunar_date(day.date).unwrap();
            assert_eq!(
                (2023, month.month, day.index + 1),
                (lunar.year, lunar.month, lunar.day),
                "{}",
                day.date
            );
        }
    }
}

#[test]
fn lunar_date_near_solstice() {
    let calendar = calendar();
    let lunar = calendar.lunar_date(date(2000, 1, 1)).unwrap();
    assert_eq!("1999年十一月廿五", lunar.to_string());
    assert_eq!("己卯", lunar.year_name());
    let lunar = calendar.lunar_date(date(2024, 12, 31)).unwrap();
    assert_eq!((2024, Month::Common(12), 1), (lunar.year, lunar.month, lunar.day));
}

#[test]
fn solar_terms_are_cached() {
    let calendar = calendar();
    let first = calendar.solar_terms(2024).unwrap();
    let second = calendar.solar_terms(2024).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
    assert_eq!("2024-12-21", calendar.civil_date(first[18].instant).iso_gregorian());
}

#[test]
fn independent_calendars_agree() {
    let a = calendar().months(1990).unwrap();
    let b = calendar().months(1990).unwrap();
    assert_eq!(a, b);
}

#[test]
fn years_outside_ephemeris() {
    let calendar = calendar();
    assert_eq!(
        Some(CalendarError::InvalidYear {
            year: 1699,
            min: 1700,
            max: 2200,
        }),
        calendar.build(1700).err()
    );
    assert!(matches!(
        calendar.lunar_date(date(2250, 1, 1)),
        Err(CalendarError::InvalidYear { year: 2249, .. })
    ));
}

#[test]
fn other_timezone() {
    // UTC+9 只移動少數跨午夜的朔日，結構不變
    let config = CalendarConfig::new().with_utc_offset_minutes(540);
    let calendar = Calendar::new(config).unwrap();
    let months = calendar.build(2024).unwrap();
    assert_eq!(12, months.len());
    assert!(months.iter().all(|m| (29..=30).contains(&(m.next_start - m.start))));
}

/// Sun that never moves: every solar-term search fails.
#[derive(Debug)]
struct Stalled;

impl Ephemeris for Stalled {
    fn supported_years(&self) -> RangeInclusive<i32> {
        1900..=2100
    }

    fn sun_longitude(&self, _tt: Tt) -> f64 {
        100.0
    }

    fn moon_phase(&self, tt: Tt) -> f64 {
        Analytic.moon_phase(tt)
    }
}

#[test]
fn ephemeris_failure_propagates() {
    let calendar = Calendar::with_ephemeris(CalendarConfig::default(), Stalled).unwrap();
    let err = calendar.build(2000).unwrap_err();
    assert!(matches!(
        err,
        CalendarError::EphemerisNotFound {
            body: Body::Sun,
            target_deg: 0.0,
            ..
        }
    ));
    // 失敗不緩存，重試得同一錯誤
    assert_eq!(err, calendar.build(2000).unwrap_err());
    assert!(matches!(
        calendar.build(2101),
        Err(CalendarError::InvalidYear { year: 2102, .. })
    ));
}

#[cfg(feature = "serde")]
#[test]
fn serialize_month() {
    let calendar = calendar();
    let months = calendar.build(2023).unwrap();
    let json = serde_json::to_value(&months[2]).unwrap();
    assert_eq!("閏二月", json["name"]);
    assert_eq!("2023-03-22", json["start"]);
    assert_eq!("Small", json["size"]);
    assert_eq!("初一", json["weeks"][0][2]["name"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn built_years_are_well_formed(year in 1701i32..2199) {
        let calendar = calendar();
        let months = calendar.build(year).unwrap();
        let leaps = months.iter().filter(|m| m.month.is_leap()).count();
        prop_assert!(months.len() == 12 || months.len() == 13);
        prop_assert_eq!(months.len() == 13, leaps == 1);

        let commons: Vec<u32> = months
            .iter()
            .filter(|m| !m.month.is_leap())
            .map(|m| m.month.num())
            .collect();
        prop_assert_eq!((1..=12).collect::<Vec<u32>>(), commons);
        for pair in months.windows(2) {
            prop_assert_eq!(pair[0].next_start, pair[1].start);
            if pair[1].month.is_leap() {
                prop_assert_eq!(pair[0].month.num(), pair[1].month.num());
            }
        }

        let lengths: Vec<i32> = months.iter().map(|m| m.next_start - m.start).collect();
        prop_assert!(lengths.iter().all(|d| *d == 29 || *d == 30));
        let mean = f64::from(lengths.iter().sum::<i32>()) / lengths.len() as f64;
        prop_assert!((mean - 29.53).abs() <= 0.3, "mean {}", mean);

        // 月編排有 13 個月當且僅當兩冬至間有 14 個週期
        let records = calendar.months(year).unwrap();
        let cycles = calendar.lunar_phases(year).unwrap();
        prop_assert_eq!(records.len() + 1, cycles.len());
        prop_assert_eq!(records.len() == 13, records.iter().any(|r| r.is_leap));
    }
}
