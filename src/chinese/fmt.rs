//! 格式化曆法名稱：月名、日名、節氣、月相、節日、干支。

use super::{Festival, Month, Phase};

/// 月序名，`0..=11` 為正月至十二月。
const MONTH_NAMES: [&str; 12] = [
    "正", "二", "三", "四", "五", "六", "七", "八", "九", "十", "十一", "十二",
];

/// 日名表，第 `0..30` 項為初一至三十。
pub const DAY_NAMES: [&str; 30] = [
    "初一", "初二", "初三", "初四", "初五", "初六", "初七", "初八", "初九", "初十", "十一",
    "十二", "十三", "十四", "十五", "十六", "十七", "十八", "十九", "二十", "廿一", "廿二",
    "廿三", "廿四", "廿五", "廿六", "廿七", "廿八", "廿九", "三十",
];

/// 節氣名，以春分為 0，每 15° 一項，冬至為 18。
const SOLAR_TERM_NAMES: [&str; 24] = [
    "春分", "清明", "穀雨", "立夏", "小滿", "芒種", "夏至", "小暑", "大暑", "立秋", "處暑",
    "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒", "立春",
    "雨水", "驚蟄",
];

/// 干支序號轉為文本形式。
///
/// # 用例
///
/// ```
/// use nongli::chinese;
///
/// assert_eq!("乙巳", chinese::fmt::sexagenary(42));
/// ```
pub fn sexagenary(num: u32) -> String {
    static NAME1: &[&str] = &["癸", "甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬"];
    static NAME2: &[&str] = &[
        "亥", "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌",
    ];
    NAME1[(num % 10) as usize].to_owned() + NAME2[(num % 12) as usize]
}

/// 取得月名（含「月」字），閏月冠以「閏」。
///
/// # 用例
///
/// ```
/// use nongli::chinese::{self, Month::*};
///
/// assert_eq!("十一月", chinese::fmt::month(Common(11)));
/// assert_eq!("閏二月", chinese::fmt::month(Leap(2)));
/// ```
///
/// # Panics
///
/// 若月序號不在 `1..=12` 間則 panic。
pub fn month(m: Month) -> String {
    let num = m.num();
    assert!((1..=12).contains(&num), "month {} not in 1..=12", num);
    let prefix = if m.is_leap() { "閏" } else { "" };
    format!("{prefix}{}月", MONTH_NAMES[num as usize - 1])
}

/// 取得日名，前十日為「初一」到「初十」，第 21 至 29 日為「廿一」到「廿九」。
///
/// # 用例
///
/// ```
/// use nongli::chinese;
///
/// assert_eq!("初十", chinese::fmt::day(10));
/// assert_eq!("廿五", chinese::fmt::day(25));
/// assert_eq!("三十", chinese::fmt::day(30));
/// ```
///
/// # Panics
///
/// 若日序號不在 `1..=30` 間則 panic。
pub fn day(d: u32) -> &'static str {
    match d {
        1..=30 => DAY_NAMES[d as usize - 1],
        _ => panic!("day {} not in 1..=30", d),
    }
}

/// 節氣序號轉為名稱，`0..24` 自春分起算。
///
/// # 用例
///
/// ```
/// use nongli::chinese;
///
/// assert_eq!("穀雨", chinese::fmt::solar_term(2));
/// assert_eq!("冬至", chinese::fmt::solar_term(18));
/// ```
pub fn solar_term(index: u32) -> &'static str {
    SOLAR_TERM_NAMES[(index % 24) as usize]
}

/// 月相名稱。
pub fn phase(phase: Phase) -> &'static str {
    match phase {
        Phase::NewMoon => "朔",
        Phase::FirstQuarter => "上弦",
        Phase::FullMoon => "望",
        Phase::LastQuarter => "下弦",
    }
}

/// 節日名稱。
///
/// ```
/// use nongli::chinese::{self, Festival};
///
/// assert_eq!("中秋", chinese::fmt::festival(Festival::MidAutumn));
/// ```
pub fn festival(festival: Festival) -> &'static str {
    match festival {
        Festival::SpringFestival => "春節",
        Festival::Lantern => "元宵",
        Festival::DragonBoat => "端午",
        Festival::Qixi => "七夕",
        Festival::Ghost => "中元",
        Festival::MidAutumn => "中秋",
        Festival::DoubleNinth => "重陽",
        Festival::Laba => "臘八",
        Festival::NewYearsEve => "除夕",
    }
}
