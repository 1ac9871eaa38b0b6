use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Parses a `HH:MM` string into a time of day. Seconds are not accepted:
/// the wire format carries minutes only.
pub fn parse_time(time_str: &str) -> Option<NaiveTime> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Whether `time` survives a round trip through `HH:MM`
pub fn is_whole_minute(time: NaiveTime) -> bool {
    time.second() == 0 && time.nanosecond() == 0
}

/// Formats a time of day as HH:MM
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Formats a shift window label, e.g. `08:00–18:00`
pub fn format_window(start: NaiveTime, end: NaiveTime) -> String {
    format!("{}–{}", format_time(start), format_time(end))
}

/// Short weekday label used in grid headers
pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Serde adapter for optional `HH:MM` fields. Empty strings read as absent.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_some(&super::format_time(*time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_time(text).map(Some).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid time `{text}`, expected HH:MM"))
            }),
        }
    }
}

/// Number of days shown by the planning grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLength {
    Week,
    Fortnight,
}

impl ViewLength {
    pub fn days(self) -> u32 {
        match self {
            ViewLength::Week => 7,
            ViewLength::Fortnight => 15,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(ViewLength::Week),
            15 => Some(ViewLength::Fortnight),
            _ => None,
        }
    }
}

/// Contiguous range of dates rendered by the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewWindow {
    start: NaiveDate,
    end: NaiveDate,
    length: ViewLength,
}

impl ViewWindow {
    /// `None` when the window would run past the calendar's range
    pub fn new(start: NaiveDate, length: ViewLength) -> Option<Self> {
        let end = start.checked_add_signed(Duration::days(i64::from(length.days()) - 1))?;
        Some(Self { start, end, length })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the window (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn length(&self) -> ViewLength {
        self.length
    }

    /// All dates of the window in order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take(self.length.days() as usize)
            .collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The window immediately after this one, same length
    pub fn next(&self) -> Option<Self> {
        Self::new(self.end.succ_opt()?, self.length)
    }

    /// The window immediately before this one, same length
    pub fn previous(&self) -> Option<Self> {
        let start = self
            .start
            .checked_sub_signed(Duration::days(i64::from(self.length.days())))?;
        Self::new(start, self.length)
    }

    /// Window of the given length starting on the Monday of `date`'s week
    pub fn week_of(date: NaiveDate, length: ViewLength) -> Option<Self> {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self::new(date.checked_sub_signed(Duration::days(offset))?, length)
    }
}
