//! MS-DOS date/time conversion
//!
//! Zip stores modification times as two packed 16-bit fields in local time
//! with two-second resolution. They are treated as UTC here.

const SECONDS_PER_DAY: i64 = 86_400;
const DOS_EPOCH_YEAR: i64 = 1980;
const DOS_MAX_YEAR: i64 = DOS_EPOCH_YEAR + 127;

/// Convert a DOS `(time, date)` pair to seconds since the Unix epoch.
///
/// Out-of-range fields are clamped: many tools write a zero date, which
/// becomes 1980-01-01.
pub fn dos_to_unix(time: u16, date: u16) -> i64 {
    let year = DOS_EPOCH_YEAR + i64::from(date >> 9);
    let month = i64::from((date >> 5) & 0x0F).clamp(1, 12);
    let day = i64::from(date & 0x1F).max(1);

    let hour = i64::from(time >> 11).min(23);
    let minute = i64::from((time >> 5) & 0x3F).min(59);
    let second = (i64::from(time & 0x1F) * 2).min(59);

    days_from_civil(year, month, day) * SECONDS_PER_DAY + hour * 3600 + minute * 60 + second
}

/// Convert seconds since the Unix epoch to a DOS `(time, date)` pair.
///
/// Timestamps outside 1980..=2107 are clamped to the representable range.
pub fn unix_to_dos(timestamp: i64) -> (u16, u16) {
    let days = timestamp.div_euclid(SECONDS_PER_DAY);
    let seconds = timestamp.rem_euclid(SECONDS_PER_DAY);
    let (year, month, day) = civil_from_days(days);

    if year < DOS_EPOCH_YEAR {
        return (0, (1 << 5) | 1);
    }
    if year > DOS_MAX_YEAR {
        return ((23 << 11) | (59 << 5) | 29, (127 << 9) | (12 << 5) | 31);
    }

    let time = ((seconds / 3600) << 11) | (((seconds % 3600) / 60) << 5) | ((seconds % 60) / 2);
    let date = ((year - DOS_EPOCH_YEAR) << 9) | (month << 5) | day;
    (time as u16, date as u16)
}

// Howard Hinnant's days_from_civil
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let month_index = (month + 9) % 12;
    let day_of_year = (153 * month_index + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let day_of_era = z - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let month_index = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * month_index + 2) / 5 + 1;
    let month = if month_index < 10 {
        month_index + 3
    } else {
        month_index - 9
    };
    let year = year_of_era + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
