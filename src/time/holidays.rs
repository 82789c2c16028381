/// Exchange holiday calendars used by the built-in sessions
use chrono::NaiveDate;
use std::collections::HashSet;

fn holiday_set(year: i32, days: &[(u32, u32)]) -> HashSet<NaiveDate> {
    days.iter()
        .filter_map(|&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .collect()
}

/// NSE Holidays for 2025 (update annually)
pub fn get_nse_holidays_2025() -> HashSet<NaiveDate> {
    holiday_set(
        2025,
        &[
            (1, 26),  // Republic Day
            (2, 26),  // Mahashivratri
            (3, 14),  // Holi
            (3, 31),  // Id-Ul-Fitr
            (4, 10),  // Mahavir Jayanti
            (4, 14),  // Dr. Ambedkar Jayanti
            (4, 18),  // Good Friday
            (5, 1),   // Maharashtra Day
            (5, 12),  // Buddha Purnima
            (6, 7),   // Bakri Id
            (7, 7),   // Muharram
            (8, 15),  // Independence Day
            (8, 27),  // Ganesh Chaturthi
            (9, 5),   // Eid-E-Milad
            (10, 2),  // Mahatma Gandhi Jayanti
            (10, 12), // Dussehra
            (10, 20), // Diwali Balipratipada
            (10, 21), // Diwali
            (11, 5),  // Gurunanak Jayanti
            (12, 25), // Christmas
        ],
    )
}

/// NYSE full-day closures for 2025
pub fn get_nyse_holidays_2025() -> HashSet<NaiveDate> {
    holiday_set(
        2025,
        &[
            (1, 1),   // New Year's Day
            (1, 9),   // National Day of Mourning
            (1, 20),  // Martin Luther King Jr. Day
            (2, 17),  // Washington's Birthday
            (4, 18),  // Good Friday
            (5, 26),  // Memorial Day
            (6, 19),  // Juneteenth
            (7, 4),   // Independence Day
            (9, 1),   // Labor Day
            (11, 27), // Thanksgiving Day
            (12, 25), // Christmas
        ],
    )
}
