use std::str::FromStr;

use anyhow::anyhow;
use chrono::Weekday;

use crate::calendar::week_columns;

const MONTHS_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Es,
    En,
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Locale::Es),
            "en" | "english" => Ok(Locale::En),
            other => Err(anyhow!("unsupported locale: {other} (expected es or en)")),
        }
    }
}

impl Locale {
    pub fn month_name(self, month: u32) -> &'static str {
        let table = match self {
            Locale::Es => &MONTHS_ES,
            Locale::En => &MONTHS_EN,
        };
        table
            .get(month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("")
    }

    pub fn weekday_name(self, day: Weekday) -> &'static str {
        match (self, day) {
            (Locale::Es, Weekday::Mon) => "Lunes",
            (Locale::Es, Weekday::Tue) => "Martes",
            (Locale::Es, Weekday::Wed) => "Miércoles",
            (Locale::Es, Weekday::Thu) => "Jueves",
            (Locale::Es, Weekday::Fri) => "Viernes",
            (Locale::Es, Weekday::Sat) => "Sábado",
            (Locale::Es, Weekday::Sun) => "Domingo",
            (Locale::En, Weekday::Mon) => "Monday",
            (Locale::En, Weekday::Tue) => "Tuesday",
            (Locale::En, Weekday::Wed) => "Wednesday",
            (Locale::En, Weekday::Thu) => "Thursday",
            (Locale::En, Weekday::Fri) => "Friday",
            (Locale::En, Weekday::Sat) => "Saturday",
            (Locale::En, Weekday::Sun) => "Sunday",
        }
    }

    pub fn weekday_short(self, day: Weekday) -> &'static str {
        match (self, day) {
            (Locale::Es, Weekday::Mon) => "Lun",
            (Locale::Es, Weekday::Tue) => "Mar",
            (Locale::Es, Weekday::Wed) => "Mié",
            (Locale::Es, Weekday::Thu) => "Jue",
            (Locale::Es, Weekday::Fri) => "Vie",
            (Locale::Es, Weekday::Sat) => "Sáb",
            (Locale::Es, Weekday::Sun) => "Dom",
            (Locale::En, Weekday::Mon) => "Mon",
            (Locale::En, Weekday::Tue) => "Tue",
            (Locale::En, Weekday::Wed) => "Wed",
            (Locale::En, Weekday::Thu) => "Thu",
            (Locale::En, Weekday::Fri) => "Fri",
            (Locale::En, Weekday::Sat) => "Sat",
            (Locale::En, Weekday::Sun) => "Sun",
        }
    }

    pub fn weekday_headers(self, week_start: Weekday, short: bool) -> Vec<&'static str> {
        week_columns(week_start)
            .into_iter()
            .map(|day| {
                if short {
                    self.weekday_short(day)
                } else {
                    self.weekday_name(day)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::Locale;

    #[test]
    fn month_names_follow_locale() {
        assert_eq!(Locale::Es.month_name(3), "Marzo");
        assert_eq!(Locale::En.month_name(12), "December");
        assert_eq!(Locale::En.month_name(0), "");
    }

    #[test]
    fn sunday_first_headers() {
        let headers = Locale::Es.weekday_headers(Weekday::Sun, true);
        assert_eq!(headers, vec!["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"]);
    }

    #[test]
    fn monday_first_headers() {
        let headers = Locale::En.weekday_headers(Weekday::Mon, false);
        assert_eq!(headers.first(), Some(&"Monday"));
        assert_eq!(headers.last(), Some(&"Sunday"));
    }

    #[test]
    fn parses_locale_codes() {
        assert_eq!("ES".parse::<Locale>().expect("es"), Locale::Es);
        assert_eq!("english".parse::<Locale>().expect("en"), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }
}
