use chrono::{NaiveDate, Weekday};
use turno_core::calendar::YearMonth;
use turno_core::config::Config;
use turno_core::rotation::{Participant, assignment_for_date, cycle_day_of};
use turno_core::view::MonthView;

#[test]
fn month_navigation_keeps_rotation_continuous() {
    let mut cfg = Config::default();
    cfg.apply_overrides(vec![
        ("rc.display.month".to_string(), "2025-03".to_string()),
        ("rc.week.start".to_string(), "monday".to_string()),
    ]);
    let today = NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid today");
    let week_start = cfg.week_start().expect("week start");
    assert_eq!(week_start, Weekday::Mon);

    let march = turno_core::commands::display_month(&cfg, today).expect("display month");
    let view = MonthView::build(march, week_start);
    assert_eq!(view.leading_blanks, 5);
    assert_eq!(view.days[0].assignment.participant, Participant::Alexis);
    assert_eq!(view.days[3].assignment.participant, Participant::Alexandra);

    let april = turno_core::commands::navigated_month(&cfg, &[], today, 1).expect("next month");
    assert_eq!(april, YearMonth::new(2025, 4).expect("valid month"));
    let april_view = MonthView::build(april, week_start);
    let first = &april_view.days[0].assignment;
    assert_eq!(first.cycle_day, 31);
    assert_eq!(first.participant, Participant::Alexandra);

    let forward = march.checked_shift(12).expect("forward a year");
    let back = forward.checked_shift(-12).expect("back a year");
    assert_eq!(MonthView::build(back, week_start), view);

    // A leap February sits inside the span, so check the day count directly.
    let far = NaiveDate::from_ymd_opt(2028, 3, 1).expect("valid date");
    let epoch = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
    assert_eq!(cycle_day_of(far), far.signed_duration_since(epoch).num_days());
    assert_eq!(assignment_for_date(far).cycle_day, 1096);
}

#[test]
fn far_navigation_is_rejected_instead_of_clamped() {
    let cfg = Config::default();
    let today = NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid today");
    let far = vec!["3200000".to_string()];
    assert!(turno_core::commands::navigated_month(&cfg, &far, today, 1).is_err());
    assert!(turno_core::commands::navigated_month(&cfg, &far, today, -1).is_err());
}
