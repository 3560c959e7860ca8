use proptest::prelude::*;
use switchr::schedule::{Mode, TimeOfDay, TimeWindow, desired_is_dark};

/// Generate any minute of the day
fn minute_strategy() -> impl Strategy<Value = u16> {
    0u16..1440
}

/// Generate a window whose light point is strictly before its dark point
fn normal_window_strategy() -> impl Strategy<Value = (u16, u16)> {
    (0u16..1439).prop_flat_map(|light| (Just(light), (light + 1)..1440))
}

/// Generate a window whose dark point is at or before its light point
fn inverted_window_strategy() -> impl Strategy<Value = (u16, u16)> {
    (0u16..1440).prop_flat_map(|light| (Just(light), 0..=light))
}

proptest! {
    /// Normal window: dark before the light point and from the dark point on
    #[test]
    fn test_normal_window_definition((light, dark) in normal_window_strategy(), now in minute_strategy()) {
        prop_assert_eq!(desired_is_dark(now, light, dark), now < light || now >= dark);
    }

    /// Inverted or equal window: dark exactly in [dark, light)
    #[test]
    fn test_inverted_window_definition((light, dark) in inverted_window_strategy(), now in minute_strategy()) {
        prop_assert_eq!(desired_is_dark(now, light, dark), dark <= now && now < light);
    }

    /// Equal points never ask for dark
    #[test]
    fn test_equal_points_always_light(point in minute_strategy(), now in minute_strategy()) {
        prop_assert!(!desired_is_dark(now, point, point));
    }

    /// Each switch point belongs to the mode it switches into
    #[test]
    fn test_boundaries_enter_their_mode(light in minute_strategy(), dark in minute_strategy()) {
        prop_assume!(light != dark);
        prop_assert!(desired_is_dark(dark, light, dark));
        prop_assert!(!desired_is_dark(light, light, dark));
    }

    /// The next boundary really changes the mode, and nothing changes before it
    #[test]
    fn test_next_boundary_is_first_change(light in minute_strategy(), dark in minute_strategy(), now in minute_strategy()) {
        prop_assume!(light != dark);
        let window = TimeWindow::new(
            TimeOfDay::from_minute_of_day(light),
            TimeOfDay::from_minute_of_day(dark),
        );
        let start = TimeOfDay::from_minute_of_day(now);
        let current = window.mode_at(start);
        let boundary = window.next_boundary(start).unwrap();

        prop_assert!(boundary.minutes_until >= 1 && boundary.minutes_until <= 1440);
        for step in 1..boundary.minutes_until {
            let t = TimeOfDay::from_minute_of_day(now + step);
            prop_assert_eq!(window.mode_at(t), current);
        }
        let at = TimeOfDay::from_minute_of_day(now + boundary.minutes_until);
        prop_assert_eq!(at, boundary.at);
        prop_assert_eq!(window.mode_at(at), boundary.mode);
        prop_assert_eq!(boundary.mode, current.opposite());
    }

    /// Minute-of-day conversion round-trips for every valid time
    #[test]
    fn test_time_of_day_minutes(hour in 0u8..24, minute in 0u8..60) {
        let time = TimeOfDay::new(hour, minute).unwrap();
        prop_assert_eq!(TimeOfDay::from_minute_of_day(time.minute_of_day()), time);
        prop_assert!(time.minute_of_day() < 1440);
    }
}

#[test]
fn test_reference_examples() {
    // light 07:00, dark 19:00
    let expected = [(0, true), (419, true), (420, false), (1139, false), (1140, true), (1439, true)];
    for (now, dark) in expected {
        assert_eq!(desired_is_dark(now, 420, 1140), dark, "minute {now}");
    }

    let window = TimeWindow::new(TimeOfDay::new(6, 0).unwrap(), TimeOfDay::new(22, 0).unwrap());
    assert_eq!(window.mode_at(TimeOfDay::new(23, 0).unwrap()), Mode::Dark);
    assert_eq!(window.mode_at(TimeOfDay::new(12, 0).unwrap()), Mode::Light);
}
