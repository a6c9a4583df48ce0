use horolog::{
    Division, Error, FormatOptions, ItemKind, Nickname, Nicknames, TimeSystem, TimeSystemBuilder,
    Value,
};

const AMERICAN: &str = "Month/Day/Year";
const DAY: i64 = 86_400;
const YEAR: i64 = 31_556_952;

fn int(v: i64) -> Value {
    Value::from_integer(v.into())
}

fn gregorian_builder() -> TimeSystemBuilder {
    let mut builder = TimeSystemBuilder::new("Gregorian");
    builder
        .add_base_unit("Second")
        .unwrap()
        .add_unit("Minute", 60, Some("Second"))
        .unwrap()
        .add_unit("Hour", 60, Some("Minute"))
        .unwrap()
        .add_unit("Day", 24, Some("Hour"))
        .unwrap()
        .add_unit("Year", 365, Some("Day"))
        .unwrap()
        .add_exception("Leap Day 4", 4, "Year", 1, "Day")
        .unwrap()
        .add_exception("Leap Day 100", 100, "Year", -1, "Day")
        .unwrap()
        .add_exception("Leap Day 400", 400, "Year", 1, "Day")
        .unwrap()
        .add_exact_division(
            "Month",
            "Year",
            "Day",
            [
                ("January", 31),
                ("February", 28),
                ("March", 31),
                ("April", 30),
                ("May", 31),
                ("June", 30),
                ("July", 31),
                ("August", 31),
                ("September", 30),
                ("October", 31),
                ("November", 30),
                ("December", 31),
            ],
            [
                ("Leap Day 4", "February"),
                ("Leap Day 100", "February"),
                ("Leap Day 400", "February"),
            ],
        )
        .unwrap();
    builder
}

fn gregorian() -> TimeSystem {
    gregorian_builder().compile().unwrap()
}

fn with_weeks() -> TimeSystem {
    let mut builder = gregorian_builder();
    builder
        .add_repeating_division(
            "Week",
            "Day",
            [
                ("Sunday", 1),
                ("Monday", 1),
                ("Tuesday", 1),
                ("Wednesday", 1),
                ("Thursday", 1),
                ("Friday", 1),
                ("Saturday", 1),
            ],
        )
        .unwrap();
    builder.compile().unwrap()
}

fn one_based() -> FormatOptions {
    FormatOptions::new().one_based(["Month", "Day", "Week"])
}

fn nicknames() -> Nicknames {
    Nicknames::new()
        .with(
            "wk",
            Nickname::new("Week").with_labels(["Sun.", "Mon.", "Tue.", "Wed.", "Thu.", "Fri.", "Sat."]),
        )
        .with(
            "mn",
            Nickname::new("Month").with_labels([
                "Jan.", "Feb.", "Mar.", "Apr.", "May.", "Jun.", "Jul.", "Aug.", "Sep.", "Oct.",
                "Nov.", "Dec.",
            ]),
        )
        .with(
            "MN",
            Nickname::new("Month").with_labels([
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
            ]),
        )
}

// ── unit arithmetic ─────────────────────────────────────────────────────────

#[test]
fn gregorian_year_is_averaged_over_leap_rules() {
    let greg = gregorian();
    assert_eq!(greg.unit_to_base(1, "Year").unwrap(), int(YEAR));
    assert_eq!(
        greg.working_factor("Year").unwrap(),
        &Value::new(146_097.into(), 400.into())
    );
    assert_eq!(greg.working_factor("Day").unwrap(), &int(24));
    assert_eq!(greg.base_to_unit(DAY, "Day").unwrap(), int(1));
    assert_eq!(
        greg.lineage("Year").unwrap(),
        ["Second", "Minute", "Hour", "Day", "Year"]
    );
}

#[test]
fn conversions_are_exact_inverses() {
    let greg = gregorian();
    for unit in ["Second", "Minute", "Hour", "Day", "Year"] {
        let v = Value::new(7.into(), 3.into());
        let there = greg.unit_to_base(&v, unit).unwrap();
        assert_eq!(greg.base_to_unit(&there, unit).unwrap(), v);
    }
}

// ── colon formats ───────────────────────────────────────────────────────────

#[test]
fn colon_format_peels_units() {
    let greg = gregorian();
    let options = FormatOptions::new();
    let template = ":Year:Day:Second:";

    assert_eq!(greg.base_to_format(YEAR, template, &options).unwrap(), ":1:0:0:");
    assert_eq!(greg.base_to_format(YEAR + 1, template, &options).unwrap(), ":1:0:1:");

    let t = YEAR * 2021 + DAY * 21 + 1;
    assert_eq!(greg.base_to_format(t, template, &options).unwrap(), ":2021:21:1:");
    assert_eq!(greg.format_to_base(":2021:21:1:", template, 0, &options).unwrap(), int(t));
}

#[test]
fn negative_values_use_neg_template_or_minus_prefix() {
    let greg = gregorian();
    let template = ":Year:Day:Second:";
    let t = -(YEAR * 2021 + DAY * 21 + 1);

    let bc = FormatOptions::new().neg_template("-:Year:Day:Second:");
    assert_eq!(greg.base_to_format(t, template, &bc).unwrap(), "-:2021:21:1:");
    assert_eq!(greg.format_to_base("-:2021:21:1:", template, 0, &bc).unwrap(), int(t));
    assert_eq!(greg.format_to_base(":2021:21:1:", template, 0, &bc).unwrap(), int(-t));

    let plain = FormatOptions::new();
    assert_eq!(greg.base_to_format(t, template, &plain).unwrap(), "-:2021:21:1:");
    assert_eq!(greg.format_to_base("-:2021:21:1:", template, 0, &plain).unwrap(), int(t));
}

#[test]
fn ambiguous_negative_template_is_rejected() {
    let greg = gregorian();
    let options = FormatOptions::new().neg_template("Year/Day");
    assert!(matches!(
        greg.format_to_base("3/4", "Year/Day", 0, &options),
        Err(Error::FormatMismatch { .. })
    ));
}

// ── months and leap years ───────────────────────────────────────────────────

#[test]
fn american_dates_match_known_values() {
    let greg = gregorian();
    let options = one_based();
    for (text, expected) in [
        ("6/26/2021", 63_791_806_392),
        ("2/29/2020", 63_750_140_640),
        ("2/29/2400", 75_741_782_400),
    ] {
        let t = greg.format_to_base(text, AMERICAN, 0, &options).unwrap();
        assert_eq!(t, int(expected), "{text}");
        assert_eq!(greg.base_to_format(&t, AMERICAN, &options).unwrap(), text);
    }
}

#[test]
fn february_29_2100_rolls_into_march() {
    let greg = gregorian();
    let options = one_based();
    let t = greg.format_to_base("2/29/2100", AMERICAN, 0, &options).unwrap();
    assert_eq!(t, int(66_274_696_800));
    assert_eq!(greg.base_to_format(&t, AMERICAN, &options).unwrap(), "3/1/2100");
}

#[test]
fn every_day_of_a_year_round_trips() {
    let greg = gregorian();
    let options = one_based();
    for (year, days) in [(2020, 366), (2021, 365), (2100, 365), (2400, 366)] {
        let start = YEAR * year;
        let mut last = String::new();
        for day in 0..days {
            let t = start + DAY * day;
            let text = greg.base_to_format(t, AMERICAN, &options).unwrap();
            assert_ne!(text, last, "two days formatted as {text}");
            assert_eq!(greg.format_to_base(&text, AMERICAN, 0, &options).unwrap(), int(t));
            last = text;
        }
        assert_eq!(last, format!("12/31/{year}"));
    }
}

#[test]
fn time_of_day_round_trips() {
    let greg = gregorian();
    let options = one_based();
    let template = "Month/Day/Year Hour:Minute:Second";
    let t = 63_791_806_392 + 13 * 3600 + 45 * 60 + 30;
    let text = greg.base_to_format(t, template, &options).unwrap();
    assert_eq!(text, "6/26/2021 13:45:30");
    assert_eq!(greg.format_to_base(&text, template, 0, &options).unwrap(), int(t));
}

#[test]
fn partial_update_keeps_only_finer_detail() {
    let greg = gregorian();
    let options = one_based();
    let original = 63_791_806_392 + 10 * 3600 + 30 * 60 + 15;

    let t = greg.format_to_base("8:05", "Hour:Minute", original, &options).unwrap();
    assert_eq!(t, int(8 * 3600 + 5 * 60 + 15));

    let moved = greg.format_to_base(":1999:", ":Year:", original, &options).unwrap();
    assert_eq!(moved, int(YEAR * 1999 + (original - YEAR * 2021)));

    let unchanged = greg.format_to_base("today", "today", original, &options).unwrap();
    assert_eq!(unchanged, int(original));
}

// ── weeks and nicknames ─────────────────────────────────────────────────────

#[test]
fn weekday_labels_round_trip() {
    let greg = with_weeks();
    let options = one_based().nicknames(nicknames());
    let template = "wk, mn Day Year";
    let t = 63_791_806_392;

    let text = greg.base_to_format(t, template, &options).unwrap();
    assert_eq!(text, "Sat., Jun. 26 2021");
    assert_eq!(greg.format_to_base(&text, template, 0, &options).unwrap(), int(t));

    assert_eq!(
        greg.base_to_format(t, "MN Day, Year", &options).unwrap(),
        "June 26, 2021"
    );
    assert_eq!(greg.base_to_format(t, "Week", &options).unwrap(), "7");
}

#[test]
fn weekday_moves_the_date_within_its_week() {
    let greg = with_weeks();
    let options = one_based().nicknames(nicknames());
    let t = greg
        .format_to_base("Mon. 6/26/2021", "wk Month/Day/Year", 0, &options)
        .unwrap();
    assert_eq!(
        greg.base_to_format(&t, "wk Month/Day/Year", &options).unwrap(),
        "Mon. 6/21/2021"
    );
}

#[test]
fn label_from_another_alias_is_rejected() {
    let greg = with_weeks();
    let options = one_based().nicknames(nicknames());
    assert!(matches!(
        greg.format_to_base("Sat. 26 2021", "mn Day Year", 0, &options),
        Err(Error::FormatMismatch { .. })
    ));
}

#[test]
fn alias_for_undeclared_name_is_a_lookup_error() {
    let greg = gregorian();
    let options = one_based().nicknames(nicknames());
    assert!(matches!(
        greg.base_to_format(0, "wk", &options),
        Err(Error::Lookup { kind: ItemKind::Identifier, name }) if name == "Week"
    ));
}

#[test]
fn fractional_slot_weights() {
    let mut builder = gregorian_builder();
    builder
        .add_repeating_division("Half", "Day", [("AM", "1/2"), ("PM", "1/2")])
        .unwrap();
    let greg = builder.compile().unwrap();
    let options = FormatOptions::new();

    assert_eq!(greg.base_to_format(DAY / 2 - 1, "Half", &options).unwrap(), "0");
    assert_eq!(greg.base_to_format(DAY / 2, "Half", &options).unwrap(), "1");
    assert_eq!(greg.repeating_division("Half").unwrap().len(), 2);
}

// ── errors ──────────────────────────────────────────────────────────────────

#[test]
fn malformed_strings_are_rejected() {
    let greg = gregorian();
    let options = one_based();
    assert!(matches!(
        greg.format_to_base("6-26-2021", AMERICAN, 0, &options),
        Err(Error::FormatMismatch { .. })
    ));
    assert!(matches!(
        greg.format_to_base("13/1/2021", AMERICAN, 0, &options),
        Err(Error::IndexOutOfRange { index: 12, len: 12, .. })
    ));
    assert!(matches!(
        greg.format_to_base("6/26/2021 7", "Month/Day/Year Month", 0, &options),
        Err(Error::Consistency { name }) if name == "Month"
    ));
}

#[test]
fn exact_division_must_absorb_every_exception() {
    let mut builder = TimeSystemBuilder::new("Broken");
    builder
        .add_base_unit("Day")
        .unwrap()
        .add_unit("Year", 365, Some("Day"))
        .unwrap()
        .add_exception("Leap", 4, "Year", 1, "Day")
        .unwrap()
        .add_exact_division(
            "Half",
            "Year",
            "Day",
            [("H1", 182), ("H2", 183)],
            Vec::<(String, String)>::new(),
        )
        .unwrap();
    assert!(matches!(builder.compile(), Err(Error::Definition(_))));
}

#[test]
fn broken_hierarchies_are_rejected() {
    let mut two_bases = TimeSystemBuilder::new("Two bases");
    two_bases.add_base_unit("A").unwrap().add_base_unit("B").unwrap();
    assert!(matches!(two_bases.compile(), Err(Error::Definition(_))));

    let mut cycle = TimeSystemBuilder::new("Cycle");
    cycle
        .add_base_unit("Base")
        .unwrap()
        .add_unit("A", 2, Some("B"))
        .unwrap()
        .add_unit("B", 2, Some("A"))
        .unwrap();
    assert!(matches!(cycle.compile(), Err(Error::Definition(_))));

    assert!(matches!(
        TimeSystemBuilder::new("Empty").compile(),
        Err(Error::Definition(_))
    ));
}

#[test]
fn compiled_system_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TimeSystem>();

    let greg = std::sync::Arc::new(gregorian());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let greg = std::sync::Arc::clone(&greg);
            std::thread::spawn(move || {
                let t = YEAR * (2020 + i);
                greg.base_to_format(t, "Year", &FormatOptions::new()).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), (2020 + i).to_string());
    }
}

#[cfg(feature = "serde")]
#[test]
fn serde_builder_round_trips_through_json() {
    let builder = gregorian_builder();
    let json = serde_json::to_string(&builder).unwrap();
    let back: TimeSystemBuilder = serde_json::from_str(&json).unwrap();
    assert_eq!(back, builder);
    assert_eq!(back.compile().unwrap().unit_to_base(1, "Year").unwrap(), int(YEAR));

    let options = one_based().nicknames(nicknames());
    let json = serde_json::to_string(&options).unwrap();
    let back: FormatOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}
