use std::path::{Path, PathBuf};

use calindex_core::ics::Document;
use calindex_core::store::persist::backup_path;
use calindex_core::store::HORIZON_DAYS;
use calindex_core::time::{assume_local, today};
use calindex_core::{CalIndexError, Event, Store, search_by_name, search_in_range};
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, TimeZone};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    assume_local(date(y, m, d).and_hms_opt(h, min, 0).unwrap())
}

fn write_calendar(dir: &TempDir, file: &str, name: &str, events: &str) -> PathBuf {
    let path = dir.path().join(file);
    let content = format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//test//EN\r\nX-WR-CALNAME:{name}\r\n{events}END:VCALENDAR\r\n"
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn vevent(uid: &str, summary: &str, dtstart: &str) -> String {
    format!("BEGIN:VEVENT\r\nUID:{uid}\r\nSUMMARY:{summary}\r\nDTSTART{dtstart}\r\nEND:VEVENT\r\n")
}

fn file_uids(path: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(path).unwrap();
    Document::parse(&content)
        .unwrap()
        .events()
        .map(|e| e.uid().to_string())
        .collect()
}

fn standup() -> Event {
    Event::timed(
        "Standup",
        local(2024, 1, 15, 9, 0),
        Some(local(2024, 1, 15, 9, 30)),
    )
    .with_calendar("Personal")
}

#[test]
fn add_then_query_and_reread() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(&dir, "personal.ics", "Personal", "");
    let mut store = Store::load([&path]);

    let mut event = standup();
    assert!(store.add_event(&mut event));

    let events = store.get_events_for_date(date(2024, 1, 15));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Standup");

    assert_eq!(file_uids(&path), vec![event.uid.clone()]);

    store.reload();
    let reloaded = store.get_events_for_date(date(2024, 1, 15));
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].uid, event.uid);
    assert_eq!(reloaded[0].start, event.start);
    assert_eq!(reloaded[0].end, event.end);
}

#[test]
fn add_then_remove_restores_file() {
    let dir = tempfile::tempdir().unwrap();
    let existing = vevent("keep-me", "Dentist", ";VALUE=DATE:20240110");
    let path = write_calendar(&dir, "personal.ics", "Personal", &existing);
    let before = std::fs::read(&path).unwrap();
    let mut store = Store::load([&path]);
    let index_before = store.index().clone();

    let mut event = standup();
    assert!(store.add_event(&mut event));
    assert!(store.remove_event(&event));

    assert!(store.get_events_for_date(date(2024, 1, 15)).is_empty());
    assert!(!store.has_events_on_date(date(2024, 1, 15)));
    assert_eq!(store.index(), &index_before);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn remove_only_looks_at_the_event_date() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(
        &dir,
        "personal.ics",
        "Personal",
        &vevent("a", "Review", ";VALUE=DATE:20240301"),
    );
    let mut store = Store::load([&path]);

    let wrong_day = Event::all_day("Review", date(2024, 3, 2), None).with_uid("a");
    assert!(!store.remove_event(&wrong_day));
    assert!(matches!(
        store.try_remove_event(&wrong_day),
        Err(CalIndexError::EventNotFound { .. })
    ));
    assert_eq!(file_uids(&path), vec!["a".to_string()]);
}

#[test]
fn empty_store_has_no_upcoming_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(&dir, "empty.ics", "Empty", "");
    let store = Store::load([&path]);

    assert!(store.get_upcoming_events(today(), 20).is_empty());
}

#[test]
fn timed_events_sort_before_all_day() {
    let dir = tempfile::tempdir().unwrap();
    let events = format!(
        "{}{}{}",
        vevent("allday", "Holiday", ";VALUE=DATE:20240201"),
        vevent("late", "Lunch", &format!(":{}", local(2024, 2, 1, 12, 0).to_utc().format("%Y%m%dT%H%M%SZ"))),
        vevent("early", "Breakfast", ":20240201T080000"),
    );
    let path = write_calendar(&dir, "personal.ics", "Personal", &events);
    let store = Store::load([&path]);

    let uids: Vec<_> = store
        .get_events_for_date(date(2024, 2, 1))
        .into_iter()
        .map(|e| e.uid)
        .collect();
    assert_eq!(uids, vec!["early", "late", "allday"]);
}

#[test]
fn edit_of_unknown_event_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(
        &dir,
        "personal.ics",
        "Personal",
        &vevent("a", "Review", ";VALUE=DATE:20240301"),
    );
    let before = std::fs::read(&path).unwrap();
    let mut store = Store::load([&path]);
    let index_before = store.index().clone();

    let old = Event::all_day("Ghost", date(2024, 3, 1), None).with_uid("missing");
    let mut new = Event::all_day("Replacement", date(2024, 3, 5), None).with_calendar("Personal");

    assert!(!store.edit_event(&old, &mut new));
    assert_eq!(store.index(), &index_before);
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert!(!backup_path(&path).exists());
}

#[test]
fn edit_moves_event_to_new_date() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(
        &dir,
        "personal.ics",
        "Personal",
        &vevent("a", "Review", ";VALUE=DATE:20240301"),
    );
    let mut store = Store::load([&path]);

    let old = store.get_events_for_date(date(2024, 3, 1)).remove(0);
    let mut new = Event::all_day("Review v2", date(2024, 3, 4), None)
        .with_uid(old.uid.clone())
        .with_calendar(old.calendar_name.clone());

    assert!(store.edit_event(&old, &mut new));
    assert!(store.get_events_for_date(date(2024, 3, 1)).is_empty());

    let moved = store.get_events_for_date(date(2024, 3, 4));
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].summary, "Review v2");
    assert_eq!(file_uids(&path), vec!["a".to_string()]);
}

#[test]
fn failed_add_during_edit_restores_original() {
    let dir = tempfile::tempdir().unwrap();
    let home = write_calendar(
        &dir,
        "home.ics",
        "Home",
        &vevent("a", "Plumber", ";VALUE=DATE:20240301"),
    );
    let work = write_calendar(&dir, "work.ics", "Work", "");
    let mut store = Store::load([&home, &work]);

    // Make the target calendar unwritable after loading.
    std::fs::remove_file(&work).unwrap();
    std::fs::create_dir(&work).unwrap();

    let old = store.get_events_for_date(date(2024, 3, 1)).remove(0);
    let mut new = Event::all_day("Plumber", date(2024, 3, 2), None).with_calendar("Work");

    let result = store.try_edit_event(&old, &mut new);
    assert!(result.is_err());

    let restored = store.get_events_for_date(date(2024, 3, 1));
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].uid, "a");
    assert!(store.get_events_for_date(date(2024, 3, 2)).is_empty());
    assert_eq!(file_uids(&home), vec!["a".to_string()]);
}

#[test]
fn name_search_is_bounded_to_thirty_days() {
    let dir = tempfile::tempdir().unwrap();
    let today = today();
    let soon = (today + Duration::days(10)).format("%Y%m%d").to_string();
    let later = (today + Duration::days(40)).format("%Y%m%d").to_string();
    let events = format!(
        "{}{}",
        vevent("soon", "Team Meeting", &format!(";VALUE=DATE:{soon}")),
        vevent("later", "Board Meeting", &format!(";VALUE=DATE:{later}")),
    );
    let path = write_calendar(&dir, "work.ics", "Work", &events);
    let store = Store::load([&path]);

    let found = search_by_name(&store, "meeting", today);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uid, "soon");
}

#[test]
fn range_search_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let events = format!(
        "{}{}{}",
        vevent("c", "Sprint review", ":20240305T150000"),
        vevent("a", "Sprint planning", ":20240301T100000"),
        vevent("b", "Lunch", ":20240303T120000"),
    );
    let path = write_calendar(&dir, "work.ics", "Work", &events);
    let store = Store::load([&path]);

    let uids: Vec<_> = search_in_range(&store, date(2024, 3, 1), date(2024, 3, 5), Some("SPRINT"))
        .into_iter()
        .map(|e| e.uid)
        .collect();
    assert_eq!(uids, vec!["a", "c"]);

    assert_eq!(search_in_range(&store, date(2024, 3, 1), date(2024, 3, 5), None).len(), 3);
    assert!(search_in_range(&store, date(2024, 3, 5), date(2024, 3, 1), None).is_empty());
}

#[test]
fn reload_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(
        &dir,
        "personal.ics",
        "Personal",
        &format!(
            "{}{}",
            vevent("a", "One", ";VALUE=DATE:20240301"),
            vevent("b", "Two", ":20240302T090000"),
        ),
    );
    let mut store = Store::load([&path]);

    store.reload();
    let first = store.index().clone();
    store.reload();

    assert_eq!(store.index(), &first);
    assert_eq!(first.len(), 2);
}

#[test]
fn upcoming_respects_limit_and_horizon() {
    let dir = tempfile::tempdir().unwrap();
    let from = date(2024, 5, 1);
    let events: String = (0..40)
        .map(|offset| {
            let day = (from + Duration::days(offset)).format("%Y%m%d");
            vevent(&format!("e{offset}"), "Daily", &format!(";VALUE=DATE:{day}"))
        })
        .collect();
    let path = write_calendar(&dir, "daily.ics", "Daily", &events);
    let store = Store::load([&path]);

    let limited = store.get_upcoming_events(from, 5);
    assert_eq!(limited.len(), 5);

    let all = store.get_upcoming_events(from, 100);
    assert_eq!(all.len(), HORIZON_DAYS);
    let last = from + Duration::days(HORIZON_DAYS as i64 - 1);
    assert!(all.iter().all(|e| e.date() >= from && e.date() <= last));
    assert!(all.windows(2).all(|w| w[0].date() <= w[1].date()));
}

#[test]
fn mutation_writes_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(&dir, "personal.ics", "Personal", "");
    let before = std::fs::read(&path).unwrap();
    let mut store = Store::load([&path]);

    assert!(store.add_event(&mut standup()));

    assert_eq!(std::fs::read(backup_path(&path)).unwrap(), before);
}

#[test]
fn add_keeps_external_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(&dir, "personal.ics", "Personal", "");
    let mut store = Store::load([&path]);

    // Another program adds an event after we loaded.
    write_calendar(
        &dir,
        "personal.ics",
        "Personal",
        &vevent("external", "Added elsewhere", ";VALUE=DATE:20240110"),
    );

    let mut event = standup();
    assert!(store.add_event(&mut event));

    assert_eq!(file_uids(&path), vec!["external".to_string(), event.uid]);
}

#[test]
fn other_components_survive_rewrites() {
    let dir = tempfile::tempdir().unwrap();
    let todo = "BEGIN:VTODO\r\nUID:todo-1\r\nSUMMARY:Buy milk\r\nEND:VTODO\r\n";
    let timezone = "BEGIN:VTIMEZONE\r\nTZID:Europe/Paris\r\nEND:VTIMEZONE\r\n";
    let path = write_calendar(&dir, "personal.ics", "Personal", &format!("{timezone}{todo}"));
    let mut store = Store::load([&path]);

    let mut event = standup();
    assert!(store.add_event(&mut event));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains(todo));
    assert!(content.contains(timezone));
}

#[test]
fn missing_and_broken_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_calendar(
        &dir,
        "good.ics",
        "Good",
        &vevent("a", "Kept", ";VALUE=DATE:20240301"),
    );
    let broken = dir.path().join("broken.ics");
    std::fs::write(&broken, "not a calendar").unwrap();
    let missing = dir.path().join("missing.ics");

    let store = Store::load([&missing, &broken, &good]);

    assert_eq!(store.calendar_names(), vec!["Good"]);
    assert_eq!(store.index().len(), 1);
    // Colors count only files that loaded.
    assert_eq!(store.calendar_color("Good"), "#3584e4");
}

#[test]
fn colors_follow_load_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_calendar(&dir, "a.ics", "Work", "");
    let second = write_calendar(&dir, "b.ics", "Home", "");
    let store = Store::load([&first, &second]);

    assert_eq!(store.calendar_names(), vec!["Work", "Home"]);
    assert_eq!(store.calendar_color("Work"), "#3584e4");
    assert_eq!(store.calendar_color("Home"), "#33d17a");
    assert_eq!(store.calendar_color("Nope"), "#3584e4");
}

#[test]
fn unknown_calendar_falls_back_to_first() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_calendar(&dir, "a.ics", "Work", "");
    let second = write_calendar(&dir, "b.ics", "Home", "");
    let mut store = Store::load([&first, &second]);

    let mut event = standup().with_calendar("Nonexistent");
    assert!(store.add_event(&mut event));

    assert_eq!(event.calendar_name, "Work");
    assert_eq!(file_uids(&first), vec![event.uid]);
    assert!(file_uids(&second).is_empty());
}

#[test]
fn add_without_calendars_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::load([dir.path().join("missing.ics")]);

    let mut event = standup();
    assert!(!store.add_event(&mut event));
    assert!(matches!(
        store.try_add_event(&mut event),
        Err(CalIndexError::NoCalendars)
    ));
    assert!(store.index().is_empty());
}

#[test]
fn same_named_calendars_remove_from_owning_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_calendar(
        &dir,
        "a.ics",
        "Shared",
        &vevent("first-1", "Dentist", ";VALUE=DATE:20240110"),
    );
    let second = write_calendar(
        &dir,
        "b.ics",
        "Shared",
        &vevent("second-1", "Plumber", ";VALUE=DATE:20240110"),
    );
    let mut store = Store::load([&first, &second]);

    assert_eq!(store.sources().len(), 2);
    assert_eq!(store.calendar_names(), vec!["Shared"]);
    assert_eq!(store.get_events_for_date(date(2024, 1, 10)).len(), 2);

    let dentist = Event::all_day("Dentist", date(2024, 1, 10), None)
        .with_uid("first-1")
        .with_calendar("Shared");
    assert!(store.remove_event(&dentist));
    assert!(file_uids(&first).is_empty());
    assert_eq!(file_uids(&second), vec!["second-1".to_string()]);

    let plumber = Event::all_day("Plumber", date(2024, 1, 10), None)
        .with_uid("second-1")
        .with_calendar("Shared");
    assert!(store.remove_event(&plumber));
    assert!(file_uids(&second).is_empty());

    store.reload();
    assert!(!store.has_events_on_date(date(2024, 1, 10)));
}

#[test]
fn add_to_same_named_calendars_uses_first_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_calendar(&dir, "a.ics", "Shared", "");
    let second = write_calendar(&dir, "b.ics", "Shared", "");
    let mut store = Store::load([&first, &second]);

    let mut event = standup().with_calendar("Shared");
    assert!(store.add_event(&mut event));

    assert_eq!(file_uids(&first), vec![event.uid.clone()]);
    assert!(file_uids(&second).is_empty());
    assert_eq!(store.calendar_color("Shared"), store.sources()[0].color);
}

#[test]
fn add_normalizes_offset_to_local() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_calendar(&dir, "personal.ics", "Personal", "");
    let mut store = Store::load([&path]);

    // Early morning at +05:00 falls on the previous day in zones west of it.
    let start = FixedOffset::east_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 15, 2, 0, 0)
        .unwrap();
    let expected = start.with_timezone(&Local).date_naive();

    let mut event = Event::timed("Late call", start, None).with_calendar("Personal");
    assert!(store.add_event(&mut event));

    assert_eq!(event.start, start);
    assert_eq!(event.start.offset(), start.with_timezone(&Local).offset());
    assert_eq!(event.date(), expected);
    assert!(store.has_events_on_date(expected));

    store.reload();
    let reloaded = store.get_events_for_date(expected);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].start, event.start);
    assert_eq!(reloaded[0].end, event.end);

    assert!(store.remove_event(&event));
    assert!(file_uids(&path).is_empty());
}
