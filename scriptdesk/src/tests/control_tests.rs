use super::*;
use crate::control::WINDOW_LIST_STATEMENT;
use crate::keys::{Key, Modifier};
use crate::location::at;
use std::collections::VecDeque;

#[test]
fn test_tell_wraps_statement_in_application() {
    let fake = FakeScripting::new(|_| Ok("10".to_string()));
    let control = control_for(APP, &fake);

    assert_eq!(control.tell("get column count").unwrap(), "10");
    assert_eq!(
        fake.commands(),
        vec![r#"tell application "ApplicationName"; get column count; end tell"#.to_string()]
    );
}

#[test]
fn test_tell_scoped_nests_scopes() {
    let fake = FakeScripting::silent();
    let control = control_for(APP, &fake);

    control
        .tell_scoped(&["document 1", "sheet 1"], "get name")
        .unwrap();
    assert_eq!(
        fake.commands()[0],
        r#"tell application "ApplicationName"; tell document 1; tell sheet 1; get name; end tell; end tell; end tell"#
    );
}

#[test]
fn test_exists_resolves_against_current_window() {
    let fake = FakeScripting::new(|_| reply_bool(true));
    let mut control = control_for(APP, &fake);
    control.set_current_window("Report");

    assert!(control.exists(&at().sheet(1)).unwrap());
    assert_eq!(
        fake.commands()[0],
        system_event(r#"exists sheet 1 of window "Report""#)
    );
}

#[test]
fn test_top_level_locations_are_not_rerooted() {
    let fake = FakeScripting::new(|_| reply_bool(false));
    let mut control = control_for(APP, &fake);
    control.set_current_window("Report");
    control.set_base_location(Some(at().window("Print")));

    assert!(!control
        .exists(&at().menu_item("Duplicate").menu(1).menu_bar_item("File").menu_bar(1))
        .unwrap());
    control.exists(&at().checkbox(1)).unwrap();

    let commands = fake.commands();
    assert!(asks_exists(
        &commands[0],
        r#"menu item "Duplicate" of menu 1 of menu bar item "File" of menu bar 1"#
    ));
    // The base location wins over the current window.
    assert!(asks_exists(&commands[1], r#"checkbox 1 of window "Print""#));
}

#[test]
fn test_invalid_location_is_rejected_before_execution() {
    let fake = FakeScripting::silent();
    let control = control_for(APP, &fake);

    let result = control.click(&at().button("OK").sheet(0));
    assert!(matches!(result, Err(AutomationError::InvalidLocation(_))));
    assert!(fake.commands().is_empty());
}

#[test]
fn test_exists_rejects_non_boolean_reply() {
    let fake = FakeScripting::new(|_| Ok("missing value".to_string()));
    let control = control_for(APP, &fake);
    assert!(matches!(
        control.exists(&at().window(1)),
        Err(AutomationError::Parse(_))
    ));
}

#[test]
fn test_clone_has_independent_current_window() {
    let fake = FakeScripting::silent();
    let mut original = control_for(APP, &fake);
    original.set_current_window("Original");

    let mut clone = original.clone();
    clone.set_current_window("Clone");
    assert_eq!(original.current_window_name(), "Original");

    original.set_current_window("Changed");
    assert_eq!(clone.current_window_name(), "Clone");
    assert_eq!(clone.name(), original.name());
}

#[test]
fn test_wait_until_exists_polls_until_true() {
    let mut answers = VecDeque::from([false, false, true]);
    let fake = FakeScripting::new(move |_| reply_bool(answers.pop_front().unwrap_or(true)));
    let control = control_for(APP, &fake);

    control.wait_until_exists(&at().window("Save")).unwrap();
    assert_eq!(fake.count(r#"exists window "Save""#), 3);
}

#[test]
fn test_wait_until_exists_checks_at_least_once() {
    let fake = FakeScripting::new(|_| reply_bool(true));
    let control = control_for(APP, &fake);

    control.wait_until_exists(&at().window("Save")).unwrap();
    assert_eq!(fake.commands().len(), 1);
}

#[test]
fn test_wait_until_exists_times_out() {
    let fake = FakeScripting::new(|_| reply_bool(false));
    let control = control_for(APP, &fake);

    match control.wait_until_exists_for(&at().window("Save"), std::time::Duration::from_millis(20)) {
        Err(AutomationError::Timeout { condition, elapsed }) => {
            assert!(condition.contains(r#"window "Save""#));
            assert!(elapsed >= std::time::Duration::from_millis(20));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert!(fake.commands().len() > 1);
}

#[test]
fn test_wait_does_not_retry_execution_errors() {
    let fake = FakeScripting::new(|command| {
        Err(AutomationError::Execution {
            command: command.to_string(),
            message: "Can’t get window \"Save\".".to_string(),
        })
    });
    let control = control_for(APP, &fake);

    let result = control.wait_until_exists(&at().window("Save"));
    assert!(matches!(result, Err(AutomationError::Execution { .. })));
    assert_eq!(fake.commands().len(), 1);
}

#[test]
fn test_wait_until_not_exists() {
    let mut answers = VecDeque::from([true, true, false]);
    let fake = FakeScripting::new(move |_| reply_bool(answers.pop_front().unwrap_or(false)));
    let control = control_for(APP, &fake);

    control.wait_until_not_exists(&at().window("Print")).unwrap();
    assert_eq!(fake.commands().len(), 3);
}

#[test]
fn test_wait_until_any_exists_returns_the_one_found() {
    let fake = FakeScripting::new(|command| {
        reply_bool(asks_exists(command, r#"sheet 1 of window "Print""#))
    });
    let control = control_for(APP, &fake);

    let found = control
        .wait_until_any_exists(&[at().window("Save"), at().sheet(1).window("Print")])
        .unwrap();
    assert_eq!(found, at().sheet(1).window("Print"));
}

#[test]
fn test_window_list_parsing() {
    let fake = FakeScripting::new(|_| Ok("new window\noriginal window\n".to_string()));
    let control = control_for(APP, &fake);
    assert_eq!(
        control.window_list().unwrap(),
        vec!["new window".to_string(), "original window".to_string()]
    );

    let empty = FakeScripting::silent();
    assert!(control_for(APP, &empty).window_list().unwrap().is_empty());
}

#[test]
fn test_running_queries_system_events() {
    let fake = FakeScripting::new(|_| reply_bool(true));
    let control = control_for(APP, &fake);

    assert!(control.running().unwrap());
    assert_eq!(
        fake.commands()[0],
        r#"tell application "System Events"; (name of processes) contains "ApplicationName"; end tell"#
    );
}

#[test]
fn test_do_and_wait_for_new_window_returns_the_new_title() {
    let mut lists = VecDeque::from([
        vec!["original window".to_string()],
        vec!["original window".to_string()],
        vec!["original window".to_string()],
        vec!["new window".to_string(), "original window".to_string()],
    ]);
    let fake = FakeScripting::new(move |command| {
        if is_window_list(command) {
            let list = if lists.len() > 1 {
                lists.pop_front().unwrap()
            } else {
                lists[0].clone()
            };
            return reply_list(&list);
        }
        Ok(String::new())
    });
    let control = control_for(APP, &fake);

    let mut action_called = false;
    let window = control
        .do_and_wait_for_new_window(|| {
            action_called = true;
            control.tell("beep").map(drop)
        })
        .unwrap();

    assert_eq!(window, "new window");
    assert!(action_called);
    let activate = fake.position("; activate; ").unwrap();
    let action = fake.position("; beep; ").unwrap();
    assert!(fake.position(WINDOW_LIST_STATEMENT).unwrap() < activate);
    assert!(activate < action);
}

#[test]
fn test_two_new_windows_at_once_fail_explicitly() {
    let mut polls = 0;
    let fake = FakeScripting::new(move |command| {
        if is_window_list(command) {
            polls += 1;
            return Ok(if polls == 1 { "A" } else { "C\nB\nA" }.to_string());
        }
        Ok(String::new())
    });
    let control = control_for(APP, &fake);

    match control.do_and_wait_for_new_window(|| Ok(())) {
        Err(AutomationError::AmbiguousWindows(windows)) => {
            assert_eq!(windows, vec!["C".to_string(), "B".to_string()]);
        }
        other => panic!("expected AmbiguousWindows, got {other:?}"),
    }
}

#[test]
fn test_do_and_wait_for_new_window_times_out() {
    let fake = FakeScripting::new(|command| {
        Ok(if is_window_list(command) { "A" } else { "" }.to_string())
    });
    let control = control_for(APP, &fake);

    let result = control
        .do_and_wait_for_new_window_within(std::time::Duration::from_millis(15), || Ok(()));
    assert!(matches!(result, Err(AutomationError::Timeout { .. })));
}

#[test]
fn test_action_error_skips_polling() {
    let fake = FakeScripting::silent();
    let control = control_for(APP, &fake);

    let result = control.do_and_wait_for_new_window(|| {
        Err(AutomationError::InvalidArgument("no".to_string()))
    });
    assert!(matches!(result, Err(AutomationError::InvalidArgument(_))));
    assert_eq!(fake.count(WINDOW_LIST_STATEMENT), 1);
}

#[test]
fn test_keystroke_activates_focuses_then_types() {
    let fake = FakeScripting::new(|command| {
        Ok(if is_window_list(command) { "Other\nReport" } else { "" }.to_string())
    });
    let mut control = control_for(APP, &fake);
    control.set_current_window("Report");

    control
        .keystroke("s", &[Modifier::Command, Modifier::Shift])
        .unwrap();

    let commands = fake.commands();
    assert_eq!(commands[0], tell("activate"));
    assert_eq!(commands[1], system_event(WINDOW_LIST_STATEMENT));
    assert_eq!(
        commands[2],
        system_event(r#"set value of attribute "AXMain" of window "Report" to true"#)
    );
    assert_eq!(
        commands[3],
        system_event(r#"keystroke "s" using {command down, shift down}"#)
    );
}

#[test]
fn test_focus_falls_back_to_front_window() {
    let fake = FakeScripting::new(|command| {
        Ok(if is_window_list(command) { "Front\nBack" } else { "" }.to_string())
    });
    let mut control = control_for(APP, &fake);
    control.set_current_window("Closed Long Ago");

    control.focus().unwrap();
    assert_eq!(fake.count(r#"attribute "AXMain" of window "Front""#), 1);
    assert_eq!(control.current_window_name(), "Closed Long Ago");
}

#[test]
fn test_keystroke_when_ready_waits_and_keeps_focus() {
    let fake = FakeScripting::new(|_| reply_bool(true));
    let mut control = control_for(APP, &fake);
    control.set_current_window("Report");

    control.keystroke_when_ready(Key::Return, &[]).unwrap();
    assert_eq!(
        fake.commands(),
        vec![
            system_event(r#"exists window "Report""#),
            system_event("keystroke return"),
        ]
    );
}

#[test]
fn test_click_menu_bar() {
    let fake = FakeScripting::new(|command| {
        if command.contains("; exists ") {
            return reply_bool(true);
        }
        Ok(String::new())
    });
    let control = control_for(APP, &fake);

    control
        .click_menu_bar(
            &at().menu_item("0").menu(1).menu_item("Header Columns"),
            "Table",
        )
        .unwrap();

    let clicks: Vec<String> = fake
        .commands()
        .into_iter()
        .filter(|c| c.contains("; click "))
        .collect();
    assert_eq!(
        clicks,
        vec![
            system_event(r#"click menu bar item "Table" of menu bar 1"#),
            system_event(
                r#"click menu item "0" of menu 1 of menu item "Header Columns" of menu 1 of menu bar item "Table" of menu bar 1"#
            ),
        ]
    );
    assert!(fake.position(r#"exists menu 1 of menu bar item "Table" of menu bar 1"#).is_some());
}

#[test]
fn test_set_value_quotes_text() {
    let fake = FakeScripting::silent();
    let control = control_for(APP, &fake).scoped(at().sheet(1).window("Report"));

    control
        .set_value(&at().text_field(1), r#"budget "final".numbers"#)
        .unwrap();
    assert_eq!(
        fake.commands()[0],
        system_event(
            r#"set value of text field 1 of sheet 1 of window "Report" to "budget \"final\".numbers""#
        )
    );
}

#[test]
fn test_window_titles_with_commas_stay_whole() {
    let mut polls = 0;
    let fake = FakeScripting::new(move |command| {
        if is_window_list(command) {
            polls += 1;
            let titles: &[&str] = if polls == 1 {
                &["Report"]
            } else {
                &["Budget, 2024", "Report"]
            };
            return reply_list(&titles.iter().map(|t| t.to_string()).collect::<Vec<_>>());
        }
        Ok(String::new())
    });
    let control = control_for(APP, &fake);

    let window = control.do_and_wait_for_new_window(|| Ok(())).unwrap();
    assert_eq!(window, "Budget, 2024");
}

#[test]
fn test_focus_finds_a_current_window_with_commas() {
    let fake = FakeScripting::new(|command| {
        Ok(if is_window_list(command) { "Other\nBudget, 2024" } else { "" }.to_string())
    });
    let mut control = control_for(APP, &fake);
    control.set_current_window("Budget, 2024");

    control.focus().unwrap();
    assert_eq!(
        fake.commands()[1],
        system_event(r#"set value of attribute "AXMain" of window "Budget, 2024" to true"#)
    );
}

#[test]
fn test_window_list_asks_for_one_title_per_line() {
    let fake = FakeScripting::new(|_| Ok("Budget, 2024\r\n\nReport\n".to_string()));
    let control = control_for(APP, &fake);

    assert_eq!(
        control.window_list().unwrap(),
        vec!["Budget, 2024".to_string(), "Report".to_string()]
    );
    assert_eq!(
        fake.commands()[0],
        r#"tell application "System Events"; tell process "ApplicationName"; set AppleScript's text item delimiters to linefeed; (name of every window) as text; end tell; end tell"#
    );
}
