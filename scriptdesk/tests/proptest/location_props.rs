//! Property-based tests for location text
//!
//! Any location built from valid segments prints to text that parses back
//! to the same location, and the command splitter keeps quoted semicolons.

use proptest::prelude::*;
use scriptdesk::command::split_statements;
use scriptdesk::{at, ElementKind, Identifier, Location};

fn identifier() -> impl Strategy<Value = Identifier> {
    prop_oneof![
        (1i64..10_000).prop_map(Identifier::Index),
        "\\PC{0,16}".prop_map(Identifier::Name),
    ]
}

fn location() -> impl Strategy<Value = Location> {
    prop::collection::vec(
        (prop::sample::select(ElementKind::ALL.to_vec()), identifier()),
        1..6,
    )
    .prop_map(|segments| {
        segments
            .into_iter()
            .fold(at(), |location, (kind, id)| location.push(kind, id))
    })
}

proptest! {
    #[test]
    fn test_location_text_parses_back(location in location()) {
        let text = location.to_string();
        let parsed: Location = text.parse().unwrap();
        prop_assert_eq!(parsed, location);
    }

    #[test]
    fn test_nonpositive_indexes_never_parse(index in -1000i64..1, name in "[a-z]{1,8}") {
        let text = format!("button {index} of window \"{name}\"");
        prop_assert!(text.parse::<Location>().is_err());
    }

    #[test]
    fn test_parser_doesnt_panic_on_random_input(s in "\\PC*") {
        let _ = s.parse::<Location>();
    }

    #[test]
    fn test_quoted_semicolons_stay_in_their_statement(
        value in "[a-z; ]{0,20}",
    ) {
        let command = format!("tell application \"TextEdit\"; set text of document 1 to \"{value}\"; end tell");
        let statements = split_statements(&command);
        prop_assert_eq!(statements.len(), 3);
        let expected = format!("set text of document 1 to \"{value}\"");
        prop_assert_eq!(&statements[1], &expected);
    }
}
