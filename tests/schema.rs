use carpool_map::diagnostics::ABORT_LINE;
use carpool_map::schema::{ColumnClaims, ColumnRole, Field, GroupRole, Schema};
use carpool_map::{MapError, parse};
use pretty_assertions::assert_eq;

fn infer(header: &[&str]) -> (Result<Schema, MapError>, Vec<String>) {
    let mut log: Vec<String> = Vec::new();
    let schema = Schema::infer(header, &mut log);
    (schema, log)
}

#[test]
fn groups_and_fields_follow_header_order() {
    let (schema, _) = infer(&[
        "Address",
        "Parent B",
        "Parent A",
        "Parent A Home Phone",
        "Child 1",
        "Parent B Email",
        "Child 1 Grade",
        "Passenger Capacity",
    ]);
    let schema = schema.expect("schema inferred");

    let guardian_names: Vec<&str> = schema
        .groups(GroupRole::Guardian)
        .iter()
        .map(|group| group.name.as_str())
        .collect();
    assert_eq!(guardian_names, vec!["B", "A"]);
    assert_eq!(schema.address_column, 0);
    assert_eq!(schema.capacity_column, 7);

    let parent_a = &schema.guardian_groups[1];
    assert_eq!(parent_a.column, 2);
    assert_eq!(
        parent_a.fields,
        vec![Field {
            name: "Home Phone".to_string(),
            column: 3,
        }]
    );

    let child = &schema.dependent_groups[0];
    assert_eq!(child.role, GroupRole::Dependent);
    assert_eq!(child.column, 4);
    assert_eq!(child.fields[0].name, "Grade");
    assert_eq!(child.fields[0].column, 6);
}

#[test]
fn unrecognised_columns_are_ignored() {
    let (schema, log) = infer(&[
        "Timestamp",
        "Parent",
        "Parent 1",
        "Notes for driver",
        "",
        "Passenger Capacity",
        "Address",
        "",
    ]);
    let schema = schema.expect("schema inferred");

    assert_eq!(schema.guardian_groups.len(), 1);
    assert!(schema.dependent_groups.is_empty());
    assert_eq!(
        log,
        vec![
            "Found 1 parent groups per row".to_string(),
            "Found 0 child groups per row".to_string(),
        ]
    );
}

#[test]
fn duplicate_headers_are_rejected_after_whitespace_normalisation() {
    let (schema, log) = infer(&[
        "Parent 1",
        "  Parent   1 ",
        "Passenger Capacity",
        "Address",
    ]);

    match schema {
        Err(MapError::DuplicateHeader(header)) => assert_eq!(header, "Parent 1"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(
        log,
        vec![
            "!Duplicate header found: Parent 1".to_string(),
            ABORT_LINE.to_string(),
        ]
    );
}

#[test]
fn repeated_blank_headers_are_duplicates() {
    let (schema, log) = infer(&["Parent 1", "", "", "Passenger Capacity", "Address"]);

    match schema {
        Err(MapError::DuplicateHeader(header)) => assert_eq!(header, ""),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(log.last().map(String::as_str), Some(ABORT_LINE));
}

#[test]
fn trailing_blank_headers_are_padding() {
    let (schema, _) = infer(&["Parent 1", "Passenger Capacity", "Address", "", "", ""]);
    let schema = schema.expect("schema inferred");

    assert_eq!(schema.address_column, 2);
}

#[test]
fn duplicate_header_creates_no_entities() {
    let rows = vec![
        vec!["Parent 1", "Parent 1", "Passenger Capacity", "Address"],
        vec!["Alice", "Alice", "", "1 Elm St"],
    ];
    let mut log: Vec<String> = Vec::new();

    assert!(matches!(
        parse(&rows, &mut log),
        Err(MapError::DuplicateHeader(_))
    ));
}

#[test]
fn missing_capacity_column_is_fatal() {
    let (schema, log) = infer(&["Parent 1", "Address"]);

    assert!(matches!(
        schema,
        Err(MapError::MissingColumn("Passenger Capacity"))
    ));
    assert!(log.contains(&"!No Passenger Capacity column set".to_string()));
    assert_eq!(log.last().map(String::as_str), Some(ABORT_LINE));
}

#[test]
fn missing_address_column_is_fatal() {
    let (schema, log) = infer(&["Parent 1", "Passenger Capacity"]);

    assert!(matches!(schema, Err(MapError::MissingColumn("Address"))));
    assert!(log.contains(&"!No Address column set".to_string()));
}

#[test]
fn attribute_for_unknown_group_names_the_column() {
    let (schema, log) = infer(&[
        "Parent 1",
        "Child 1",
        "Passenger Capacity",
        "Address",
        "Parent 1 Phone",
        "Child 2 Grade",
    ]);

    match schema {
        Err(MapError::UnknownGroup {
            role,
            group,
            column,
        }) => {
            assert_eq!(role, "Child");
            assert_eq!(group, "2");
            assert_eq!(column, 6);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(
        log[log.len() - 2],
        "!Unknown child column: Child 2 referenced in column 6"
    );
}

#[test]
fn attribute_does_not_cross_roles() {
    // Group "1" only exists as a parent group.
    let (schema, _) = infer(&["Parent 1", "Passenger Capacity", "Address", "Child 1 Grade"]);

    assert!(matches!(
        schema,
        Err(MapError::UnknownGroup { role: "Child", .. })
    ));
}

#[test]
fn column_claims_reject_second_claim() {
    let mut claims = ColumnClaims::new(3);
    assert_eq!(claims.claim(1, ColumnRole::Address).expect("first claim"), 1);

    let err = claims
        .claim(1, ColumnRole::Capacity)
        .expect_err("second claim rejected");
    match err {
        MapError::ColumnClaimedTwice {
            column,
            first,
            second,
        } => {
            assert_eq!(column, 2);
            assert_eq!(first, ColumnRole::Address);
            assert_eq!(second, ColumnRole::Capacity);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(claims.role(1), Some(&ColumnRole::Address));
    assert_eq!(claims.unclaimed().collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn column_roles_render_as_header_text() {
    let role = ColumnRole::Attribute {
        role: GroupRole::Guardian,
        group: "1".to_string(),
        field: "Home Phone".to_string(),
    };
    assert_eq!(role.to_string(), "Parent 1 Home Phone");
    assert_eq!(ColumnRole::Capacity.to_string(), "Passenger Capacity");
}
