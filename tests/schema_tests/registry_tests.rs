//! Schema Registry Tests
//!
//! Tests for table validation, index assignment and foreign ordering.

use rowwire::schema::{ColumnKind, TableDecl};
use rowwire::{ColumnType, RowWireError, Schema};

// =============================================================================
// Successful Builds
// =============================================================================

#[test]
fn test_indices_follow_declaration_order() {
    let schema = Schema::builder()
        .table("User", [("name", ColumnType::String)])
        .table("Account", [("user", ColumnType::foreign("User"))])
        .table("Transfer", [("from", ColumnType::foreign("Account")), ("amount", ColumnType::Float)])
        .build()
        .unwrap();

    assert_eq!(schema.len(), 3);
    assert_eq!(schema.table("User").unwrap().index(), 1);
    assert_eq!(schema.table("Account").unwrap().index(), 2);
    assert_eq!(schema.table("Transfer").unwrap().index(), 3);

    let names: Vec<_> = schema.tables().map(|t| t.name().to_string()).collect();
    assert_eq!(names, ["User", "Account", "Transfer"]);
    assert_eq!(schema.table_by_index(2).unwrap().name(), "Account");
    assert!(schema.table_by_index(0).is_none());
    assert!(schema.table_by_index(4).is_none());
}

#[test]
fn test_foreign_kind_is_resolved() {
    let schema = Schema::builder()
        .table("User", [("name", ColumnType::String)])
        .table("Account", [("user", ColumnType::foreign("User")), ("balance", ColumnType::Float)])
        .build()
        .unwrap();

    let account = schema.table("Account").unwrap();
    let (index, user) = account.column("user").unwrap();
    assert_eq!(index, 1);
    assert_eq!(
        user.kind,
        ColumnKind::Foreign {
            table: "User".to_string(),
            index: 1
        }
    );
    assert!(account.has_foreign_columns());
    assert!(!schema.table("User").unwrap().has_foreign_columns());

    let (index, balance) = account.column("balance").unwrap();
    assert_eq!(index, 2);
    assert_eq!(balance.kind, ColumnKind::Float);
    assert!(account.column("id").is_none());
}

#[test]
fn test_empty_schema_and_empty_table() {
    let schema = Schema::builder().build().unwrap();
    assert!(schema.is_empty());

    let schema = Schema::builder()
        .table("Marker", Vec::<(&str, ColumnType)>::new())
        .build()
        .unwrap();
    assert_eq!(schema.table("Marker").unwrap().column_count(), 0);
}

#[test]
fn test_unknown_table_lookup() {
    let schema = Schema::builder().table("User", [("name", ColumnType::String)]).build().unwrap();
    assert!(matches!(schema.table("Nope"), Err(RowWireError::UnknownTable(name)) if name == "Nope"));
}

// =============================================================================
// Naming Rules
// =============================================================================

fn build_single(table: &str, column: &str) -> rowwire::Result<Schema> {
    Schema::builder().table(table, [(column, ColumnType::Integer)]).build()
}

#[test]
fn test_rejects_bad_table_names() {
    for name in ["", "1User", "_User", "id"] {
        assert!(
            matches!(build_single(name, "age"), Err(RowWireError::InvalidSchema(_))),
            "table name {:?} should be rejected",
            name
        );
    }
}

#[test]
fn test_rejects_bad_column_names() {
    for name in ["", "9lives", "_secret", "id"] {
        assert!(
            matches!(build_single("User", name), Err(RowWireError::InvalidSchema(_))),
            "column name {:?} should be rejected",
            name
        );
    }
}

#[test]
fn test_rejects_duplicate_table() {
    let result = Schema::builder()
        .table("User", [("a", ColumnType::Integer)])
        .table("User", [("b", ColumnType::Integer)])
        .build();
    assert!(matches!(result, Err(RowWireError::InvalidSchema(_))));
}

#[test]
fn test_rejects_duplicate_column() {
    let result = Schema::builder()
        .table("User", [("name", ColumnType::String), ("name", ColumnType::Integer)])
        .build();
    assert!(matches!(result, Err(RowWireError::InvalidSchema(_))));
}

#[test]
fn test_same_column_name_in_different_tables() {
    let result = Schema::builder()
        .table("User", [("name", ColumnType::String)])
        .table("Pet", [("name", ColumnType::String)])
        .build();
    assert!(result.is_ok());
}

#[test]
fn test_rejects_malformed_foreign_type() {
    let result = Schema::builder()
        .table("User", [("name", ColumnType::String)])
        .table("Account", [("user", ColumnType::foreign("2fast"))])
        .build();
    assert!(matches!(result, Err(RowWireError::InvalidSchema(_))));
}

// =============================================================================
// Foreign Ordering
// =============================================================================

#[test]
fn test_forward_reference_rejected() {
    let result = Schema::builder()
        .table("Account", [("user", ColumnType::foreign("User")), ("balance", ColumnType::Float)])
        .table("User", [("firstName", ColumnType::String)])
        .build();

    match result {
        Err(RowWireError::ForwardForeignReference { table, column, target }) => {
            assert_eq!(table, "Account");
            assert_eq!(column, "user");
            assert_eq!(target, "User");
        }
        other => panic!("expected ForwardForeignReference, got {:?}", other),
    }
}

#[test]
fn test_self_reference_rejected() {
    let result = Schema::builder()
        .table("Node", [("parent", ColumnType::foreign("Node"))])
        .build();
    assert!(matches!(result, Err(RowWireError::ForwardForeignReference { .. })));
}

#[test]
fn test_unknown_foreign_table_rejected() {
    let result = Schema::builder()
        .table("Account", [("owner", ColumnType::foreign("Person"))])
        .build();
    assert!(matches!(
        result,
        Err(RowWireError::UnknownForeignTable { ref target, .. }) if target == "Person"
    ));
}

#[test]
fn test_name_errors_win_over_foreign_errors() {
    // the forward reference in the first table is reported only after all
    // names have passed, so the bad column name in the second wins
    let result = Schema::builder()
        .table("Account", [("user", ColumnType::foreign("User"))])
        .table("User", [("_name", ColumnType::String)])
        .build();
    assert!(matches!(result, Err(RowWireError::InvalidSchema(_))));
}

// =============================================================================
// Textual Declarations
// =============================================================================

#[test]
fn test_parse_table_declarations() {
    let user: TableDecl = "User(firstName: string, lastName: str, height: float, age: int)"
        .parse()
        .unwrap();
    assert_eq!(user.name, "User");
    assert_eq!(user.columns.len(), 4);
    assert_eq!(user.columns[3], ("age".to_string(), ColumnType::Integer));

    let account: TableDecl = " Account( user: User , balance: float ) ".parse().unwrap();
    assert_eq!(account.columns[0], ("user".to_string(), ColumnType::foreign("User")));

    let schema = Schema::from_decls([user, account]).unwrap();
    assert_eq!(schema.table("Account").unwrap().index(), 2);
}

#[test]
fn test_parse_rejects_malformed_declarations() {
    for text in ["User", "User(name string)", "User(name: string", "User(name: )"] {
        assert!(
            matches!(text.parse::<TableDecl>(), Err(RowWireError::InvalidSchema(_))),
            "{:?} should not parse",
            text
        );
    }
}

#[test]
fn test_parse_empty_column_list() {
    let decl: TableDecl = "Marker()".parse().unwrap();
    assert!(decl.columns.is_empty());
}
