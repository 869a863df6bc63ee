use pretty_assertions::assert_eq;
use std_util::{assert_some, prelude::*};
use strata::{Instance, State, Value};
use strata_core::driver::{Capability, Operation};
use tests::{fixtures, DbTest};

#[tokio::test]
async fn insert_splits_across_the_chain_root_first() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();
    let alice = db
        .create(manager, [("name", Value::from("Alice")), ("num_staff", Value::from(4))])
        .await
        .unwrap();

    assert_eq!(alice.state(), State::Persisted);
    assert_eq!(alice.get("id"), Some(&Value::from(1)));
    assert_eq!(alice.get("kind"), Some(&Value::from("Manager")));

    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"INSERT INTO "employees" ("name", "kind") VALUES ('Alice', 'Manager') RETURNING *;"#,
            r#"INSERT INTO "managers" ("id", "num_staff") VALUES (1, 4) RETURNING *;"#,
        ]
    );
}

#[tokio::test]
async fn inserted_instances_load_back() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let executive = db.kind("Executive").unwrap();
    let created = db
        .create(
            executive,
            [
                ("name", Value::from("Eve")),
                ("num_staff", Value::from(10)),
                ("num_managers", Value::from(2)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(test.log().count(Operation::is_insert), 3);

    let key = assert_some!(created.get("id").cloned());
    let loaded = db.get(executive, key).await.unwrap();

    for (column, value) in created.values() {
        assert_eq!(loaded.get(column), Some(value), "column `{column}`");
    }
}

#[tokio::test]
async fn insert_without_returning_fetches_the_generated_key() {
    let mut test = DbTest::new().with_capability(&Capability::MYSQL);
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();
    let alice = db
        .create(manager, [("name", Value::from("Alice")), ("num_staff", Value::from(4))])
        .await
        .unwrap();

    assert_eq!(alice.get("id"), Some(&Value::from(1)));
    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"INSERT INTO "employees" ("name", "kind") VALUES ('Alice', 'Manager');"#,
            "LAST INSERT KEY",
            r#"INSERT INTO "managers" ("id", "num_staff") VALUES (1, 4);"#,
        ]
    );
}

#[tokio::test]
async fn explicit_key_skips_the_key_round_trip() {
    let mut test = DbTest::new().with_capability(&Capability::MYSQL);
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();
    db.create(
        manager,
        [
            ("id", Value::from(40)),
            ("name", Value::from("Alice")),
            ("num_staff", Value::from(4)),
        ],
    )
    .await
    .unwrap();

    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"INSERT INTO "employees" ("id", "name", "kind") VALUES (40, 'Alice', 'Manager');"#,
            r#"INSERT INTO "managers" ("id", "num_staff") VALUES (40, 4);"#,
        ]
    );
}

#[tokio::test]
async fn single_table_kind_inserts_once() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let cook = db.kind("Cook").unwrap();
    let dot = db.create(cook, [("name", "Dot")]).await.unwrap();

    assert_eq!(dot.get("kind"), Some(&Value::from("Cook")));
    assert_eq!(test.log().count(Operation::is_insert), 1);
}

#[tokio::test]
async fn discriminator_in_the_same_table_is_kept() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let cook = db.kind("Cook").unwrap();
    let staff = db.kind("Staff").unwrap();

    // Staff rows live in `employees`, like Cook's.
    let instance = db
        .create(cook, [("name", "Dot"), ("kind", "Staff")])
        .await
        .unwrap();
    assert_eq!(instance.get("kind"), Some(&Value::from("Staff")));

    let loaded = db.get(staff, instance.get("id").cloned().unwrap()).await;
    assert_eq!(assert_ok!(loaded).kind(), staff);

    // Unknown values resolve to the root, also stored in `employees`.
    let instance = db
        .create(cook, [("name", "Gus"), ("kind", "Contractor")])
        .await
        .unwrap();
    assert_eq!(instance.get("kind"), Some(&Value::from("Contractor")));
}

#[tokio::test]
async fn discriminator_in_another_table_is_replaced() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();
    let instance = db
        .create(
            manager,
            [
                ("name", Value::from("Alice")),
                ("kind", Value::from("Staff")),
                ("num_staff", Value::from(4)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(instance.get("kind"), Some(&Value::from("Manager")));
}

#[tokio::test]
async fn unknown_discriminator_value_is_kept() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();
    let instance = db
        .create(
            manager,
            [
                ("name", Value::from("Alice")),
                ("kind", Value::from("Bogus")),
                ("num_staff", Value::from(4)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(instance.get("kind"), Some(&Value::from("Bogus")));
    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"INSERT INTO "employees" ("name", "kind") VALUES ('Alice', 'Bogus') RETURNING *;"#,
            r#"INSERT INTO "managers" ("id", "num_staff") VALUES (1, 4) RETURNING *;"#,
        ]
    );
}

#[tokio::test]
async fn key_chooser_picks_the_stored_value() {
    let mut builder = fixtures::company();
    builder
        .key_map("Manager", [Value::from("Manager"), Value::from("mgr")])
        .key_chooser(|kind| kind.values.last().cloned());

    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &builder).await;

    let manager = db.kind("Manager").unwrap();
    let alice = db
        .create(manager, [("name", Value::from("Alice")), ("num_staff", Value::from(1))])
        .await
        .unwrap();
    assert_eq!(alice.get("kind"), Some(&Value::from("mgr")));

    let loaded = db.get(manager, alice.get("id").cloned().unwrap()).await.unwrap();
    assert_eq!(loaded.kind(), manager);
    assert_eq!(loaded.get("num_staff"), Some(&Value::from(1)));
}

#[tokio::test]
async fn unknown_column_is_rejected_before_any_statement() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let staff = db.kind("Staff").unwrap();
    let err = assert_err!(db.create(staff, [("name", "Cid"), ("num_staff", "3")]).await);

    assert!(err.is_invalid_configuration());
    assert_eq!(
        err.to_string(),
        "invalid configuration: kind `Staff` has no column `num_staff`"
    );
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn failed_statement_stops_the_write() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();

    // `managers.num_staff` is NOT NULL.
    let err = assert_err!(db.create(manager, [("name", "Alice")]).await);

    assert!(err.is_write_failed());
    assert!(err.root().is_driver_operation_failed());
    assert!(
        err.to_string().starts_with("insert into `managers` failed: "),
        "{err}"
    );

    // The root row is not compensated.
    assert_eq!(
        test.log().drain_sql(&db),
        [r#"INSERT INTO "employees" ("name", "kind") VALUES ('Alice', 'Manager') RETURNING *;"#]
    );

    let employee = db.kind("Employee").unwrap();
    let mut orphan = db.get(employee, 1).await.unwrap();
    assert_eq!(orphan.kind(), manager);

    let err = assert_err!(db.attribute(&mut orphan, "num_staff").await);
    assert!(err.is_record_not_found());
}

#[tokio::test]
async fn failed_key_fetch_is_reported_as_a_write_failure() {
    let mut test = DbTest::new()
        .with_capability(&Capability::MYSQL)
        .fail_when(|op| matches!(op, Operation::LastInsertKey(_)));
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let manager = db.kind("Manager").unwrap();
    let err = assert_err!(
        db.create(manager, [("name", Value::from("Alice")), ("num_staff", Value::from(4))])
            .await
    );

    assert!(err.is_write_failed());
    assert!(
        err.to_string().starts_with("insert into `employees` failed: "),
        "{err}"
    );
    assert_eq!(
        test.log().drain_sql(&db),
        [r#"INSERT INTO "employees" ("name", "kind") VALUES ('Alice', 'Manager');"#]
    );
}

#[tokio::test]
async fn update_touches_only_tables_owning_changed_columns() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let executive = db.kind("Executive").unwrap();
    let mut eve = db.get(executive, 4).await.unwrap();
    test.log().clear();

    db.update(&mut eve, [("name", Value::from("Evelyn")), ("num_managers", Value::from(3))])
        .await
        .unwrap();

    assert_eq!(eve.get("name"), Some(&Value::from("Evelyn")));
    assert_eq!(eve.get("num_managers"), Some(&Value::from(3)));
    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"UPDATE "employees" SET "name" = 'Evelyn' WHERE ("employees"."id" = 4);"#,
            r#"UPDATE "executives" SET "num_managers" = 3 WHERE ("executives"."id" = 4);"#,
        ]
    );

    db.update_by_key(executive, 4, [("num_staff", 11)])
        .await
        .unwrap();
    assert_eq!(
        test.log().drain_sql(&db),
        [r#"UPDATE "managers" SET "num_staff" = 11 WHERE ("managers"."id" = 4);"#]
    );

    let reloaded = db.get(executive, 4).await.unwrap();
    assert_eq!(reloaded.get("name"), Some(&Value::from("Evelyn")));
    assert_eq!(reloaded.get("num_staff"), Some(&Value::from(11)));
    assert_eq!(reloaded.get("num_managers"), Some(&Value::from(3)));
}

#[tokio::test]
async fn empty_update_issues_no_statements() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let no_changes: [(&str, Value); 0] = [];

    db.update_by_key(manager, 1, no_changes).await.unwrap();
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn update_rejects_key_changes_and_unknown_columns() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();

    let err = assert_err!(db.update_by_key(manager, 1, [("id", 9)]).await);
    assert!(err.is_invalid_configuration());

    let err = assert_err!(db.update_by_key(manager, 1, [("num_managers", 9)]).await);
    assert!(err.is_invalid_configuration());

    // Restating the key is not a change.
    db.update_by_key(manager, 1, [("id", 1)]).await.unwrap();

    assert!(test.log().is_empty());
}

#[tokio::test]
async fn delete_runs_most_derived_table_first() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let executive = db.kind("Executive").unwrap();
    db.delete_by_key(executive, 4).await.unwrap();

    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"DELETE FROM "executives" WHERE ("executives"."id" = 4);"#,
            r#"DELETE FROM "managers" WHERE ("managers"."id" = 4);"#,
            r#"DELETE FROM "employees" WHERE ("employees"."id" = 4);"#,
        ]
    );

    let err = assert_err!(db.get(executive, 4).await);
    assert!(err.is_record_not_found());
}

#[tokio::test]
async fn deleted_instances_are_frozen() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let mut ann = db.get(manager, 1).await.unwrap();

    db.delete(&mut ann).await.unwrap();
    assert!(ann.is_destroyed());
    test.log().clear();

    let err = assert_err!(db.delete(&mut ann).await);
    assert!(err.is_stale_instance());
    assert_eq!(
        err.to_string(),
        "stale instance: `Manager` has already been destroyed"
    );

    assert!(assert_err!(db.update(&mut ann, [("num_staff", 1)]).await).is_stale_instance());
    assert!(assert_err!(ann.set("name", "Annie")).is_stale_instance());
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn insert_of_a_persisted_instance_fails() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let employee = db.kind("Employee").unwrap();
    let mut instance = Instance::new(db.schema().kind(employee));
    instance.set("name", "Flo").unwrap();

    db.insert(&mut instance).await.unwrap();
    assert_err!(db.insert(&mut instance).await);
    assert_eq!(test.log().count(Operation::is_insert), 1);
}
