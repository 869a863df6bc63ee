use pretty_assertions::assert_eq;
use std_util::prelude::*;
use strata::{Expr, Instance, KindId, Query, SubclassLoad, Value};
use tests::{fixtures, DbTest};

fn names(instances: &[Instance]) -> Vec<&str> {
    instances
        .iter()
        .map(|instance| instance.get("name").and_then(Value::as_str).unwrap())
        .collect()
}

fn kinds(instances: &[Instance]) -> Vec<&str> {
    instances
        .iter()
        .map(|instance| instance.kind_name().as_str())
        .collect()
}

#[tokio::test]
async fn root_query_resolves_each_row_kind() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let instances = db.all(employee).await.unwrap();

    assert_eq!(
        kinds(&instances),
        ["Manager", "Manager", "Staff", "Executive", "Cook", "Employee"]
    );

    // Lazy by default: descendant columns are not loaded.
    assert_none!(instances[0].get("num_staff"));

    assert_eq!(
        test.log().drain_sql(&db),
        [r#"SELECT * FROM "employees";"#]
    );
}

#[tokio::test]
async fn descendant_query_joins_and_filters() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let instances = db.all(manager).await.unwrap();

    assert_eq!(names(&instances), ["Ann", "Bob", "Eve"]);
    assert_eq!(kinds(&instances), ["Manager", "Manager", "Executive"]);
    assert_eq!(instances[1].get("num_staff"), Some(&Value::from(5)));

    // Executive's own column is not part of Manager's dataset.
    assert_none!(instances[2].get("num_managers"));

    assert_eq!(
        test.log().drain_sql(&db),
        [concat!(
            r#"SELECT "employees"."id", "employees"."name", "employees"."kind", "managers"."num_staff" "#,
            r#"FROM "employees" INNER JOIN "managers" ON ("managers"."id" = "employees"."id") "#,
            r#"WHERE ("employees"."kind" IN ('Manager', 'Executive'));"#,
        )]
    );
}

#[tokio::test]
async fn kind_without_table_filters_the_parent_table() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let staff = db.kind("Staff").unwrap();
    let cook = db.kind("Cook").unwrap();

    assert_eq!(names(&db.all(staff).await.unwrap()), ["Cid", "Dot"]);
    assert_eq!(names(&db.all(cook).await.unwrap()), ["Dot"]);

    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"SELECT * FROM "employees" WHERE ("employees"."kind" IN ('Staff', 'Cook'));"#,
            r#"SELECT * FROM "employees" WHERE ("employees"."kind" IN ('Cook'));"#,
        ]
    );
}

#[tokio::test]
async fn unqualified_filters_resolve_to_the_owning_table() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let query = Query::new(manager).filter(Expr::gt(Expr::attr("num_staff"), 4));
    let instances = db.all(query).await.unwrap();

    assert_eq!(names(&instances), ["Bob", "Eve"]);

    let sql = test.log().pop_sql(&db).unwrap();
    assert!(
        sql.ends_with(r#"AND ("managers"."num_staff" > 4));"#),
        "{sql}"
    );
}

#[tokio::test]
async fn filter_on_a_column_outside_the_kind_fails() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let query = Query::new(employee).filter(Expr::eq(Expr::attr("num_staff"), 3));

    let err = assert_err!(db.all(query).await);
    assert!(err.is_invalid_configuration());
    assert_eq!(
        err.to_string(),
        "invalid configuration: kind `Employee` has no column `num_staff`"
    );
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn unknown_discriminator_value_loads_as_queried_kind() {
    let mut test = DbTest::new();
    let fixture = format!(
        "{}INSERT INTO employees (id, name, kind) VALUES (7, 'Gus', 'Contractor');",
        fixtures::company_with_rows()
    );
    let db = test.setup_db(&fixture, &fixtures::company()).await;

    let employee = db.kind("Employee").unwrap();
    let gus = db.get(employee, 7).await.unwrap();

    assert_eq!(gus.kind(), employee);
    assert_eq!(gus.get("kind"), Some(&Value::from("Contractor")));

    let manager = db.kind("Manager").unwrap();
    let err = assert_err!(db.get(manager, 7).await);
    assert!(err.is_record_not_found());
}

#[tokio::test]
async fn get_loads_one_instance_by_key() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let executive = db.kind("Executive").unwrap();
    let eve = db.get(executive, 4).await.unwrap();

    assert_eq!(eve.get("name"), Some(&Value::from("Eve")));
    assert_eq!(eve.get("num_staff"), Some(&Value::from(10)));
    assert_eq!(eve.get("num_managers"), Some(&Value::from(2)));

    let err = assert_err!(db.get(executive, 99).await);
    assert!(err.is_record_not_found());
    assert_eq!(err.to_string(), "record not found: kind=Executive key=99");
}

#[tokio::test]
async fn eager_load_batches_one_query_per_table_owning_kind() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let query = Query::new(employee)
        .filter(Expr::in_list(
            Expr::attr("kind"),
            [Value::from("Manager"), Value::from("Staff")],
        ))
        .eager();

    let instances = db.all(query).await.unwrap();

    assert_eq!(kinds(&instances), ["Manager", "Manager", "Staff"]);
    assert_eq!(instances[0].get("num_staff"), Some(&Value::from(3)));
    assert_eq!(instances[1].get("num_staff"), Some(&Value::from(5)));
    assert_none!(instances[2].get("num_staff"));

    assert_eq!(
        test.log().drain_sql(&db),
        [
            r#"SELECT * FROM "employees" WHERE ("employees"."kind" IN ('Manager', 'Staff'));"#,
            concat!(
                r#"SELECT "employees"."id", "managers"."num_staff" "#,
                r#"FROM "employees" INNER JOIN "managers" ON ("managers"."id" = "employees"."id") "#,
                r#"WHERE ("employees"."id" IN (1, 2));"#,
            ),
        ]
    );
}

#[tokio::test]
async fn eager_load_reaches_every_table_of_the_descendant() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let instances = db.all(Query::new(employee).eager()).await.unwrap();

    let eve = &instances[3];
    assert_eq!(eve.kind_name().as_str(), "Executive");
    assert_eq!(eve.get("num_staff"), Some(&Value::from(10)));
    assert_eq!(eve.get("num_managers"), Some(&Value::from(2)));

    // Root query, then one query for managers and one for executives.
    assert_eq!(test.log().len(), 3);
}

#[tokio::test]
async fn eager_and_lazy_loading_agree() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let eager = db.all(Query::new(employee).eager()).await.unwrap();
    let mut lazy = db.all(Query::new(employee).lazy()).await.unwrap();

    assert_eq!(eager.len(), lazy.len());

    for (eager, lazy) in eager.iter().zip(lazy.iter_mut()) {
        assert_eq!(eager.kind(), lazy.kind());

        for column in db.schema().mapping_for(eager.kind()).column_names() {
            let loaded = db.attribute(lazy, column).await.unwrap();
            assert_eq!(eager.get(column), Some(&loaded), "column `{column}`");
        }
    }
}

#[tokio::test]
async fn lazy_attribute_is_fetched_once() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let mut eve = db.get(employee, 4).await.unwrap();
    test.log().clear();

    assert_eq!(
        db.attribute(&mut eve, "num_managers").await.unwrap(),
        Value::from(2)
    );
    assert_eq!(
        test.log().drain_sql(&db),
        [r#"SELECT "executives"."num_managers" FROM "executives" WHERE ("executives"."id" = 4);"#]
    );

    assert_eq!(
        db.attribute(&mut eve, "num_managers").await.unwrap(),
        Value::from(2)
    );
    assert!(test.log().is_empty());

    let err = assert_err!(db.attribute(&mut eve, "salary").await);
    assert!(err.is_invalid_configuration());
}

#[tokio::test]
async fn attribute_of_a_new_instance_needs_a_key() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let mut instance = Instance::new(db.schema().kind(manager));

    let err = assert_err!(db.attribute(&mut instance, "num_staff").await);
    assert_eq!(
        err.to_string(),
        "cannot load `num_staff` for a `Manager` instance without a primary key"
    );
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn attach_subclass_columns_on_loaded_instances() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let manager = db.kind("Manager").unwrap();

    // Loaded through Manager: only Eve is missing columns.
    let mut instances = db.all(manager).await.unwrap();
    test.log().clear();

    db.attach_subclass_columns(&mut instances, manager)
        .await
        .unwrap();

    assert_eq!(instances[2].get("num_managers"), Some(&Value::from(2)));
    assert_eq!(
        test.log().drain_sql(&db),
        [concat!(
            r#"SELECT "managers"."id", "executives"."num_managers" "#,
            r#"FROM "managers" INNER JOIN "executives" ON ("executives"."id" = "managers"."id") "#,
            r#"WHERE ("managers"."id" IN (4));"#,
        )]
    );

    // Nothing past the root chain for plain employees and staff.
    let mut plain = db
        .all(Query::new(employee).filter(Expr::in_list(
            Expr::attr("kind"),
            [Value::from("Employee"), Value::from("Cook")],
        )))
        .await
        .unwrap();
    test.log().clear();

    db.attach_subclass_columns(&mut plain, employee)
        .await
        .unwrap();
    assert!(test.log().is_empty());
}

#[tokio::test]
async fn duplicate_subclass_rows_fan_out() {
    let fixture = r#"
        CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT NOT NULL, kind TEXT NOT NULL);
        CREATE TABLE managers (id INTEGER, num_staff INTEGER);

        INSERT INTO employees (id, name, kind) VALUES (1, 'Ann', 'Manager'), (2, 'Bob', 'Employee');
        INSERT INTO managers (id, num_staff) VALUES (1, 3), (1, 4);
    "#;

    let mut builder = strata::db::Builder::default();
    builder
        .root("Employee")
        .key("kind")
        .kind("Manager", "Employee");

    let mut test = DbTest::new();
    let db = test.setup_db(fixture, &builder).await;

    let employee = db.kind("Employee").unwrap();
    let instances = db.all(Query::new(employee).eager()).await.unwrap();

    assert_eq!(names(&instances), ["Ann", "Ann", "Bob"]);
    assert_eq!(instances[0].get("num_staff"), Some(&Value::from(3)));
    assert_eq!(instances[1].get("num_staff"), Some(&Value::from(4)));
    assert_none!(instances[2].get("num_staff"));
}

#[tokio::test]
async fn hierarchy_default_strategy_applies() {
    let mut builder = fixtures::company();
    builder.subclass_load(SubclassLoad::Eager);

    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &builder)
        .await;

    let employee = db.kind("Employee").unwrap();
    let ann = db.get(employee, 1).await.unwrap();
    assert_eq!(ann.get("num_staff"), Some(&Value::from(3)));

    // The lazy override still works for an unrestricted hierarchy.
    let instances = db.all(Query::new(employee).lazy()).await.unwrap();
    assert_none!(instances[0].get("num_staff"));
}

#[tokio::test]
async fn restricted_strategy_cannot_be_overridden() {
    let mut builder = fixtures::company();
    builder.subclass_load(SubclassLoad::EagerOnly);

    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &builder)
        .await;

    let employee = db.kind("Employee").unwrap();
    let err = assert_err!(db.all(Query::new(employee).lazy()).await);
    assert!(err.is_invalid_configuration());
    assert!(test.log().is_empty());

    assert_eq!(db.all(employee).await.unwrap().len(), 6);
}

#[tokio::test]
async fn streaming_yields_instances() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let mut cursor = db.stream(manager).unwrap();

    // Nothing runs until the cursor is polled.
    assert!(test.log().is_empty());

    let first = cursor.next().await.unwrap().unwrap();
    assert_eq!(first.get("name"), Some(&Value::from("Ann")));

    let rest: Vec<Instance> = cursor.collect().await.unwrap();
    assert_eq!(names(&rest), ["Bob", "Eve"]);
    assert_eq!(test.log().len(), 1);
}

#[tokio::test]
async fn lazy_reads_between_streamed_instances() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let mut cursor = db.stream(employee).unwrap();

    let mut ann = cursor.next().await.unwrap().unwrap();
    let num_staff = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        db.attribute(&mut ann, "num_staff"),
    )
    .await
    .expect("connection still held by the cursor");
    assert_eq!(num_staff.unwrap(), Value::from(3));

    let bob = cursor.next().await.unwrap().unwrap();
    assert_eq!(bob.get("name"), Some(&Value::from("Bob")));
    assert_eq!(test.log().len(), 2);
}

#[tokio::test]
async fn streaming_rejects_eager_loading() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let employee = db.kind("Employee").unwrap();
    let err = assert_err!(db.stream(Query::new(employee).eager()));
    assert!(err.is_unsupported_feature());
}

#[tokio::test]
async fn refresh_reloads_every_column() {
    let mut test = DbTest::new();
    let db = test
        .setup_db(&fixtures::company_with_rows(), &fixtures::company())
        .await;

    let manager = db.kind("Manager").unwrap();
    let mut ann = db.get(manager, 1).await.unwrap();

    db.update_by_key(manager, 1, [("num_staff", 8)]).await.unwrap();
    assert_eq!(ann.get("num_staff"), Some(&Value::from(3)));

    db.refresh(&mut ann).await.unwrap();
    assert_eq!(ann.get("num_staff"), Some(&Value::from(8)));

    db.delete_by_key(manager, 1).await.unwrap();
    let err = assert_err!(db.refresh(&mut ann).await);
    assert!(err.is_record_not_found());
}

#[tokio::test]
async fn first_returns_none_for_no_rows() {
    let mut test = DbTest::new();
    let db = test.setup_db(fixtures::COMPANY, &fixtures::company()).await;

    let employee = db.kind("Employee").unwrap();
    assert_none!(db.first(employee).await.unwrap());
}

#[tokio::test]
async fn table_owning_kind_under_a_kind_without_a_table() {
    let mut test = DbTest::new();
    let fixture = format!("{}{}", fixtures::company_with_rows(), fixtures::DIRECTORS);
    let db = test
        .setup_db(&fixture, &fixtures::company_with_directors())
        .await;

    let ceo = db.kind("Ceo").unwrap();
    let director = db.kind("Director").unwrap();

    let tables = |kind: KindId| -> Vec<String> {
        db.schema()
            .mapping_for(kind)
            .chain
            .iter()
            .map(|table| db.schema().table_name(*table).to_string())
            .collect()
    };
    assert_eq!(tables(ceo), ["employees", "managers"]);
    assert_eq!(tables(director), ["employees", "managers", "directors"]);

    let ceos = db.all(ceo).await.unwrap();
    assert_eq!(names(&ceos), ["Gus", "Hal"]);
    assert_eq!(kinds(&ceos), ["Director", "Ceo"]);

    let gus = db.get(director, 7).await.unwrap();
    assert_eq!(gus.get("num_staff"), Some(&Value::from(6)));
    assert_eq!(gus.get("board_size"), Some(&Value::from(9)));

    // `directors` is reached through the dataset registered on `Manager`.
    let manager = db.kind("Manager").unwrap();
    test.log().clear();
    let managers = db.all(Query::new(manager).eager()).await.unwrap();

    assert_eq!(names(&managers), ["Ann", "Bob", "Eve", "Gus", "Hal"]);
    assert_eq!(managers[2].get("num_managers"), Some(&Value::from(2)));
    assert_eq!(managers[3].get("board_size"), Some(&Value::from(9)));
    assert_none!(managers[4].get("board_size"));
    assert_eq!(test.log().len(), 3);
}
