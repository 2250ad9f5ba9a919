use pretty_assertions::assert_eq;
use tests::prelude::*;

fn one_to_many_from_shapes() {
    let model = models!(big_mak(), pickle()).build().unwrap();
    let big_mak = entity(&model, "BigMak");
    let pickle = entity(&model, "Pickle");

    assert_eq!(model.foreign_keys().count(), 1);
    let fk = model.foreign_keys().next().unwrap();

    assert_eq!(fk.principal(), big_mak);
    assert_eq!(fk.dependent(), pickle);
    assert_eq!(names(&model, fk.properties()), ["BigMakId"]);
    assert!(!fk.is_unique());
    assert!(!fk.is_required());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::ClientSetNull);

    let big_mak_id = model.property(fk.properties()[0]);
    assert!(big_mak_id.is_shadow());
    assert_eq!(big_mak_id.ty(), Type::I32.nullable());

    let principal_key = model.key(fk.principal_key());
    assert_eq!(names(&model, principal_key.properties()), ["Id"]);
}

fn one_to_many_with_declared_foreign_key() {
    let model = models!(big_mak(), pickle().scalar("BigMakId", Type::I32))
        .build()
        .unwrap();

    let fk = model.foreign_keys().next().unwrap();
    assert!(!model.property(fk.properties()[0]).is_shadow());
    assert!(fk.is_required());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::Cascade);
}

fn registration_order_is_irrelevant() {
    let forward = models!(big_mak(), pickle()).build().unwrap();
    let backward = models!(pickle(), big_mak()).build().unwrap();

    for model in [forward, backward] {
        let fk = model.foreign_keys().next().unwrap();
        assert_eq!(model.foreign_keys().count(), 1);
        assert_eq!(model.entity_type(fk.dependent()).name(), "Pickle");
        assert_eq!(names(&model, fk.properties()), ["BigMakId"]);
    }
}

fn one_to_one_dependent_holds_the_key() {
    let model = models!(order(), order_details()).build().unwrap();
    let order = entity(&model, "Order");
    let details = entity(&model, "OrderDetails");

    let fk = model.foreign_keys().next().unwrap();
    assert!(fk.is_unique());
    assert_eq!(fk.principal(), order);
    assert_eq!(fk.dependent(), details);
    assert_eq!(names(&model, fk.properties()), ["OrderId"]);

    let details_navigation = model.entity_type(order).navigation_by_name("Details").unwrap();
    assert!(!details_navigation.points_to_principal());
    assert!(!details_navigation.is_collection(&model));
}

fn self_reference() {
    let model = models!(employee()).build().unwrap();
    let employee = entity(&model, "Employee");

    let fk = model.foreign_keys().next().unwrap();
    assert!(fk.is_self_referencing());
    assert_eq!(names(&model, fk.properties()), ["EmployeeId"]);

    let manager = model.entity_type(employee).navigation_by_name("Manager").unwrap();
    let reports = model.entity_type(employee).navigation_by_name("Reports").unwrap();
    assert!(manager.points_to_principal());
    assert!(reports.is_collection(&model));
    assert_eq!(manager.inverse(&model), Some(reports.id()));
}

fn members_of_every_entity() {
    let model = models!(big_mak(), pickle(), order(), order_details(), employee())
        .build()
        .unwrap();

    let employee = model.entity_type(entity(&model, "Employee"));
    assert_eq_unordered!(
        employee.properties().map(|property| property.name()),
        ["Id", "Name", "EmployeeId"]
    );
    assert_eq_unordered!(
        employee.navigations().map(|navigation| navigation.name()),
        ["Manager", "Reports"]
    );
    assert_eq!(model.foreign_keys().count(), 3);
}

fn key_suffix_option() {
    let mut builder = ModelBuilder::new();
    builder.key_suffix("Key");
    builder
        .register(Shape::new("Bun").scalar("Key", Type::I64))
        .unwrap();
    builder
        .register(
            Shape::new("Sesame")
                .scalar("Key", Type::I64)
                .reference("Bun", "Bun"),
        )
        .unwrap();

    let model = builder.build().unwrap();
    let fk = model.foreign_keys().next().unwrap();
    assert_eq!(names(&model, fk.properties()), ["BunKey"]);
}

fn without_conventions_nothing_is_discovered() {
    let mut builder = ModelBuilder::with_conventions(relmap::ConventionSet::empty());
    builder.register(pickle()).unwrap();

    assert_eq!(builder.model().foreign_keys().count(), 0);

    let err = builder.build().unwrap_err();
    assert!(err.is_invalid_model());
}

tests!(
    one_to_many_from_shapes,
    one_to_many_with_declared_foreign_key,
    registration_order_is_irrelevant,
    one_to_one_dependent_holds_the_key,
    self_reference,
    members_of_every_entity,
    key_suffix_option,
    without_conventions_nothing_is_discovered,
);
