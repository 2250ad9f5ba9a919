use pretty_assertions::assert_eq;
use tests::prelude::*;

fn configure_discovered_relationship() {
    let mut builder = models!(big_mak(), pickle());
    let discovered = builder.model().foreign_keys().next().unwrap().id();

    let fk = builder
        .entity("BigMak")
        .unwrap()
        .has_many("Pickle", Some("Pickles"))
        .with_one(Some("BigMak"))
        .unwrap()
        .id();

    assert_eq!(fk, discovered);

    let model = builder.build().unwrap();
    let fk = model.foreign_key(fk);
    assert_eq!(model.foreign_keys().count(), 1);
    assert_eq!(fk.source(), Provenance::Explicit);
    assert_eq!(fk.unique_source(), Some(Provenance::Explicit));

    for navigation in fk.navigations() {
        assert_eq!(model.navigation(navigation).source(), Provenance::Explicit);
    }
}

fn reference_with_many() {
    let mut builder = models!(plain("Blog"), plain("Post"));

    builder
        .entity("Post")
        .unwrap()
        .has_one("Blog", Some("Blog"))
        .with_many(Some("Posts"))
        .unwrap();

    let model = builder.build().unwrap();
    let blog = entity(&model, "Blog");
    let post = entity(&model, "Post");

    let fk = model.foreign_keys().next().unwrap();
    assert_eq!(fk.principal(), blog);
    assert_eq!(fk.dependent(), post);
    assert!(!fk.is_unique());
    assert_eq!(names(&model, fk.properties()), ["BlogId"]);
    assert!(model.property(fk.properties()[0]).is_shadow());

    let posts = model.entity_type(blog).navigation_by_name("Posts").unwrap();
    assert!(posts.is_collection(&model));
    assert_eq!(posts.target(&model), post);
}

fn navigation_on_one_side_only() {
    let mut builder = models!(plain("Blog"), plain("Post"));

    builder
        .entity("Blog")
        .unwrap()
        .has_many("Post", Some("Posts"))
        .with_one(None)
        .unwrap();

    let model = builder.build().unwrap();
    let post = model.entity_type(entity(&model, "Post"));

    assert_eq!(post.navigations().count(), 0);
    assert!(post.property_by_name("BlogId").unwrap().is_shadow());
}

fn named_foreign_key_replaces_shadow() {
    let mut builder = models!(plain("Blog"), plain("Post").scalar("BlogKey", Type::I32));

    builder
        .entity("Blog")
        .unwrap()
        .has_many("Post", Some("Posts"))
        .with_one(Some("Blog"))
        .unwrap()
        .foreign_key(&["BlogKey"])
        .unwrap();

    let model = builder.build().unwrap();
    let post = model.entity_type(entity(&model, "Post"));
    let fk = model.foreign_keys().next().unwrap();

    assert_eq!(names(&model, fk.properties()), ["BlogKey"]);
    assert_eq!(fk.properties_source(), Some(Provenance::Explicit));
    assert!(fk.is_required());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::Cascade);

    // The synthesized property is gone
    assert!(post.property_by_name("BlogId").is_none());
}

fn named_foreign_key_is_created_as_shadow() {
    let mut builder = models!(plain("Blog"), plain("Post"));

    builder
        .entity("Post")
        .unwrap()
        .has_one("Blog", Some("Blog"))
        .with_many(None)
        .unwrap()
        .foreign_key(&["OwningBlog"])
        .unwrap();

    let model = builder.build().unwrap();
    let fk = model.foreign_keys().next().unwrap();
    let property = model.property(fk.properties()[0]);

    assert_eq!(property.name(), "OwningBlog");
    assert!(property.is_shadow());
    assert_eq!(property.source(), Provenance::Explicit);
    assert!(!fk.is_required());
}

fn required_relationship() {
    let mut builder = models!(big_mak(), pickle());

    builder
        .entity("Pickle")
        .unwrap()
        .has_one("BigMak", Some("BigMak"))
        .with_many(Some("Pickles"))
        .unwrap()
        .required(true)
        .unwrap();

    let model = builder.build().unwrap();
    let fk = model.foreign_keys().next().unwrap();

    assert!(fk.is_required());
    assert_eq!(fk.required_source(), Some(Provenance::Explicit));
    assert!(!model.property(fk.properties()[0]).is_nullable());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::Cascade);
}

fn required_relationship_carries_over_to_named_foreign_key() {
    let mut builder = models!(
        plain("Blog"),
        plain("Post").scalar("BlogKey", Type::I32.nullable())
    );

    builder
        .entity("Post")
        .unwrap()
        .has_one("Blog", Some("Blog"))
        .with_many(Some("Posts"))
        .unwrap()
        .required(true)
        .unwrap()
        .foreign_key(&["BlogKey"])
        .unwrap();

    let model = builder.build().unwrap();
    let fk = model.foreign_keys().next().unwrap();
    let blog_key = model.property(fk.properties()[0]);

    assert_eq!(blog_key.name(), "BlogKey");
    assert!(fk.is_required());
    assert_eq!(fk.required_source(), Some(Provenance::Explicit));
    assert!(!blog_key.is_nullable());
    assert_eq!(fk.delete_behavior(), DeleteBehavior::Cascade);
}

fn optional_over_required_property_fails() {
    let mut builder = models!(big_mak(), pickle().scalar("BigMakId", Type::I32));

    let mut pickle = builder.entity("Pickle").unwrap();
    let mut fk = pickle
        .has_one("BigMak", Some("BigMak"))
        .with_many(Some("Pickles"))
        .unwrap();

    let err = fk.required(false).unwrap_err();
    assert!(err.is_cannot_be_nullable());
    assert_eq!(
        err.to_string(),
        "`BigMakId` on `Pickle` of type `i32` cannot be nullable"
    );

    let model = builder.model();
    assert!(model.foreign_keys().next().unwrap().is_required());
}

fn delete_behavior_and_annotations() {
    let mut builder = models!(big_mak(), pickle());

    builder
        .entity("Pickle")
        .unwrap()
        .has_one("BigMak", Some("BigMak"))
        .with_many(Some("Pickles"))
        .unwrap()
        .on_delete(DeleteBehavior::Restrict)
        .unwrap()
        .annotation("constraint", "fk_pickle_big_mak")
        .unwrap();

    let model = builder.build().unwrap();
    let fk = model.foreign_keys().next().unwrap();

    assert_eq!(fk.delete_behavior(), DeleteBehavior::Restrict);
    assert_eq!(fk.delete_behavior_source(), Some(Provenance::Explicit));
    assert_eq!(
        fk.annotations().get("constraint").map(String::as_str),
        Some("fk_pickle_big_mak")
    );
}

fn alternate_principal_key() {
    let mut builder = models!(
        plain("Blog").scalar("Code", Type::String),
        plain("Post").scalar("BlogCode", Type::String),
    );

    builder
        .entity("Blog")
        .unwrap()
        .has_many("Post", Some("Posts"))
        .with_one(Some("Blog"))
        .unwrap()
        .principal_key(&["Code"])
        .unwrap();

    let model = builder.build().unwrap();
    let blog = model.entity_type(entity(&model, "Blog"));
    let post = model.entity_type(entity(&model, "Post"));
    let fk = model.foreign_keys().next().unwrap();

    assert_eq!(names(&model, model.key(fk.principal_key()).properties()), ["Code"]);
    assert_eq!(fk.principal_key_source(), Some(Provenance::Explicit));
    assert_eq!(names(&model, fk.properties()), ["BlogCode"]);
    assert_eq!(blog.keys().count(), 2);
    assert!(post.property_by_name("BlogId").is_none());
}

fn one_to_one_principal_can_be_flipped() {
    let mut builder = models!(order(), order_details());
    let order = entity(builder.model(), "Order");
    let details = entity(builder.model(), "OrderDetails");
    let discovered = builder.model().foreign_keys().next().unwrap().id();

    let fk = builder
        .entity("Order")
        .unwrap()
        .has_one("OrderDetails", Some("Details"))
        .with_one(Some("Order"))
        .unwrap()
        .principal("OrderDetails")
        .unwrap()
        .id();

    assert_eq!(fk, discovered);

    let model = builder.build().unwrap();
    let fk = model.foreign_key(fk);

    assert_eq!(fk.principal(), details);
    assert_eq!(fk.dependent(), order);
    assert_eq!(fk.principal_end_source(), Some(Provenance::Explicit));

    // The dependent shares its primary key with the principal
    assert_eq!(names(&model, fk.properties()), ["Id"]);
    assert_eq!(fk.properties()[0].entity, order);

    let details_navigation = model.entity_type(order).navigation_by_name("Details").unwrap();
    assert!(details_navigation.points_to_principal());
}

fn principal_must_be_an_end() {
    let mut builder = models!(order(), order_details());

    let mut order = builder.entity("Order").unwrap();
    let mut fk = order
        .has_one("OrderDetails", Some("Details"))
        .with_one(Some("Order"))
        .unwrap();

    let err = fk.principal("Pickle").unwrap_err();
    assert!(err.is_invalid_argument());
}

fn self_reference_with_explicit_navigations() {
    let mut builder = models!(plain("Employee"));

    builder
        .entity("Employee")
        .unwrap()
        .has_one("Employee", Some("Mentor"))
        .with_many(Some("Mentees"))
        .unwrap();

    let model = builder.build().unwrap();
    let employee = model.entity_type(entity(&model, "Employee"));
    let fk = model.foreign_keys().next().unwrap();

    assert!(fk.is_self_referencing());
    assert_eq!(names(&model, fk.properties()), ["EmployeeId"]);
    assert!(employee
        .navigation_by_name("Mentor")
        .unwrap()
        .points_to_principal());
    assert!(employee
        .navigation_by_name("Mentees")
        .unwrap()
        .is_collection(&model));

    let mut builder = models!(plain("Employee"));
    let mut employee = builder.entity("Employee").unwrap();
    let mut fk = employee
        .has_one("Employee", Some("Mentor"))
        .with_many(Some("Mentees"))
        .unwrap();

    let err = fk.principal("Employee").unwrap_err();
    assert!(err.is_invalid_argument());
}

fn second_relationship_gets_an_ordinal() {
    let mut builder = models!(plain("BigMak"), plain("Pickle"));
    builder.split_ordinal_start(2);

    let mut pickle = builder.entity("Pickle").unwrap();
    pickle
        .has_one("BigMak", Some("Burger"))
        .with_many(None)
        .unwrap();
    pickle
        .has_one("BigMak", Some("SpareBurger"))
        .with_many(None)
        .unwrap();

    let model = builder.build().unwrap();
    let pickle = model.entity_type(entity(&model, "Pickle"));

    assert_eq!(model.foreign_keys().count(), 2);
    assert_eq_unordered!(
        pickle.properties().map(|property| property.name()),
        ["Id", "BigMakId", "BigMakId2"]
    );

    let spare = pickle.navigation_by_name("SpareBurger").unwrap();
    let fk = model.foreign_key(spare.foreign_key());
    assert_eq!(names(&model, fk.properties()), ["BigMakId2"]);
    assert!(!fk.is_unique());
}

fn relate_with_a_full_request() {
    let mut builder = models!(plain("Bun"), plain("Burger").scalar("TopBunId", Type::I32));

    let request = Relate::between("Bun", "Burger")
        .navigation_on_b("TopBun")
        .foreign_key(["TopBunId"])
        .unique(true);
    let fk = builder.relate(request.clone()).unwrap().id();

    // Repeating the request settles on the same foreign key
    assert_eq!(builder.relate(request).unwrap().id(), fk);

    let model = builder.build().unwrap();
    let fk = model.foreign_key(fk);
    assert!(fk.is_unique());
    assert!(fk.is_required());
    assert_eq!(model.entity_type(fk.principal()).name(), "Bun");
}

fn unknown_entity_is_rejected() {
    let mut builder = models!(big_mak());

    let err = builder
        .entity("BigMak")
        .unwrap()
        .has_many("Lettuce", Some("Leaves"))
        .with_one(None)
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(builder.model().foreign_keys().count(), 0);
}

fn uniqueness_can_be_changed() {
    let mut builder = models!(plain("Blog"), plain("Post"));

    builder
        .entity("Post")
        .unwrap()
        .has_one("Blog", Some("Blog"))
        .with_many(None)
        .unwrap()
        .unique(true)
        .unwrap();

    let model = builder.build().unwrap();
    let fk = model.foreign_keys().next().unwrap();

    assert!(fk.is_unique());
    assert_eq!(fk.unique_source(), Some(Provenance::Explicit));
    assert!(!model
        .navigation(fk.dependent_to_principal().unwrap())
        .is_collection(&model));
}

tests!(
    configure_discovered_relationship,
    reference_with_many,
    navigation_on_one_side_only,
    named_foreign_key_replaces_shadow,
    named_foreign_key_is_created_as_shadow,
    required_relationship,
    required_relationship_carries_over_to_named_foreign_key,
    optional_over_required_property_fails,
    delete_behavior_and_annotations,
    alternate_principal_key,
    one_to_one_principal_can_be_flipped,
    principal_must_be_an_end,
    self_reference_with_explicit_navigations,
    second_relationship_gets_an_ordinal,
    relate_with_a_full_request,
    unknown_entity_is_rejected,
    uniqueness_can_be_changed,
);
