/// Name of a foreign key property referencing `key_property` on `principal`.
///
/// The name is `<principal><key_property>`, unless the key property name
/// already begins with the principal name, in which case it is used as is.
pub(crate) fn foreign_key_property_name(principal: &str, key_property: &str) -> String {
    if key_property.starts_with(principal) {
        key_property.to_string()
    } else {
        format!("{principal}{key_property}")
    }
}

/// `base` followed by the smallest ordinal `>= start` that `is_free` accepts.
pub(crate) fn with_ordinal(base: &str, start: usize, is_free: impl Fn(&str) -> bool) -> String {
    (start..)
        .map(|n| format!("{base}{n}"))
        .find(|name| is_free(name))
        .unwrap_or_else(|| unreachable!("ordinals are unbounded"))
}
