#[macro_export]
macro_rules! assert_eq_unordered {
    ($actual:expr, $expect:expr) => {
        let mut actual: Vec<_> = $actual.into_iter().collect();
        let mut expect: Vec<_> = $expect.into_iter().collect();
        actual.sort();
        expect.sort();
        pretty_assertions::assert_eq!(actual, expect);
    };
}

/// A [`ModelBuilder`](relmap::ModelBuilder) with the given shapes registered
/// in order.
#[macro_export]
macro_rules! models {
    (
        $( $shape:expr ),* $(,)?
    ) => {{
        let mut builder = relmap::ModelBuilder::new();
        $( builder.register($shape).unwrap(); )*
        builder
    }};
}

/// Wraps scenario functions in `#[test]`s that install the tracing
/// subscriber first.
#[macro_export]
macro_rules! tests {
    (
        $(
            $( #[$attrs:meta] )*
            $f:ident
        ),+ $(,)?
    ) => {
        mod scenario {
            $(
                #[test]
                $( #[$attrs] )*
                fn $f() {
                    $crate::init_tracing();
                    super::$f();
                }
            )*
        }
    };
}
