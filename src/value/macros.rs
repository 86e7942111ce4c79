/// Construct JSON-like [`Value`]s by using JSON syntax.
///
/// [`Value`] objects are used mostly when creating custom errors from fields
/// and when asserting on execution results.
///
/// # Example
///
/// Resulting JSON will look just like what you passed in.
/// ```rust
/// # use juniper_dynamic::{graphql_value, Value};
/// # let _: Value =
/// graphql_value!(null);
/// # let _: Value =
/// graphql_value!(1234);
/// # let _: Value =
/// graphql_value!("test");
/// # let _: Value =
/// graphql_value!([1234, "test", true]);
/// # let _: Value =
/// graphql_value!({"key": "value", "foo": 1234});
/// ```
///
/// Negative numbers and other multi-token expressions have to be wrapped into
/// parentheses when used as list elements or object values: `[(-1), 2]`.
///
/// [`Value`]: crate::Value
#[macro_export]
macro_rules! graphql_value {
    (null) => {
        $crate::Value::null()
    };
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::list(vec![ $( $crate::graphql_value!($elem) ),* ])
    };
    ({}) => {
        $crate::Value::object($crate::Object::default())
    };
    ({ $($key:literal : $val:tt),+ $(,)? }) => {
        $crate::Value::object(
            ::std::iter::IntoIterator::into_iter([
                $( ($key, $crate::graphql_value!($val)) ),+
            ])
            .collect::<$crate::Object>(),
        )
    };
    ($e:expr) => {
        $crate::Value::from($e)
    };
}

/// Construct [`InputValue`]s by using JSON-like syntax.
///
/// Besides JSON values, a bare identifier produces an enum value and
/// `@name` produces a variable reference.
///
/// ```rust
/// # use juniper_dynamic::{graphql_input_value, InputValue};
/// # let _: InputValue =
/// graphql_input_value!({"id": 1, "tags": ["a", "b"], "kind": ADMIN, "by": @user});
/// ```
///
/// [`InputValue`]: crate::InputValue
#[macro_export]
macro_rules! graphql_input_value {
    // Lists.
    (@@list [$($done:expr),*]) => {
        vec![$($done),*]
    };
    (@@list [$($done:expr),*] @ $var:ident $(, $($rest:tt)*)?) => {
        $crate::graphql_input_value!(
            @@list [$($done,)* $crate::graphql_input_value!(@ $var)] $($($rest)*)?
        )
    };
    (@@list [$($done:expr),*] $next:tt $(, $($rest:tt)*)?) => {
        $crate::graphql_input_value!(
            @@list [$($done,)* $crate::graphql_input_value!($next)] $($($rest)*)?
        )
    };

    // Objects.
    (@@object [$($done:expr),*]) => {
        vec![$($done),*]
    };
    (@@object [$($done:expr),*] $key:literal : @ $var:ident $(, $($rest:tt)*)?) => {
        $crate::graphql_input_value!(
            @@object [$($done,)* ($key.to_owned(), $crate::graphql_input_value!(@ $var))]
            $($($rest)*)?
        )
    };
    (@@object [$($done:expr),*] $key:literal : $val:tt $(, $($rest:tt)*)?) => {
        $crate::graphql_input_value!(
            @@object [$($done,)* ($key.to_owned(), $crate::graphql_input_value!($val))]
            $($($rest)*)?
        )
    };

    // Defaults.
    ([ $($elem:tt)* ]) => {
        $crate::InputValue::list($crate::graphql_input_value!(@@list [] $($elem)*))
    };
    ({ $($obj:tt)* }) => {
        $crate::InputValue::Object($crate::graphql_input_value!(@@object [] $($obj)*))
    };
    (null) => {
        $crate::InputValue::null()
    };
    (true) => {
        $crate::InputValue::scalar(true)
    };
    (false) => {
        $crate::InputValue::scalar(false)
    };
    (@ $var:ident) => {
        $crate::InputValue::variable(stringify!($var))
    };
    ($enum:ident) => {
        $crate::InputValue::enum_value(stringify!($enum))
    };
    ($e:expr) => {
        $crate::InputValue::scalar($e)
    };
}

/// Construct [`Variables`] by using JSON-like object syntax.
///
/// ```rust
/// # use juniper_dynamic::{graphql_vars, Variables};
/// let vars: Variables = graphql_vars! {"size": 100, "tags": ["a"], "cond": false};
/// # assert_eq!(vars.len(), 3);
/// ```
///
/// [`Variables`]: crate::Variables
#[macro_export]
macro_rules! graphql_vars {
    () => {
        $crate::Variables::new()
    };
    ($($key:literal : $val:tt),+ $(,)?) => {
        ::std::iter::IntoIterator::into_iter([
            $( ($key.to_owned(), $crate::graphql_input_value!($val)) ),+
        ])
        .collect::<$crate::Variables>()
    };
}
