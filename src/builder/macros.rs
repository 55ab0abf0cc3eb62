//! Macros for ergonomic transition parameters.

/// Build a [`Params`](crate::core::Params) map.
///
/// Keys are anything convertible to `String`; values go through
/// `serde_json::json!`, so any serializable expression works.
///
/// # Example
///
/// ```
/// use statecraft::params;
/// use serde_json::json;
///
/// let params = params! {
///     "param" => 2,
///     "reason" => "maintenance",
/// };
///
/// assert_eq!(params.get("param"), Some(&json!(2)));
/// assert_eq!(params.len(), 2);
/// assert!(params! {}.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::core::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::core::Params::new();
        $(
            params.insert(::std::string::String::from($key), $crate::json!($value));
        )+
        params
    }};
}
