// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crate-wide macros.
//!
//! [`simple_display!`] keeps the `Display` impls of the small state enums
//! down to a variant table; [`tree!`] builds expression-tree literals.

/// Implement `Display` for a fieldless enum as a fixed string table.
///
/// The engine's state enums (`ExprState`, `CancelFlavour`, ...) render as
/// short snake-case words in log lines; spelling each `Display` impl out
/// by hand buries the one interesting thing, the variant-to-word table.
///
/// ```ignore
/// crate::simple_display! {
///     CancelFlavour {
///         Cancel => "cancel",
///         Timeout => "timeout",
///         Kill => "kill",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($name:ident { $( $variant:ident => $text:literal ),+ $(,)? }) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let text = match self {
                    $( $name::$variant => $text, )+
                };
                f.write_str(text)
            }
        }
    };
}

/// Build a [`Tree`](crate::tree::Tree) literal.
///
/// Mirrors the `[name, attributes, children]` triple shape trees serialize
/// as. Attribute values go through `serde_json::json!`, so any
/// serializable expression works on the right-hand side of `=>`.
///
/// ```
/// use weft_core::tree;
///
/// let t = tree!("sequence", { "tag" => "main" }, [
///     tree!("echo", { "hello" => serde_json::Value::Null }),
///     tree!("participant", { "ref" => "alice" }),
/// ]);
/// assert_eq!(t.name, "sequence");
/// assert_eq!(t.children.len(), 2);
/// ```
#[macro_export]
macro_rules! tree {
    ($name:expr) => {
        $crate::tree::Tree::new($name)
    };
    ($name:expr, { $( $key:expr => $value:expr ),* $(,)? }) => {{
        let mut t = $crate::tree::Tree::new($name);
        $( t.attributes.insert(($key).to_string(), $crate::serde_json::json!($value)); )*
        t
    }};
    ($name:expr, [ $( $child:expr ),* $(,)? ]) => {{
        let mut t = $crate::tree::Tree::new($name);
        $( t.children.push($child); )*
        t
    }};
    ($name:expr, { $( $key:expr => $value:expr ),* $(,)? }, [ $( $child:expr ),* $(,)? ]) => {{
        let mut t = $crate::tree::Tree::new($name);
        $( t.attributes.insert(($key).to_string(), $crate::serde_json::json!($value)); )*
        $( t.children.push($child); )*
        t
    }};
}
