//! Macros for defining table schemas.

/// Defines a module with typed column constants for a table.
///
/// ```ignore
/// define_entity!(
///     postmeta {
///         POST_ID: i64 => "post_id",
///         META_KEY: String => "meta_key",
///     }
/// );
/// ```
///
/// expands to
///
/// ```ignore
/// pub mod postmeta {
///     pub const POST_ID: folio_db::expr::Col<i64> = folio_db::expr::Col::new("post_id");
///     pub const META_KEY: folio_db::expr::Col<String> = folio_db::expr::Col::new("meta_key");
/// }
/// ```
///
/// Table names are deployment specific, so they come from
/// [`folio_config::TableNames`] rather than the entity module.
#[macro_export]
macro_rules! define_entity {
    (
        $entity:ident {
            $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
        }
    ) => {
        pub mod $entity {
            #[allow(unused_imports)]
            use $crate::expr::column::Col;

            $(
                pub const $col_name: Col<$col_type> = Col::new($db_col);
            )*
        }
    };
}
