mod model;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Model)] derive macro
// ============================================================================

/// Derive macro for the `Model` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Model)]
/// #[model(name = "Shop::Category")]
/// struct Category {
///     #[model(id)]
///     pub id: Option<u64>,
///     pub name: String,
///     pub parent_id: Option<u64>,
/// }
/// ```
///
/// - `#[model(name = "...")]` sets the model name the resource URL and the
///   response keys are derived from. `::` separates namespaces, so
///   `"Shop::Category"` lives at `shop/categories`.
///   If omitted, defaults to the struct name.
/// - `#[model(id)]` marks the identifier field. Its type must implement
///   `restmodel::ModelId` (strings, integers and `Option`s of those).
///   If omitted, defaults to a field named `id`.
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    model::derive_model(input)
}
