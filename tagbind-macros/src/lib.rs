//! Procedural macros for tagbind configuration structures.

#![warn(missing_docs, clippy::pedantic)]

mod bind;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `Bind`, emitting one resolver call per tagged field in declaration order.
///
/// # Field Attributes
/// - `#[bind(env = "NAME[,required]")]` - environment variable binding
/// - `#[bind(ssm = "/segment[,required]")]` - remote parameter store binding
/// - `#[bind(leaf)]` - treat the field as a value even if its type looks nested
/// - `#[bind(nested)]` - treat the field as a nested structure implementing `Bind`
///
/// Fields without `env` or `ssm` are ignored. `String`, `bool`, `char`, numeric
/// primitives, `PathBuf` and `Option<_>` are leaves; anything else is nested.
///
/// # Container Attributes
/// - `#[bind(crate_path = "my_crate::tagbind")]` - path used to reach the runtime
///   (defaults to `::tagbind`)
///
/// ```ignore
/// #[derive(Bind, Default)]
/// struct Config {
///     #[bind(ssm = "/database_url")]
///     database_url: String,
///     #[bind(ssm = "/api_key,required", env = "API_KEY")]
///     api_key: String,
///     #[bind(ssm = "/nested")]
///     nested: NestedConfig,
///     ignored: String,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    bind::generate_impl(&input).into()
}
