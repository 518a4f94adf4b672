use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{DeriveInput, Generics, Ident, Path, Type};

/// Type names bound directly as values rather than walked as structures.
const LEAF_TYPES: &[&str] = &[
    "String", "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize", "f32", "f64", "PathBuf", "Option",
];

/// Container-level attributes for `#[bind(...)]`
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(bind), supports(struct_named))]
struct BindOpts {
    ident: Ident,
    generics: Generics,
    data: darling::ast::Data<darling::util::Ignored, FieldOpts>,

    /// Path to the runtime crate re-exporting `Bind`, `Resolver`, `Tags` and `Result`.
    #[darling(default)]
    crate_path: Option<Path>,
}

/// Field-level attributes for `#[bind(...)]`
#[derive(Debug, FromField)]
#[darling(attributes(bind))]
struct FieldOpts {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    env: Option<String>,

    #[darling(default)]
    ssm: Option<String>,

    #[darling(default)]
    leaf: bool,

    #[darling(default)]
    nested: bool,
}

enum FieldKind {
    Leaf,
    Nested,
}

pub fn generate_impl(input: &DeriveInput) -> TokenStream2 {
    match BindOpts::from_derive_input(input).and_then(generate_from_opts) {
        Ok(tokens) => tokens,
        Err(e) => e.write_errors(),
    }
}

fn generate_from_opts(opts: BindOpts) -> darling::Result<TokenStream2> {
    let krate = opts
        .crate_path
        .map_or_else(|| quote!(::tagbind), |path| path.into_token_stream());
    let type_name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let fields = opts
        .data
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum"))?
        .fields;

    let mut errors = darling::Error::accumulator();
    let statements: Vec<TokenStream2> = fields
        .iter()
        .filter_map(|field| errors.handle(field_statement(field, &krate)).flatten())
        .collect();
    errors.finish()?;

    Ok(quote! {
        impl #impl_generics #krate::Bind for #type_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind<'__bind>(
                &'__bind mut self,
                resolver: &mut #krate::Resolver<'__bind>,
            ) -> #krate::Result<()> {
                #(#statements)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

/// Builds the resolver call for one field, or `None` for untagged fields.
fn field_statement(
    field: &FieldOpts,
    krate: &TokenStream2,
) -> darling::Result<Option<TokenStream2>> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(darling::Error::unsupported_shape("tuple field"));
    };

    if field.leaf && field.nested {
        return Err(darling::Error::custom("`leaf` and `nested` are mutually exclusive")
            .with_span(ident));
    }

    for (key, raw) in [("env", &field.env), ("ssm", &field.ssm)] {
        if raw.as_deref().is_some_and(|raw| raw.trim().is_empty()) {
            return Err(darling::Error::custom(format!("`{key}` tag cannot be empty"))
                .with_span(ident));
        }
    }

    if field.env.is_none() && field.ssm.is_none() {
        if field.leaf || field.nested {
            return Err(darling::Error::custom(
                "`leaf` and `nested` need an `env` or `ssm` tag to take effect",
            )
            .with_span(ident));
        }
        return Ok(None);
    }

    let name = ident.to_string();
    let name = name.trim_start_matches("r#");
    let env = field.env.as_ref().map(|raw| quote!(.env(#raw)));
    let ssm = field.ssm.as_ref().map(|raw| quote!(.ssm(#raw)));
    let tags = quote!(#krate::Tags::new() #env #ssm);

    let kind = if field.leaf {
        FieldKind::Leaf
    } else if field.nested {
        FieldKind::Nested
    } else {
        infer_kind(&field.ty)
    };

    Ok(Some(match kind {
        FieldKind::Leaf => quote! {
            resolver.leaf(#name, #tags, &mut self.#ident)?;
        },
        FieldKind::Nested => quote! {
            resolver.nested(#name, #tags, &mut self.#ident)?;
        },
    }))
}

/// Guesses whether a type is a value or a nested structure from its last path segment.
fn infer_kind(ty: &Type) -> FieldKind {
    match ty {
        Type::Path(path) if path.qself.is_none() => {
            let is_leaf = path
                .path
                .segments
                .last()
                .is_some_and(|segment| LEAF_TYPES.iter().any(|leaf| segment.ident == *leaf));
            if is_leaf {
                FieldKind::Leaf
            } else {
                FieldKind::Nested
            }
        }
        Type::Group(group) => infer_kind(&group.elem),
        Type::Paren(paren) => infer_kind(&paren.elem),
        _ => FieldKind::Leaf,
    }
}
