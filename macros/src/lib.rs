use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashMap;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Lit, Meta, Token};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(String),
    Lit(String),
    Path(syn::Path),
    Flag,
}

/// Derive `envstruct::EnvConfig` for a struct with named fields
#[proc_macro_derive(EnvConfig, attributes(field))]
pub fn derive_env_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_config(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_config(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let struct_name_str = struct_name.unraw().to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "EnvConfig cannot be derived for generic structs",
        ));
    }

    // Extract fields from the struct
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "EnvConfig only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "EnvConfig only supports structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut resolve_fields = Vec::new();
    let mut construct_fields = Vec::new();
    let mut node_fields = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let field_type = &field.ty;
        let local = format_ident!("__field_{}", field_name.unraw());

        let config = parse_field_config(field)?;

        construct_fields.push(quote! { #field_name: #local? });

        if let FieldMode::Skip = config.mode {
            resolve_fields.push(quote! {
                let #local = ::core::option::Option::Some(
                    <#field_type as ::core::default::Default>::default()
                );
            });
            continue;
        }

        let index = descriptors.len();
        let rust_name = field_name.unraw().to_string();
        let env_var = &config.env_var;
        let explicit = config.explicit;
        let description = &config.description;
        let required = config.required;
        let secret = config.secret;
        let default = match &config.default {
            Some(default) => quote! { ::core::option::Option::Some(#default) },
            None => quote! { ::core::option::Option::None },
        };
        let nested = match config.mode {
            FieldMode::Nested => quote! {
                ::core::option::Option::Some(
                    <#field_type as ::envstruct::EnvConfig>::descriptor
                        as fn() -> &'static ::envstruct::TypeDescriptor
                )
            },
            _ => quote! { ::core::option::Option::None },
        };

        descriptors.push(quote! {
            ::envstruct::FieldDescriptor {
                field: #rust_name,
                env: #env_var,
                explicit: #explicit,
                description: #description,
                default: #default,
                required: #required,
                secret: #secret,
                nested: #nested,
            }
        });

        // Fields without a way to resolve a missing value fall back to Default
        let needs_default = !config.required && config.default.is_none();

        let resolve = match &config.mode {
            FieldMode::Nested => quote! {
                resolver.nested::<#field_type>(&__fields[#index])
            },
            FieldMode::Value if needs_default => quote! {
                resolver.value_or_default::<#field_type>(&__fields[#index])
            },
            FieldMode::Value => quote! {
                resolver.value::<#field_type>(&__fields[#index])
            },
            FieldMode::ParseWith(parser) if needs_default => quote! {
                resolver.value_with_or_default::<#field_type, _>(&__fields[#index], #parser)
            },
            FieldMode::ParseWith(parser) => quote! {
                resolver.value_with::<#field_type, _>(&__fields[#index], #parser)
            },
            FieldMode::Skip => unreachable!("skipped fields are handled above"),
        };
        resolve_fields.push(quote! { let #local = #resolve; });

        let node = match &config.mode {
            FieldMode::Nested => quote! {
                ::envstruct::Node::nested(
                    &__fields[#index],
                    ::envstruct::EnvConfig::to_node(&self.#field_name),
                )
            },
            FieldMode::ParseWith(_) => quote! {
                ::envstruct::Node::leaf(&__fields[#index], ::std::format!("{:?}", self.#field_name))
            },
            _ => quote! {
                ::envstruct::Node::leaf(
                    &__fields[#index],
                    ::envstruct::EnvValue::render(&self.#field_name),
                )
            },
        };
        node_fields.push(node);
    }

    let field_count = descriptors.len();

    Ok(quote! {
        impl ::envstruct::EnvConfig for #struct_name {
            fn descriptor() -> &'static ::envstruct::TypeDescriptor {
                static FIELDS: [::envstruct::FieldDescriptor; #field_count] = [
                    #(#descriptors),*
                ];
                static DESCRIPTOR: ::envstruct::TypeDescriptor = ::envstruct::TypeDescriptor {
                    name: #struct_name_str,
                    fields: &FIELDS,
                };
                &DESCRIPTOR
            }

            #[allow(unused_variables)]
            fn resolve(
                resolver: &mut ::envstruct::Resolver<'_>,
            ) -> ::core::option::Option<Self> {
                let __fields = <Self as ::envstruct::EnvConfig>::descriptor().fields;

                #(#resolve_fields)*

                ::core::option::Option::Some(Self {
                    #(#construct_fields),*
                })
            }

            #[allow(unused_variables)]
            fn to_node(&self) -> ::envstruct::Node {
                let __fields = <Self as ::envstruct::EnvConfig>::descriptor().fields;

                ::envstruct::Node::Struct {
                    name: #struct_name_str,
                    fields: ::std::vec![#(#node_fields),*],
                }
            }
        }
    })
}

#[derive(Debug)]
struct FieldConfig {
    env_var: String,
    explicit: bool,
    description: String,
    default: Option<String>,
    required: bool,
    secret: bool,
    mode: FieldMode,
}

#[derive(Debug)]
enum FieldMode {
    Value,
    ParseWith(syn::Path),
    Nested,
    Skip,
}

/// Parse #[field(env = "X", doc = "Y", default = "1", required)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if values.contains_key(&key) {
            return Err(meta.error(format!("duplicate `{}` in #[field(...)]", key)));
        }

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;

            match key.as_str() {
                "env" | "doc" => {
                    let value: syn::LitStr = meta.input.parse()?;
                    values.insert(key, MetaValue::Str(value.value()));
                }
                "default" => {
                    let lit: Lit = meta.input.parse()?;
                    let text = match &lit {
                        Lit::Str(s) => s.value(),
                        Lit::Int(i) => i.base10_digits().to_string(),
                        Lit::Float(f) => f.base10_digits().to_string(),
                        Lit::Bool(b) => b.value.to_string(),
                        Lit::Char(c) => c.value().to_string(),
                        _ => return Err(syn::Error::new_spanned(lit, "unsupported default literal")),
                    };
                    values.insert(key, MetaValue::Lit(text));
                }
                "parse_with" => {
                    let path: syn::Path = meta.input.parse()?;
                    values.insert(key, MetaValue::Path(path));
                }
                _ => return Err(meta.error(format!("unknown field option `{}`", key))),
            }
        } else {
            match key.as_str() {
                "required" | "nested" | "secret" | "skip" => {
                    values.insert(key, MetaValue::Flag);
                }
                _ => return Err(meta.error(format!("unknown field flag `{}`", key))),
            }
        }

        Ok(())
    })?;

    Ok(values)
}

/// Collect `///` doc comments into a single line
fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_field_config(field: &syn::Field) -> syn::Result<FieldConfig> {
    let field_attr = field.attrs.iter().find(|attr| attr.path().is_ident("field"));

    // Fields without #[field(...)] are optional values named after the field
    let parsed = match field_attr.map(|attr| &attr.meta) {
        Some(Meta::List(list)) => parse_field_list(list)?,
        Some(_) => {
            return Err(syn::Error::new_spanned(
                field_attr,
                "field attribute must be a list: #[field(env = \"...\", ...)]",
            ));
        }
        None => HashMap::new(),
    };

    let flag = |name: &str| matches!(parsed.get(name), Some(MetaValue::Flag));

    let (env_var, explicit) = match parsed.get("env") {
        Some(MetaValue::Str(s)) if s.trim().is_empty() => {
            return Err(syn::Error::new_spanned(field, "env name must not be empty"));
        }
        Some(MetaValue::Str(s)) => (s.trim().to_string(), true),
        _ if flag("nested") => (String::new(), false),
        _ => match &field.ident {
            Some(ident) => (ident.unraw().to_string().to_uppercase(), false),
            None => return Err(syn::Error::new_spanned(field, "expected a named field")),
        },
    };

    let description = match parsed.get("doc") {
        Some(MetaValue::Str(s)) => s.trim().to_string(),
        _ => doc_comment(&field.attrs),
    };

    let default = match parsed.get("default") {
        Some(MetaValue::Lit(s)) => Some(s.clone()),
        _ => None,
    };

    let parse_with = match parsed.get("parse_with") {
        Some(MetaValue::Path(p)) => Some(p.clone()),
        _ => None,
    };

    let required = flag("required");
    let secret = flag("secret");

    let mode = if flag("skip") {
        if parsed.len() > 1 {
            return Err(syn::Error::new_spanned(
                field_attr,
                "skip cannot be combined with other field options",
            ));
        }
        FieldMode::Skip
    } else if flag("nested") {
        if required || secret || default.is_some() || parse_with.is_some() {
            return Err(syn::Error::new_spanned(
                field_attr,
                "nested fields only accept env and doc",
            ));
        }
        FieldMode::Nested
    } else if let Some(parser) = parse_with {
        FieldMode::ParseWith(parser)
    } else {
        FieldMode::Value
    };

    Ok(FieldConfig {
        env_var,
        explicit,
        description,
        default,
        required,
        secret,
        mode,
    })
}
