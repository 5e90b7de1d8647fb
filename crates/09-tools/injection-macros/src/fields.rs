//! `#[derive(Fields)]` 宏实现

use crate::utils::{registration_fn, registration_fn_name, ContractArg};
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields};

/// 实现 #[derive(Fields)] 宏
pub fn derive_fields_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Fields)] 不支持泛型类型",
        ));
    }

    let named = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(named),
            ..
        }) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Fields)] 只支持具名字段的结构体",
            ))
        }
    };

    let struct_name = &input.ident;
    let type_name = struct_name.to_string();

    let mut arms = Vec::new();
    let mut registrations = Vec::new();
    for field in named {
        let Some(ident) = &field.ident else { continue };
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("field")) {
            let contract = attr.parse_args::<ContractArg>()?.to_contract();
            let key = ident.to_string();

            arms.push(quote! {
                #key => {
                    self.#ident = ::di_abstractions::FromFieldValue::from_field_value(key, value)?;
                    Ok(())
                }
            });
            registrations.push(quote! {
                ::di_abstractions::field::<#struct_name>(#key, #contract)?;
            });
        }
    }

    let registration = registration_fn(
        &registration_fn_name("fields", struct_name),
        &type_name,
        quote! { #(#registrations)* },
    );

    Ok(quote! {
        impl ::di_abstractions::FieldTarget for #struct_name {
            fn set_field(
                &mut self,
                key: &str,
                value: ::di_abstractions::Value,
            ) -> ::di_abstractions::DiResult<()> {
                match key {
                    #(#arms)*
                    _ => Err(::di_abstractions::DiError::invalid_target(format!(
                        "{} 没有可注入的字段 {}",
                        #type_name, key
                    ))),
                }
            }
        }

        #registration
    })
}
