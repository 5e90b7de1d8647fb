//! `#[inject]` 宏实现

use crate::utils::{registration_fn, registration_fn_name, ContractArg};
use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parenthesized, parse_macro_input, Ident, ItemStruct, LitStr, Result, Token, Type};

/// 单个注解参数
pub enum InjectArg {
    /// `"foo"` 或 `Foo`，以规范名称为键
    Bare(ContractArg),
    /// `name = "foo"` 或 `name = Foo`
    Named(Ident, ContractArg),
    /// 同时依赖字段契约
    WithFields,
    /// `extends(Base)`
    Extends(Type),
}

impl Parse for InjectArg {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Bare(input.parse()?));
        }

        if input.peek(Ident) && input.peek2(Token![=]) {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            return Ok(Self::Named(name, input.parse()?));
        }

        if input.peek(Ident) && input.peek2(syn::token::Paren) {
            let fork = input.fork();
            let keyword: Ident = fork.parse()?;
            if keyword == "extends" {
                input.parse::<Ident>()?;
                let content;
                parenthesized!(content in input);
                return Ok(Self::Extends(content.parse()?));
            }
        }

        if input.peek(Ident) {
            let fork = input.fork();
            let keyword: Ident = fork.parse()?;
            if keyword == "with_fields" && (fork.is_empty() || fork.peek(Token![,])) {
                input.parse::<Ident>()?;
                return Ok(Self::WithFields);
            }
        }

        Ok(Self::Bare(input.parse()?))
    }
}

/// 注解参数列表
pub struct InjectArgs {
    pub args: Vec<InjectArg>,
}

impl Parse for InjectArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let parsed = Punctuated::<InjectArg, Token![,]>::parse_terminated(input)?;
        Ok(Self {
            args: parsed.into_iter().collect(),
        })
    }
}

/// 实现 #[inject] 宏
pub fn inject_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let inject_args = if args.is_empty() {
        InjectArgs { args: Vec::new() }
    } else {
        match syn::parse::<InjectArgs>(args) {
            Ok(args) => args,
            Err(e) => return e.to_compile_error().into(),
        }
    };

    let input_struct = parse_macro_input!(input as ItemStruct);
    if !input_struct.generics.params.is_empty() {
        return syn::Error::new_spanned(&input_struct.generics, "#[inject] 不支持泛型类型")
            .to_compile_error()
            .into();
    }

    let struct_name = &input_struct.ident;
    let type_name = struct_name.to_string();

    let mut parents = Vec::new();
    let mut requires = Vec::new();
    let mut with_fields = false;
    for arg in &inject_args.args {
        match arg {
            InjectArg::Bare(contract) => {
                let contract = contract.to_contract();
                requires.push(quote! { .requires(#contract) });
            }
            InjectArg::Named(name, contract) => {
                let name = name.to_string();
                let contract = contract.to_contract();
                requires.push(quote! {
                    .requires(::di_abstractions::Dependency::named(#name, #contract))
                });
            }
            InjectArg::WithFields => with_fields = true,
            InjectArg::Extends(parent) => parents.push(quote! {
                ::di_abstractions::extends::<#struct_name, #parent>()?;
            }),
        }
    }
    let with_fields = with_fields.then(|| quote! { .with_fields() });

    let body = quote! {
        #(#parents)*
        ::di_abstractions::Inject::<#struct_name>::new()
            #(#requires)*
            #with_fields
            .register()?;
    };
    let registration = registration_fn(&registration_fn_name("inject", struct_name), &type_name, body);

    let expanded = quote! {
        #input_struct

        #registration
    };

    TokenStream::from(expanded)
}
