//! 宏工具函数

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitStr, Result, Type};

/// 注解中书写的契约：字符串名称或类型
pub enum ContractArg {
    Name(LitStr),
    Type(Type),
}

impl Parse for ContractArg {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(LitStr) {
            Ok(Self::Name(input.parse()?))
        } else {
            Ok(Self::Type(input.parse()?))
        }
    }
}

impl ContractArg {
    /// 生成构造 `Contract` 的表达式
    pub fn to_contract(&self) -> TokenStream {
        match self {
            Self::Name(name) => quote! { ::di_abstractions::Contract::from(#name) },
            Self::Type(ty) => quote! { ::di_abstractions::Contract::of::<#ty>() },
        }
    }
}

/// 启动时注册函数的名称
pub fn registration_fn_name(prefix: &str, ident: &Ident) -> Ident {
    Ident::new(
        &format!("__di_{}_{}", prefix, to_snake_case(&ident.to_string())),
        Span::call_site(),
    )
}

/// 生成在进程启动时执行 `body` 的注册函数，失败时输出错误日志
pub fn registration_fn(fn_name: &Ident, type_name: &str, body: TokenStream) -> TokenStream {
    quote! {
        #[::di_abstractions::__private::ctor]
        fn #fn_name() {
            let result = (|| -> ::di_abstractions::DiResult<()> {
                #body
                Ok(())
            })();

            if let Err(error) = result {
                ::di_abstractions::__private::tracing::error!(
                    target_type = #type_name,
                    error = %error,
                    "启动时登记依赖失败"
                );
            }
        }
    }
}

/// 将驼峰命名转换为蛇形命名
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            // 缩写词内部不插入下划线
            let prev_is_lower = chars.get(i - 1).map_or(false, |c| c.is_lowercase());
            let next_is_lower = chars.get(i + 1).map_or(false, |c| c.is_lowercase());

            if prev_is_lower || next_is_lower {
                result.push('_');
            }
        }
        result.push(ch.to_lowercase().next().unwrap_or(ch));
    }

    result
}
