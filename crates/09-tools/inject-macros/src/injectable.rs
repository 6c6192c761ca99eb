//! `#[derive(Injectable)]` 实现

use crate::utils::{is_inject_attr, parse_inject_attrs, InjectArgs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Result, Type};

/// 为单个参数生成 `ParameterInfo` 表达式
pub fn parameter_info(name: &str, ty: &Type, args: &InjectArgs) -> TokenStream {
    let identifiers = args.identifiers.iter().map(|id| quote! { .with_identifier(#id) });
    let default = args.default.as_ref().map(|expr| {
        quote! {
            .with_default(|| -> <#ty as ::di_abstractions::FromArgument>::Target { #expr })
        }
    });
    quote! {
        ::di_abstractions::ParameterInfo::of::<<#ty as ::di_abstractions::FromArgument>::Target>(#name)
            #(#identifiers)*
            #default
    }
}

fn is_disposable(input: &DeriveInput) -> Result<bool> {
    let mut disposable = false;
    for attr in input.attrs.iter().filter(|attr| is_inject_attr(attr)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("disposable") {
                disposable = true;
                Ok(())
            } else {
                Err(meta.error("结构体上只支持 #[inject(disposable)]"))
            }
        })?;
    }
    Ok(disposable)
}

pub fn derive_injectable_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => return Err(Error::new_spanned(name, "Injectable 只能用于结构体")),
    };

    let mut parameters = Vec::new();
    let mut index = 0usize;
    let mut field_value = |field: &syn::Field, label: String| -> Result<TokenStream> {
        let args = parse_inject_attrs(&field.attrs)?;
        if args.skip {
            if !args.identifiers.is_empty() || args.default.is_some() {
                return Err(Error::new_spanned(field, "skip 不能与 id 或 default 同时使用"));
            }
            return Ok(quote! { ::core::default::Default::default() });
        }
        let ty = &field.ty;
        parameters.push(parameter_info(&label, ty, &args));
        let position = index;
        index += 1;
        Ok(quote! { __arguments.argument::<#ty>(#position) })
    };

    let body = match &data.fields {
        Fields::Named(fields) => {
            let mut inits = Vec::new();
            for field in &fields.named {
                let Some(ident) = &field.ident else {
                    continue;
                };
                let value = field_value(field, ident.to_string())?;
                inits.push(quote! { #ident: #value });
            }
            quote! { Self { #(#inits),* } }
        }
        Fields::Unnamed(fields) => {
            let mut values = Vec::new();
            for (position, field) in fields.unnamed.iter().enumerate() {
                values.push(field_value(field, format!("_{position}"))?);
            }
            quote! { Self(#(#values),*) }
        }
        Fields::Unit => quote! { Self },
    };

    let disposable = is_disposable(&input)?.then(|| {
        quote! {
            fn as_disposable(&self) -> ::core::option::Option<&dyn ::infrastructure_common::Disposable> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::di_abstractions::Injectable for #name #ty_generics #where_clause {
            fn constructors() -> ::std::vec::Vec<::di_abstractions::Constructor<Self>> {
                ::std::vec![::di_abstractions::Constructor::new(
                    ::std::vec![#(#parameters),*],
                    |__arguments: &::di_abstractions::Arguments| #body,
                )]
            }

            #disposable
        }
    })
}
