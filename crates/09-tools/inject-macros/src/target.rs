//! `#[injection_target]` 实现

use crate::injectable::parameter_info;
use crate::utils::{parse_inject_attrs, strip_inject_attrs};
use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Error, FnArg, ImplItem, ImplItemFn, ItemImpl, Pat, Result, ReturnType};

/// `#[injection_target(...)]` 参数
#[derive(Default)]
pub struct TargetArgs {
    /// 生成 `as_composite`，类型需实现 `CompositeObject`
    pub composite: bool,
    /// 生成 `as_scope_aware`，类型需实现 `ScopeAware`
    pub scope_aware: bool,
}

impl TargetArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta<'_>) -> Result<()> {
        if meta.path.is_ident("composite") {
            self.composite = true;
            Ok(())
        } else if meta.path.is_ident("scope_aware") {
            self.scope_aware = true;
            Ok(())
        } else {
            Err(meta.error("不支持的参数, 可用: composite, scope_aware"))
        }
    }
}

fn takes_shared_self(method: &ImplItemFn) -> bool {
    method
        .sig
        .receiver()
        .is_some_and(|receiver| receiver.reference.is_some() && receiver.mutability.is_none())
}

/// 为 `&self` 方法生成 `InjectionMethod`，同时移除参数上的 `#[inject]` 属性
fn injection_method(self_ty: &syn::Type, method: &mut ImplItemFn) -> Result<Option<TokenStream>> {
    let method_args = parse_inject_attrs(&method.attrs)?;
    strip_inject_attrs(&mut method.attrs);
    let mut parameter_args = Vec::new();
    for input in method.sig.inputs.iter_mut() {
        if let FnArg::Typed(pat_type) = input {
            parameter_args.push(parse_inject_attrs(&pat_type.attrs)?);
            strip_inject_attrs(&mut pat_type.attrs);
        }
    }
    if method_args.skip
        || !takes_shared_self(method)
        || !method.sig.generics.params.is_empty()
        || method.sig.asyncness.is_some()
    {
        return Ok(None);
    }

    let mut parameters = Vec::new();
    let mut arguments = Vec::new();
    let typed = method.sig.inputs.iter().filter_map(|input| match input {
        FnArg::Typed(pat_type) => Some(pat_type),
        FnArg::Receiver(_) => None,
    });
    for (position, (pat_type, args)) in typed.zip(&parameter_args).enumerate() {
        if args.skip {
            return Err(Error::new_spanned(pat_type, "方法参数不支持 skip"));
        }
        let label = match pat_type.pat.as_ref() {
            Pat::Ident(pat) => pat.ident.to_string(),
            _ => format!("arg{position}"),
        };
        let ty = &pat_type.ty;
        parameters.push(parameter_info(&label, ty, args));
        arguments.push(quote! { __arguments.argument::<#ty>(#position) });
    }

    let ident = &method.sig.ident;
    let name = ident.to_string();
    let tokens = match &method.sig.output {
        ReturnType::Default => quote! {
            ::di_abstractions::InjectionMethod::new::<#self_ty, _>(
                #name,
                ::std::vec![#(#parameters),*],
                |__target, __arguments| {
                    __target.#ident(#(#arguments),*);
                },
            )
        },
        ReturnType::Type(..) => quote! {
            ::di_abstractions::InjectionMethod::with_result::<#self_ty, _, _>(
                #name,
                ::std::vec![#(#parameters),*],
                |__target, __arguments| __target.#ident(#(#arguments),*),
            )
        },
    };
    Ok(Some(tokens))
}

pub fn injection_target_impl(args: TargetArgs, mut item: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(Error::new_spanned(path, "#[injection_target] 只能用于固有 impl 块"));
    }

    let self_ty = item.self_ty.clone();
    let mut methods = Vec::new();
    for impl_item in &mut item.items {
        if let ImplItem::Fn(method) = impl_item {
            if let Some(tokens) = injection_method(&self_ty, method)? {
                methods.push(tokens);
            }
        }
    }

    let composite = args.composite.then(|| {
        quote! {
            fn as_composite(&self) -> ::core::option::Option<&dyn ::di_abstractions::CompositeObject> {
                ::core::option::Option::Some(self)
            }
        }
    });
    let scope_aware = args.scope_aware.then(|| {
        quote! {
            fn as_scope_aware(&self) -> ::core::option::Option<&dyn ::di_abstractions::ScopeAware> {
                ::core::option::Option::Some(self)
            }
        }
    });

    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    Ok(quote! {
        #item

        impl #impl_generics ::di_abstractions::InjectionTarget for #self_ty #where_clause {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn injection_methods(&self) -> ::std::vec::Vec<::di_abstractions::InjectionMethod> {
                ::std::vec![#(#methods),*]
            }

            #composite
            #scope_aware
        }
    })
}
