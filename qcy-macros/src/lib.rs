#![allow(
    clippy::missing_inline_in_public_items,
    reason = "macros are the only public items"
)]
#![allow(
    clippy::missing_docs_in_private_items,
    clippy::single_call_fn,
    reason = "writing macros is already hell"
)]

//! `#[qc(...)]`: declare a property from an ordinary function.

use {
    proc_macro::TokenStream,
    proc_macro2::TokenStream as TokenStream2,
    quote::quote,
    syn::{
        Expr, FnArg, Ident, ItemFn, LitStr, MetaNameValue, Pat, PatType, Token, Type,
        parse_macro_input, punctuated::Punctuated, spanned::Spanned,
    },
};

/// Turn `fn name(x: T, ...) -> R` into `fn name(&qcy::Registry) -> Result<qcy::Property, qcy::Error>`.
///
/// Every function parameter needs a matching `name = source` entry,
/// where `source` is anything convertible into `qcy::Arg`
/// (a generator, a type tag, or a literal).
/// `trials = N` and `seed = N` configure the run.
///
/// ```ignore
/// #[qcy::qc(xs = qcy::TypeTag::LIST, trials = 50)]
/// fn reverse_twice(xs: Vec<i64>) -> bool {
///     let mut ys = xs.clone();
///     ys.reverse();
///     ys.reverse();
///     xs == ys
/// }
/// ```
#[proc_macro_attribute]
pub fn qc(attr: TokenStream, item: TokenStream) -> TokenStream {
    let entries = parse_macro_input!(attr with Punctuated::<MetaNameValue, Token![,]>::parse_terminated);
    let item = parse_macro_input!(item as ItemFn);
    match expand(entries, item) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct Parameter {
    ident: Ident,
    ty: Type,
    source: Option<Expr>,
}

#[inline]
fn expand(
    entries: Punctuated<MetaNameValue, Token![,]>,
    item: ItemFn,
) -> syn::Result<TokenStream2> {
    let ItemFn {
        ref attrs,
        ref vis,
        ref sig,
        ref block,
    } = item;

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "properties cannot be generic",
        ));
    }
    if let Some(ref asyncness) = sig.asyncness {
        return Err(syn::Error::new(
            asyncness.span(),
            "properties cannot be `async`",
        ));
    }

    let mut parameters = sig
        .inputs
        .iter()
        .map(parameter)
        .collect::<syn::Result<Vec<_>>>()?;

    let mut trials = None;
    let mut seed = None;
    for entry in entries {
        let Some(key) = entry.path.get_ident() else {
            return Err(syn::Error::new(
                entry.path.span(),
                "expected a parameter name",
            ));
        };
        if let Some(p) = parameters.iter_mut().find(|p| p.ident == *key) {
            if p.source.is_some() {
                return Err(syn::Error::new(
                    key.span(),
                    format!("`{key}` is given twice"),
                ));
            }
            p.source = Some(entry.value);
        } else if key == "trials" {
            trials = Some(entry.value);
        } else if key == "seed" {
            seed = Some(entry.value);
        } else {
            return Err(syn::Error::new(
                key.span(),
                format!("`{}` has no parameter named `{key}`", sig.ident),
            ));
        }
    }

    let name = &sig.ident;
    let label = LitStr::new(&name.to_string(), name.span());
    let inner_inputs = &sig.inputs;
    let output = &sig.output;

    let mut params = Vec::with_capacity(parameters.len());
    let mut extractions = Vec::with_capacity(parameters.len());
    let mut call_args = Vec::with_capacity(parameters.len());
    for Parameter { ident, ty, source } in parameters {
        let Some(source) = source else {
            return Err(syn::Error::new(
                ident.span(),
                format!("no source for parameter `{ident}`: add `{ident} = ...` to `#[qc(...)]`"),
            ));
        };
        let key = LitStr::new(&ident.to_string(), ident.span());
        params.push(quote! { .param(#key, #source) });
        extractions.push(quote! {
            let #ident: #ty = match bindings.extract::<#ty>(#key) {
                ::core::result::Result::Ok(v) => v,
                ::core::result::Result::Err(e) => {
                    return ::qcy::IntoCoroutine::into_coroutine(
                        ::core::result::Result::<(), ::qcy::Error>::Err(e),
                    );
                }
            };
        });
        call_args.push(ident);
    }
    let trials = trials.map(|n| quote! { .trials(#n) });
    let seed = seed.map(|n| quote! { .seed(#n) });

    Ok(quote! {
        #(#attrs)*
        #vis fn #name(
            registry: &::qcy::Registry,
        ) -> ::core::result::Result<::qcy::Property, ::qcy::Error> {
            fn #name(#inner_inputs) #output #block

            ::qcy::Property::builder(#label)
                #(#params)*
                #trials
                #seed
                .body(::qcy::Body::new(
                    |bindings: &::qcy::Bindings| -> ::std::boxed::Box<dyn ::qcy::Coroutine> {
                        #(#extractions)*
                        ::qcy::IntoCoroutine::into_coroutine(#name(#(#call_args),*))
                    },
                ))
                .build(registry)
        }
    })
}

#[inline]
fn parameter(input: &FnArg) -> syn::Result<Parameter> {
    match *input {
        FnArg::Receiver(ref receiver) => Err(syn::Error::new(
            receiver.span(),
            "properties cannot take `self`",
        )),
        FnArg::Typed(PatType {
            ref pat, ref ty, ..
        }) => match **pat {
            Pat::Ident(ref pat) if pat.by_ref.is_none() && pat.subpat.is_none() => Ok(Parameter {
                ident: pat.ident.clone(),
                ty: (**ty).clone(),
                source: None,
            }),
            ref other => Err(syn::Error::new(
                other.span(),
                "expected a plain parameter name",
            )),
        },
    }
}
