//! Implementation of the #[json_rpc_service] attribute macro

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::{
    Attribute, FnArg, GenericArgument, Ident, ItemTrait, LitStr, Pat, PathArguments, Result, ReturnType, Token,
    TraitItem, TraitItemFn, Type, TypeParamBound,
};

/// Supertraits that are ordinary bounds rather than service contracts
const MARKER_TRAITS: &[&str] = &["Send", "Sync", "Clone", "Debug", "Unpin"];

/// Arguments of the attribute: `("path/")` or `(base_path = "path/")`, or nothing
#[derive(Default)]
pub struct ServiceArgs {
    base_path: Option<LitStr>,
}

impl Parse for ServiceArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = ServiceArgs::default();

        while !input.is_empty() {
            if input.peek(LitStr) {
                args.base_path = Some(input.parse()?);
            } else {
                let key: Ident = input.parse()?;
                if key != "base_path" {
                    return Err(syn::Error::new_spanned(key, "Unknown argument; expected `base_path = \"...\"`"));
                }
                input.parse::<Token![=]>()?;
                args.base_path = Some(input.parse()?);
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

/// One remote method, as declared in the trait
struct RemoteMethod {
    sig: syn::Signature,
    rpc_name: Option<String>,
    positional: bool,
    params: Vec<RemoteParam>,
    result_type: Type,
}

struct RemoteParam {
    ident: Ident,
    tag: Option<String>,
}

pub fn json_rpc_service_impl(args: ServiceArgs, mut item: ItemTrait) -> Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            format!("Type parameters are not supported on {}", item.ident),
        ));
    }

    let mut methods = Vec::new();
    for trait_item in &mut item.items {
        if let TraitItem::Fn(method) = trait_item {
            let rpc_attrs = take_attrs(&mut method.attrs, "rpc");
            let param_tags = take_param_tags(method)?;

            // Methods with a body stay local
            if method.default.is_none() {
                methods.push(remote_method(method, &rpc_attrs, param_tags)?);
            } else if let Some(attr) = rpc_attrs.first() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "#[rpc] has no effect on a method with a body, which is never sent",
                ));
            }
        }
    }

    let trait_ident = &item.ident;
    let vis = &item.vis;
    let client = format_ident!("{}Client", trait_ident);
    let service_name = trait_ident.to_string();

    let supertraits: Vec<_> = item.supertraits.iter().collect();
    let parent_clients: Vec<syn::Path> = item
        .supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) => Some(&bound.path),
            _ => None,
        })
        .filter(|path| {
            path.segments
                .last()
                .is_some_and(|segment| !MARKER_TRAITS.iter().any(|marker| segment.ident == marker))
        })
        .map(|path| {
            let mut client_path = path.clone();
            if let Some(last) = client_path.segments.last_mut() {
                last.ident = format_ident!("{}Client", last.ident);
                last.arguments = PathArguments::None;
            }
            client_path
        })
        .collect();

    let base_path = args.base_path.map(|path| quote! { .base_path(#path) });
    let method_descriptors = methods.iter().map(method_descriptor);
    let method_impls = methods.iter().map(method_impl);

    let client_doc = format!("Client for the [`{service_name}`] JSON-RPC service contract.");

    Ok(quote! {
        #item

        #[doc = #client_doc]
        #[derive(Clone, Debug)]
        #vis struct #client {
            handle: ::rpcwire::ServiceHandle,
        }

        impl ::rpcwire::ServiceAdapter for #client {
            fn descriptor() -> ::std::sync::Arc<::rpcwire::ServiceDescriptor> {
                static DESCRIPTOR: ::std::sync::OnceLock<::std::sync::Arc<::rpcwire::ServiceDescriptor>> =
                    ::std::sync::OnceLock::new();

                DESCRIPTOR
                    .get_or_init(|| {
                        ::std::sync::Arc::new(
                            ::rpcwire::ServiceDescriptor::contract(#service_name)
                                #base_path
                                #(.extends(<#parent_clients as ::rpcwire::ServiceAdapter>::descriptor()))*
                                #(.method(#method_descriptors))*
                        )
                    })
                    .clone()
            }

            fn from_handle(handle: ::rpcwire::ServiceHandle) -> Self {
                Self { handle }
            }

            fn handle(&self) -> &::rpcwire::ServiceHandle {
                &self.handle
            }
        }

        impl ::rpcwire::Binds<#client> for #client {}
        #(impl ::rpcwire::Binds<#parent_clients> for #client {})*

        impl<A> #trait_ident for A
        where
            A: ::rpcwire::Binds<#client> #(+ #supertraits)*,
        {
            #(#method_impls)*
        }
    })
}

/// Remove every attribute named `name`, returning the removed ones
fn take_attrs(attrs: &mut Vec<Attribute>, name: &str) -> Vec<Attribute> {
    let (taken, kept) = std::mem::take(attrs)
        .into_iter()
        .partition(|attr| attr.path().is_ident(name));
    *attrs = kept;
    taken
}

/// Strip `#[param("...")]` from every argument of the method, returning the name tags in order
fn take_param_tags(method: &mut TraitItemFn) -> Result<Vec<Option<String>>> {
    let mut tags = Vec::new();

    for input in &mut method.sig.inputs {
        if let FnArg::Typed(arg) = input {
            let mut tag = None;
            for attr in take_attrs(&mut arg.attrs, "param") {
                tag = Some(parse_param_tag(&attr)?);
            }
            tags.push(tag);
        }
    }

    Ok(tags)
}

/// `#[param("a")]` or `#[param(name = "a")]`
fn parse_param_tag(attr: &Attribute) -> Result<String> {
    if let Ok(lit) = attr.parse_args::<LitStr>() {
        return Ok(lit.value());
    }

    let mut name = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let s: LitStr = meta.value()?.parse()?;
            name = Some(s.value());
            Ok(())
        } else {
            Err(meta.error("Expected `name = \"...\"`"))
        }
    })?;

    name.ok_or_else(|| syn::Error::new_spanned(attr, "Expected #[param(\"name\")]"))
}

fn remote_method(method: &TraitItemFn, rpc_attrs: &[Attribute], tags: Vec<Option<String>>) -> Result<RemoteMethod> {
    let sig = &method.sig;

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                sig,
                format!("#{} must take `&self` to be invoked remotely", sig.ident),
            ));
        }
    }

    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig.asyncness,
            "Remote methods return Call<T> instead of being async",
        ));
    }

    let mut rpc_name = None;
    let mut positional = false;
    for attr in rpc_attrs {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let s: LitStr = meta.value()?.parse()?;
                rpc_name = Some(s.value());
            } else if meta.path.is_ident("positional") {
                positional = true;
            } else if meta.path.is_ident("named") {
                positional = false;
            } else {
                return Err(meta.error("Expected `name = \"...\"`, `positional` or `named`"));
            }
            Ok(())
        })?;
    }

    let mut params = Vec::new();
    for (input, tag) in sig.inputs.iter().skip(1).zip(tags) {
        let FnArg::Typed(arg) = input else { continue };
        let Pat::Ident(pat) = arg.pat.as_ref() else {
            return Err(syn::Error::new_spanned(
                &arg.pat,
                "Parameters of remote methods must be plain identifiers",
            ));
        };
        params.push(RemoteParam {
            ident: pat.ident.clone(),
            tag,
        });
    }

    let result_type = call_result_type(&sig.output).ok_or_else(|| {
        let found = match &sig.output {
            ReturnType::Default => "()".to_string(),
            ReturnType::Type(_, ty) => quote!(#ty).to_string(),
        };
        syn::Error::new_spanned(
            &sig.output,
            format!(
                "Only Call<T> is supported as return type, but #{} returns {found}",
                sig.ident
            ),
        )
    })?;

    Ok(RemoteMethod {
        sig: sig.clone(),
        rpc_name,
        positional,
        params,
        result_type,
    })
}

/// The `T` in a `Call<T>` return type
fn call_result_type(output: &ReturnType) -> Option<Type> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    let Type::Path(path) = ty.as_ref() else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Call" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(ty) => Some(ty.clone()),
        _ => None,
    }
}

fn method_descriptor(method: &RemoteMethod) -> TokenStream {
    let name = method.sig.ident.to_string();
    let rpc_name = method.rpc_name.as_ref().map(|rpc_name| quote! { .rpc_name(#rpc_name) });
    let mode = method.positional.then(|| quote! { .positional() });
    let result_type = &method.result_type;

    let params = method.params.iter().map(|param| match &param.tag {
        Some(tag) => quote! { .param(#tag) },
        None => {
            let declared = param.ident.to_string();
            quote! { .untagged_param(#declared) }
        }
    });

    quote! {
        ::rpcwire::MethodDescriptor::new(#name)
            #rpc_name
            #mode
            #(#params)*
            .returns::<#result_type>()
    }
}

fn method_impl(method: &RemoteMethod) -> TokenStream {
    let sig = &method.sig;
    let name = sig.ident.to_string();
    let args = method.params.iter().map(|param| &param.ident);

    quote! {
        #sig {
            ::rpcwire::ServiceAdapter::handle(self).call(
                #name,
                ::rpcwire::Arguments::new() #(.arg(&#args))*,
            )
        }
    }
}
