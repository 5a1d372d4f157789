use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, ItemFn, ReturnType, Type};

/// Expands `#[catalog_runtime::main]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            &input.sig.fn_token,
            "#[catalog_runtime::main] expects an async fn",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[catalog_runtime::main] expects the function to return a Result",
        )
        .to_compile_error();
    }

    let preset = match profile_preset(args) {
        Ok(preset) => preset,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = #preset;
            let runtime = ::catalog_runtime::build_runtime_with_config(&config)?;
            runtime.block_on(async #block)
        }
    }
}

fn profile_preset(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::catalog_runtime::RuntimeConfig::default() });
    }

    let profile: syn::Ident = syn::parse2(args)?;
    let preset = match profile.to_string().as_str() {
        "default" => quote! { ::catalog_runtime::RuntimeConfig::default() },
        "memory_efficient" => quote! { ::catalog_runtime::RuntimeConfig::memory_efficient() },
        "high_performance" => quote! { ::catalog_runtime::RuntimeConfig::high_performance() },
        _ => {
            return Err(Error::new_spanned(
                profile,
                "unknown runtime profile, expected one of: default, memory_efficient, high_performance",
            ));
        },
    };
    Ok(preset)
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
