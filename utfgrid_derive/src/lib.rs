//! Procedural macros shared by the UTFGrid crates.
//!
//! The only macro is [`macro@context`], which wraps the body of a function returning
//! `anyhow::Result` and attaches a formatted message to any error it returns:
//!
//! ```ignore
//! #[context("Failed to open map document {path:?}")]
//! fn open(path: &Path) -> Result<MapDocument> { ... }
//! ```

mod args;

use crate::args::Args;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use quote::{ToTokens, quote};
use syn::{ItemFn, ReturnType, parse_macro_input};

/// Adds an `anyhow` context message to every error returned by the annotated function.
///
/// The first argument is the message literal, the rest are the values it formats.
/// Both may reference the function's parameters. Only plain (non-`async`) functions
/// with a declared `Result` return type are accepted.
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = parse_macro_input!(args as Args);
	let mut function = parse_macro_input!(input as ItemFn);

	match wrap_body(&args, &function) {
		Ok(body) => {
			function.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(body), None)];
			function.into_token_stream().into()
		}
		Err(err) => err.to_compile_error().into(),
	}
}

fn wrap_body(args: &Args, function: &ItemFn) -> syn::Result<TokenStream2> {
	if let Some(asyncness) = &function.sig.asyncness {
		return Err(syn::Error::new_spanned(asyncness, "#[context] does not support async functions"));
	}
	if let ReturnType::Default = function.sig.output {
		return Err(syn::Error::new_spanned(&function.sig, "#[context] needs a function returning Result"));
	}

	let output = &function.sig.output;
	let block = &function.block;
	let message = args.format();
	let err = Ident::new("err", Span::mixed_site());
	let once = Ident::new("once", Span::mixed_site());

	// The closure consumes `once`, so it is `FnOnce` and may return borrows of its captures.
	Ok(quote! {
		let #once = ::std::string::String::new();
		(|| #output {
			::core::mem::drop(#once);
			#block
		})()
		.map_err(|#err| #err.context(#message).into())
	})
}
