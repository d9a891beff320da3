use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
	Expr, LitStr, Token,
	parse::{self, Parse, ParseStream},
	punctuated::Punctuated,
};

/// Arguments of `#[context(...)]`: a message literal and the values it formats.
#[derive(Debug)]
pub struct Args {
	pub message: LitStr,
	pub values: Punctuated<Expr, Token![,]>,
}

impl Args {
	/// The `format!` invocation producing the context message.
	pub fn format(&self) -> TokenStream2 {
		let message = &self.message;
		let values = self.values.iter();
		quote! { ::std::format!(#message #(, #values)*) }
	}
}

impl Parse for Args {
	fn parse(input: ParseStream<'_>) -> parse::Result<Self> {
		let message = input.parse()?;
		let values = if input.is_empty() {
			Punctuated::new()
		} else {
			input.parse::<Token![,]>()?;
			Punctuated::parse_terminated(input)?
		};
		Ok(Args { message, values })
	}
}
