//! Derive macros for the task list reducer architecture
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Classifies action variants as commands or events
//! - `#[derive(State)]` - Generates snapshot revision accessors
//!
//! # Example
//!
//! ```ignore
//! use tasklist_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TaskAction {
//!     #[command]
//!     AddTask { raw_text: String },
//!
//!     #[event]
//!     TaskAdded { task: Task },
//! }
//!
//! assert!(TaskAction::AddTask { raw_text: "x".into() }.is_command());
//! assert_eq!(TaskAction::AddTask { raw_text: "x".into() }.name(), "AddTask");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is marked `#[command]`
/// - `is_event()` - Returns true if this variant is marked `#[event]`
/// - `name()` - Returns the variant name, for logs
///
/// Variants carrying neither attribute are neither commands nor events
/// (internal bookkeeping actions such as timers).
///
/// # Errors
///
/// Produces a compile error if applied to a non-enum type or if a variant
/// has both `#[command]` and `#[event]`.
#[proc_macro_derive(Action, attributes(command, event))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut command_arms = Vec::new();
    let mut event_arms = Vec::new();
    let mut name_arms = Vec::new();

    for variant in &data_enum.variants {
        let is_command = has_attribute(&variant.attrs, "command");
        let is_event = has_attribute(&variant.attrs, "event");

        if is_command && is_event {
            return syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            )
            .to_compile_error()
            .into();
        }

        let pattern = variant_pattern(&variant.ident, &variant.fields);
        let variant_name = variant.ident.to_string();

        if is_command {
            command_arms.push(quote! { #pattern => true, });
        }
        if is_event {
            event_arms.push(quote! { #pattern => true, });
        }
        name_arms.push(quote! { #pattern => #variant_name, });
    }

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a command
            #[must_use]
            #[allow(clippy::match_like_matches_macro)]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#command_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            #[allow(clippy::match_like_matches_macro)]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#event_arms)*
                    _ => false,
                }
            }

            /// Returns the variant name of this action
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for State structs
///
/// A field marked `#[revision]` (an unsigned integer) counts applied
/// transitions. The derive generates:
/// - `revision()` - the current revision
/// - `bump_revision()` - advance it by one (wrapping)
///
/// Observers compare revisions to tell whether a snapshot changed without
/// comparing the whole state.
///
/// # Errors
///
/// Produces a compile error if applied to a non-struct type, or if more than
/// one field is marked `#[revision]`.
///
/// # Example
///
/// ```ignore
/// #[derive(State, Clone, Debug)]
/// struct TaskListState {
///     pub tasks: Vec<Task>,
///     #[revision]
///     pub revision: u64,
/// }
/// ```
#[proc_macro_derive(State, attributes(revision))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(State)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    let mut revision_fields = data_struct
        .fields
        .iter()
        .filter(|field| has_attribute(&field.attrs, "revision"));

    let Some(field) = revision_fields.next() else {
        return TokenStream::new();
    };

    if let Some(extra) = revision_fields.next() {
        return syn::Error::new_spanned(extra, "Only one field can be marked #[revision]")
            .to_compile_error()
            .into();
    }

    let Some(field_name) = field.ident.as_ref() else {
        return syn::Error::new_spanned(field, "#[revision] requires a named field")
            .to_compile_error()
            .into();
    };
    let field_ty = &field.ty;

    let expanded = quote! {
        impl #name {
            /// Number of transitions applied to this state
            #[must_use]
            pub const fn revision(&self) -> #field_ty {
                self.#field_name
            }

            /// Record that one more transition was applied
            pub const fn bump_revision(&mut self) {
                self.#field_name = self.#field_name.wrapping_add(1);
            }
        }
    };

    TokenStream::from(expanded)
}

/// Match pattern for a variant that ignores its fields
fn variant_pattern(ident: &Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
