//! Script macro implementation.
//!
//! This module implements the `script!` macro for declaring dialogue nodes
//! inline. Node shapes are checked while parsing, so a malformed script is a
//! compile error rather than a runtime one.

use std::collections::HashSet;
use std::sync::LazyLock;

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, Ident, LitStr, Result, Token, braced};

/// `${` without a closing brace, or `${}`.
static MALFORMED_PLACEHOLDER: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{(\}|[^}]*$)").unwrap_or_else(|e| unreachable!("placeholder regex: {e}"))
});

/// A single node of a script.
pub enum ScriptNode {
    /// `message "id": "text" => "next"`
    Message {
        id: LitStr,
        text: LitStr,
        next: Option<LitStr>,
    },
    /// `input "id": "question" as "variable" => "next"`
    Input {
        id: LitStr,
        question: LitStr,
        variable: LitStr,
        next: Option<LitStr>,
    },
    /// `choice "id": "question" { "answer" => "next" on callback, ... }`
    Choice {
        id: LitStr,
        question: LitStr,
        answers: Vec<ScriptAnswer>,
    },
}

/// One answer of a choice node.
pub struct ScriptAnswer {
    /// Answer text.
    pub text: LitStr,
    /// Continuation when chosen.
    pub next: Option<LitStr>,
    /// Callback expression run when chosen.
    pub callback: Option<Expr>,
}

fn non_empty(lit: LitStr, what: &str) -> Result<LitStr> {
    if lit.value().is_empty() {
        return Err(syn::Error::new(lit.span(), format!("{what} must not be empty")));
    }
    Ok(lit)
}

fn template(lit: LitStr) -> Result<LitStr> {
    if MALFORMED_PLACEHOLDER.is_match(&lit.value()) {
        return Err(syn::Error::new(
            lit.span(),
            "malformed placeholder: expected `${name}`",
        ));
    }
    Ok(lit)
}

fn parse_next(input: ParseStream) -> Result<Option<LitStr>> {
    if input.peek(Token![=>]) {
        let _: Token![=>] = input.parse()?;
        Ok(Some(non_empty(input.parse()?, "next node id")?))
    } else {
        Ok(None)
    }
}

impl Parse for ScriptAnswer {
    fn parse(input: ParseStream) -> Result<Self> {
        let text: LitStr = input.parse()?;
        let next = parse_next(input)?;
        let callback = if input.peek(Ident) {
            let keyword: Ident = input.parse()?;
            if keyword != "on" {
                return Err(syn::Error::new(
                    keyword.span(),
                    format!("expected `on <callback>`, found `{keyword}`"),
                ));
            }
            Some(input.parse()?)
        } else {
            None
        };
        Ok(Self {
            text,
            next,
            callback,
        })
    }
}

impl Parse for ScriptNode {
    fn parse(input: ParseStream) -> Result<Self> {
        let keyword: Ident = input.parse()?;
        let id = non_empty(input.parse()?, "node id")?;
        let _: Token![:] = input.parse()?;

        match keyword.to_string().as_str() {
            "message" | "msg" => {
                let text = template(input.parse()?)?;
                let next = parse_next(input)?;
                Ok(Self::Message { id, text, next })
            }
            "input" => {
                let question = template(input.parse()?)?;
                let _: Token![as] = input.parse()?;
                let variable = non_empty(input.parse()?, "input variable")?;
                let next = parse_next(input)?;
                Ok(Self::Input {
                    id,
                    question,
                    variable,
                    next,
                })
            }
            "choice" => {
                let question = template(input.parse()?)?;
                let content;
                let brace = braced!(content in input);
                let answers: Punctuated<ScriptAnswer, Token![,]> =
                    Punctuated::parse_terminated(&content)?;

                if answers.is_empty() {
                    return Err(syn::Error::new(
                        brace.span.join(),
                        "a choice needs at least one answer",
                    ));
                }
                let mut seen = HashSet::new();
                for answer in &answers {
                    if !seen.insert(answer.text.value()) {
                        return Err(syn::Error::new(
                            answer.text.span(),
                            format!("duplicate answer `{}`", answer.text.value()),
                        ));
                    }
                }

                Ok(Self::Choice {
                    id,
                    question,
                    answers: answers.into_iter().collect(),
                })
            }
            other => Err(syn::Error::new(
                keyword.span(),
                format!("unknown node kind: {other} (expected message, input or choice)"),
            )),
        }
    }
}

/// The script! macro input.
pub struct ScriptInput {
    /// The nodes in script order.
    pub nodes: Punctuated<ScriptNode, Token![;]>,
}

impl Parse for ScriptInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let nodes = if input.peek(syn::token::Brace) {
            let content;
            braced!(content in input);
            Punctuated::parse_terminated(&content)?
        } else {
            Punctuated::parse_terminated(input)?
        };

        Ok(Self { nodes })
    }
}

fn then(next: Option<&LitStr>) -> TokenStream {
    next.map_or_else(TokenStream::new, |next| quote! { .then(#next) })
}

/// Generate code for the script! macro.
pub fn expand(input: ScriptInput) -> TokenStream {
    let nodes: Vec<_> = input
        .nodes
        .into_iter()
        .map(|node| match node {
            ScriptNode::Message { id, text, next } => {
                let then = then(next.as_ref());
                quote! {
                    ::rust_dialogue::script::Node::from(
                        ::rust_dialogue::script::MessageNode::new(#id, #text) #then
                    )
                }
            }
            ScriptNode::Input {
                id,
                question,
                variable,
                next,
            } => {
                let then = then(next.as_ref());
                quote! {
                    ::rust_dialogue::script::Node::from(
                        ::rust_dialogue::script::QuestionNode::input(
                            #id,
                            #question,
                            ::rust_dialogue::script::InputSpec::new(#variable) #then,
                        )
                    )
                }
            }
            ScriptNode::Choice {
                id,
                question,
                answers,
            } => {
                let answers = answers.iter().map(|answer| {
                    let text = &answer.text;
                    let then = then(answer.next.as_ref());
                    let callback = answer
                        .callback
                        .as_ref()
                        .map_or_else(TokenStream::new, |cb| quote! { .on_select(#cb) });
                    quote! {
                        ::rust_dialogue::script::Answer::new(#text) #then #callback
                    }
                });
                quote! {
                    ::rust_dialogue::script::Node::from(
                        ::rust_dialogue::script::QuestionNode::choice(
                            #id,
                            #question,
                            [#(#answers),*],
                        )
                    )
                }
            }
        })
        .collect();

    quote! {
        ::std::vec::Vec::<::rust_dialogue::script::Node>::from([#(#nodes),*])
    }
}
